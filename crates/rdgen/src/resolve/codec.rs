use crate::{
    Generator,
    error::GenError,
    helper::{i64_lit, ident},
    resolve::ty::{predefined, surface},
};
use proc_macro2::TokenStream;
use quote::quote;
use rdgen_schema::{
    node::Declaration,
    types::{PredefinedType, Type},
};
use std::collections::{BTreeMap, BTreeSet};
use syn::Ident;

/// Codec type for `ty`; readers and writers use the same one.
pub fn codec(generator: &Generator, ty: &Type, scope: &Declaration) -> Result<TokenStream, GenError> {
    let tokens = match ty {
        Type::Predefined(p) => {
            let p = predefined(*p);
            quote!(::rdgen_runtime::serialization::Predefined<#p>)
        }
        Type::Enum(name) => {
            let path = generator.decl_path(name, scope)?;
            quote!(::rdgen_runtime::serialization::EnumCodec<#path>)
        }
        Type::Declaration(name) => {
            if generator.schema().try_get(name)?.is_abstract() {
                let path = generator.decl_path(name, scope)?;
                quote!(::rdgen_runtime::serialization::AbstractPolymorphic<dyn #path>)
            } else {
                let surface = surface(generator, ty, scope)?;
                quote!(::rdgen_runtime::serialization::Polymorphic<#surface>)
            }
        }
        Type::Array(item) => match item.as_ref() {
            Type::Predefined(p) if p.is_primitive() => {
                let p = predefined(*p);
                quote!(::rdgen_runtime::serialization::PrimitiveArrayCodec<#p>)
            }
            _ => {
                let inner = codec(generator, item, scope)?;
                quote!(::rdgen_runtime::serialization::ArrayCodec<#inner>)
            }
        },
        Type::ImmutableList(item) => {
            let inner = codec(generator, item, scope)?;
            quote!(::rdgen_runtime::serialization::ArrayCodec<#inner>)
        }
        Type::Nullable(item) => {
            let inner = codec(generator, item, scope)?;
            quote!(::rdgen_runtime::serialization::NullableCodec<#inner>)
        }
        Type::Interned { item, scope: key } => {
            if !is_internable(item) {
                return Err(GenError::UnsupportedInterned {
                    decl: scope.name.clone(),
                    ty: ty.to_string(),
                });
            }
            let inner = codec(generator, item, scope)?;
            let hash = key.hash();
            let key = i64_lit(hash);
            // a negative literal is an expression and needs a const block
            let key = if hash < 0 { quote!({ #key }) } else { key };

            quote!(::rdgen_runtime::serialization::InternedCodec<#inner, #key>)
        }
    };

    Ok(tokens)
}

/// Leaf types have a codec of their own; the rest are built from combinators.
#[must_use]
pub const fn is_leaf(ty: &Type) -> bool {
    matches!(ty, Type::Predefined(_) | Type::Enum(_) | Type::Declaration(_))
}

// is_internable
// interning keys values by equality, so floats and void are excluded
const fn is_internable(item: &Type) -> bool {
    match item {
        Type::Predefined(p) => !matches!(
            p,
            PredefinedType::Double | PredefinedType::Float | PredefinedType::Void
        ),
        Type::Enum(_) => true,
        _ => false,
    }
}

///
/// CodecAliases
///
/// Named codecs for the composite generic parameters of one declaration's
/// reactive members, one alias per distinct type.
///

pub struct CodecAliases {
    owner: String,
    by_type: BTreeMap<Type, (Ident, TokenStream)>,
    names: BTreeSet<String>,
}

impl CodecAliases {
    #[must_use]
    pub fn new(owner: &Declaration) -> Self {
        Self {
            owner: owner.name.clone(),
            by_type: BTreeMap::new(),
            names: BTreeSet::new(),
        }
    }

    /// Codec for a reactive generic parameter: the leaf codec itself, or the
    /// alias synthesized for a composite type.
    pub fn codec_for(
        &mut self,
        generator: &Generator,
        ty: &Type,
        scope: &Declaration,
    ) -> Result<TokenStream, GenError> {
        if is_leaf(ty) {
            return codec(generator, ty, scope);
        }
        if let Some((alias, _)) = self.by_type.get(ty) {
            return Ok(quote!(#alias));
        }

        let expr = codec(generator, ty, scope)?;
        let alias = self.fresh_name(ty);
        self.by_type.insert(ty.clone(), (alias.clone(), expr));

        Ok(quote!(#alias))
    }

    // fresh_name
    // structurally different types can share a type name (e.g. two scopes)
    fn fresh_name(&mut self, ty: &Type) -> Ident {
        let base = format!("__{}{}Codec", self.owner, ty.type_name());
        let mut name = base.clone();
        let mut n = 1;
        while !self.names.insert(name.clone()) {
            n += 1;
            name = format!("{base}{n}");
        }

        ident(&name)
    }

    /// `type` items for every alias, in structural order.
    #[must_use]
    pub fn items(&self) -> TokenStream {
        let items = self.by_type.values().map(|(alias, expr)| {
            quote!(type #alias = #expr;)
        });

        quote!(#(#items)*)
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GeneratorConfig;
    use rdgen_schema::{build::SchemaBuilder, node::*};

    fn schema() -> Schema {
        SchemaBuilder::new(Declaration::root("Model"))
            .declare(Declaration::enumeration("Color", &["Red", "Green"]))
            .declare(Declaration::class("Point"))
            .declare(Declaration::abstract_class("Shape"))
            .build()
            .unwrap()
    }

    fn text(tokens: TokenStream) -> String {
        tokens.to_string().replace(' ', "")
    }

    #[test]
    fn combinators_wrap_leaf_codecs() {
        let schema = schema();
        let generator = Generator::new(&schema, GeneratorConfig::default());
        let scope = schema.root().unwrap();
        let resolve = |ty: Type| text(codec(&generator, &ty, scope).unwrap());

        assert_eq!(
            resolve(Type::INT.array()),
            "::rdgen_runtime::serialization::PrimitiveArrayCodec<i32>"
        );
        assert_eq!(
            resolve(Type::decl("Shape").nullable()),
            "::rdgen_runtime::serialization::NullableCodec<::rdgen_runtime::serialization::AbstractPolymorphic<dynShape>>"
        );
        assert_eq!(
            resolve(Type::decl("Point").list()),
            "::rdgen_runtime::serialization::ArrayCodec<::rdgen_runtime::serialization::Polymorphic<::std::rc::Rc<Point>>>"
        );
        assert!(resolve(Type::enumeration("Color").interned("Colors")).contains("InternedCodec"));
    }

    #[test]
    fn only_negative_intern_keys_are_braced() {
        let schema = schema();
        let generator = Generator::new(&schema, GeneratorConfig::default());
        let scope = schema.root().unwrap();

        for name in ["Protocol", "Colors", "Session", "Names", "Hosts", "Tags"] {
            let hash = rdgen_schema::types::InternScope::new(name).hash();
            let out = text(codec(&generator, &Type::STRING.interned(name), scope).unwrap());

            if hash < 0 {
                assert!(out.ends_with(&format!(",{{{hash}}}>")), "{name}: {out}");
            } else {
                assert!(out.ends_with(&format!(",{hash}>")), "{name}: {out}");
            }
        }
    }

    #[test]
    fn interning_floats_is_rejected() {
        let schema = schema();
        let generator = Generator::new(&schema, GeneratorConfig::default());
        let scope = schema.root().unwrap();

        let err = codec(&generator, &Type::DOUBLE.interned("Numbers"), scope).unwrap_err();
        assert!(matches!(err, GenError::UnsupportedInterned { .. }), "{err}");
        let err = codec(&generator, &Type::decl("Point").interned("Points"), scope).unwrap_err();
        assert!(matches!(err, GenError::UnsupportedInterned { .. }), "{err}");
    }

    #[test]
    fn aliases_are_shared_by_structure() {
        let schema = schema();
        let generator = Generator::new(&schema, GeneratorConfig::default());
        let root = schema.root().unwrap();
        let mut aliases = CodecAliases::new(root);

        let a = aliases.codec_for(&generator, &Type::INT.array(), root).unwrap();
        let b = aliases.codec_for(&generator, &Type::INT.array(), root).unwrap();
        let leaf = aliases.codec_for(&generator, &Type::INT, root).unwrap();

        assert_eq!(a.to_string(), b.to_string());
        assert_eq!(a.to_string(), "__ModelIntArrayCodec");
        assert!(text(leaf).starts_with("::rdgen_runtime::serialization::Predefined"));
        assert!(text(aliases.items()).starts_with("type__ModelIntArrayCodec="));
    }

    #[test]
    fn same_type_name_in_different_scopes_gets_distinct_aliases() {
        let schema = schema();
        let generator = Generator::new(&schema, GeneratorConfig::default());
        let root = schema.root().unwrap();
        let mut aliases = CodecAliases::new(root);

        let a = aliases.codec_for(&generator, &Type::INT.interned("A"), root).unwrap();
        let b = aliases.codec_for(&generator, &Type::INT.interned("B"), root).unwrap();

        assert_ne!(a.to_string(), b.to_string());
    }
}
