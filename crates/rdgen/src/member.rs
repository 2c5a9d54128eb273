//! Per-member emission: storage, constructor parameter, read and write,
//! binding and identity, getters and equality participation.

use crate::{
    Generator,
    error::GenError,
    helper::{doc_attrs, field_ident, i64_lit, ident},
    model,
    resolve::{CodecAliases, codec, surface},
};
use proc_macro2::{Literal, TokenStream};
use quote::{format_ident, quote};
use rdgen_schema::{
    node::{Declaration, Field, Member, Reactive, ReactiveKind},
    types::{DefaultValue, FlowKind, PredefinedType, Type},
};
use syn::Ident;

/// Reader locals that would shadow the reader's own bindings.
const READER_BINDINGS: [&str; 6] = ["buffer", "ctx", "res", "size", "start", "unknown_id"];

///
/// MemberKind
///

pub enum MemberKind<'a> {
    Field { field: &'a Field, codec: TokenStream },
    Reactive(&'a Reactive),
    Extension,
}

///
/// MemberPlan
///
/// Everything the declaration emitter needs to know about one member, seen
/// from the declaration that stores it.
///

pub struct MemberPlan<'a> {
    pub member: &'a Member,
    pub kind: MemberKind<'a>,
    pub ident: Ident,
    pub local: Ident,
    pub storage: TokenStream,
    pub bindable: bool,
    pub empty_constructible: bool,
    pub optimize_nested: bool,
}

impl<'a> MemberPlan<'a> {
    pub fn new(
        generator: &Generator<'a>,
        scope: &Declaration,
        member: &'a Member,
        aliases: &mut CodecAliases,
    ) -> Result<Self, GenError> {
        let schema = generator.schema();
        let ident = field_ident(member.name());
        let local = if READER_BINDINGS.contains(&ident.to_string().as_str()) {
            format_ident!("{ident}_")
        } else {
            ident.clone()
        };

        let (kind, storage) = match member {
            Member::Field(field) => {
                let storage = surface(generator, &field.ty, scope)?;
                let codec = codec(generator, &field.ty, scope)?;

                (MemberKind::Field { field, codec }, storage)
            }
            Member::Reactive(reactive) => match &reactive.kind {
                ReactiveKind::Extension { delegated_by } => {
                    let Type::Declaration(name) = delegated_by else {
                        return Err(GenError::NotDefaultable {
                            decl: scope.name.clone(),
                            context: format!("extension member '{}'", reactive.name),
                        });
                    };
                    let delegate = schema.try_get(name)?;
                    if !model::is_defaultable_decl(schema, delegate) {
                        return Err(GenError::NotDefaultable {
                            decl: delegate.name.clone(),
                            context: format!("extension member '{}.{}'", scope.name, reactive.name),
                        });
                    }

                    (MemberKind::Extension, generator.decl_path(name, scope)?)
                }
                _ => {
                    let storage = reactive_storage(generator, scope, reactive, aliases)?;

                    (MemberKind::Reactive(reactive), storage)
                }
            },
            Member::EnumConst(c) => {
                return Err(rdgen_schema::node::NodeError::IncorrectKind {
                    name: c.name.clone(),
                    expected: "field or reactive",
                }
                .into());
            }
        };

        Ok(Self {
            member,
            kind,
            ident,
            local,
            storage,
            bindable: model::is_bindable_member(schema, member),
            empty_constructible: model::is_empty_constructible(schema, member),
            optimize_nested: model::is_optimize_nested(schema, member),
        })
    }

    /// Serialized members; extension delegates are rebuilt on read.
    #[must_use]
    pub const fn is_serialized(&self) -> bool {
        !matches!(self.kind, MemberKind::Extension)
    }

    #[must_use]
    pub const fn as_field(&self) -> Option<&'a Field> {
        match self.kind {
            MemberKind::Field { field, .. } => Some(field),
            _ => None,
        }
    }

    #[must_use]
    pub fn ctor_param(&self) -> TokenStream {
        let Self { ident, storage, .. } = self;

        quote!(#ident: #storage)
    }

    /// Private field of the declaring type.
    #[must_use]
    pub fn storage_field(&self) -> TokenStream {
        let Self { ident, storage, .. } = self;
        let docs = doc_attrs(self.member.documentation());

        quote!(#docs #ident: #storage)
    }

    /// `let local = ..;` reading this member.
    #[must_use]
    pub fn read_stmt(&self) -> TokenStream {
        let Self { local, storage, .. } = self;

        match &self.kind {
            MemberKind::Field { codec, .. } => quote! {
                let #local = <#codec as ::rdgen_runtime::serialization::Codec>::read(ctx, buffer)?;
            },
            MemberKind::Reactive(_) => quote! {
                let #local = <#storage as ::rdgen_runtime::serialization::RdSerializable>::read(ctx, buffer)?;
            },
            MemberKind::Extension => quote!(),
        }
    }

    #[must_use]
    pub fn write_stmt(&self) -> TokenStream {
        let ident = &self.ident;

        match &self.kind {
            MemberKind::Field { codec, .. } => quote! {
                <#codec as ::rdgen_runtime::serialization::Codec>::write(ctx, buffer, &self.#ident)?;
            },
            MemberKind::Reactive(_) => quote! {
                ::rdgen_runtime::serialization::RdSerializable::write(&self.#ident, ctx, buffer)?;
            },
            MemberKind::Extension => quote!(),
        }
    }

    #[must_use]
    pub fn identify_stmt(&self) -> TokenStream {
        let ident = &self.ident;
        let key = format!(".{}", self.member.name());

        quote! {
            ::rdgen_runtime::bindable::RdBindable::identify(&self.#ident, identities, id.mix(#key));
        }
    }

    #[must_use]
    pub fn bind_stmt(&self) -> TokenStream {
        let ident = &self.ident;
        let name = self.member.name();

        quote! {
            ::rdgen_runtime::bindable::RdBindable::bind(&self.#ident, lifetime, &self.base, #name);
        }
    }

    /// Statements of `initialize()` for this member.
    #[must_use]
    pub fn initialize_stmts(&self, generator: &Generator) -> TokenStream {
        let ident = &self.ident;
        let mut tokens = quote!();

        let MemberKind::Reactive(reactive) = self.kind else {
            return tokens;
        };
        if self.optimize_nested {
            tokens.extend(quote!(self.#ident.set_optimize_nested(true);));
        }
        if matches!(reactive.kind, ReactiveKind::Map)
            && generator.config().flow_transform == crate::FlowTransform::Reversed
        {
            tokens.extend(quote!(self.#ident.set_master(false);));
        }
        if reactive.free_threaded {
            tokens.extend(quote!(self.#ident.set_async(true);));
        }

        tokens
    }

    /// Initial value when the member is not passed to a constructor.
    pub fn default_expr(&self, generator: &Generator, scope: &Declaration) -> Result<TokenStream, GenError> {
        let default = quote!(::core::default::Default::default());

        match &self.kind {
            MemberKind::Field { field, .. } => match &field.default {
                Some(value) => default_literal(generator, scope, &field.name, &field.ty, value),
                None => Ok(default),
            },
            MemberKind::Reactive(reactive) => match &reactive.kind {
                ReactiveKind::Property {
                    default: Some(value),
                } => {
                    let ty = reactive.generic_params.first().ok_or_else(|| {
                        GenError::InvalidDefault {
                            decl: scope.name.clone(),
                            member: reactive.name.clone(),
                            reason: "property has no value type".to_string(),
                        }
                    })?;
                    let value = default_literal(generator, scope, &reactive.name, ty, value)?;

                    Ok(quote!(::rdgen_runtime::reactive::RdProperty::new(#value)))
                }
                _ => Ok(default),
            },
            MemberKind::Extension => Ok(default),
        }
    }

    /// Read accessor for this member.
    pub fn getter(&self, generator: &Generator, scope: &Declaration) -> Result<Getter, GenError> {
        let Self { ident, storage, .. } = self;

        let (ret, body) = match &self.kind {
            MemberKind::Field { field, .. } => match &field.ty {
                ty if model::is_copy_type(ty) => (quote!(#storage), quote!(self.#ident)),
                ty if is_string(ty) => (quote!(&str), quote!(self.#ident.as_str())),
                Type::Declaration(name) => {
                    let path = generator.decl_path(name, scope)?;
                    let target = generator.schema().try_get(name)?;
                    if target.is_abstract() {
                        (quote!(&dyn #path), quote!(&*self.#ident))
                    } else {
                        (quote!(&#path), quote!(&self.#ident))
                    }
                }
                _ => (quote!(&#storage), quote!(&self.#ident)),
            },
            MemberKind::Reactive(_) | MemberKind::Extension => {
                (quote!(&#storage), quote!(&self.#ident))
            }
        };

        Ok(Getter {
            docs: doc_attrs(self.member.documentation()),
            sig: quote!(fn #ident(&self) -> #ret),
            body,
        })
    }
}

// is_string
// interned strings read back as plain strings
fn is_string(ty: &Type) -> bool {
    match ty {
        Type::Predefined(PredefinedType::String) => true,
        Type::Interned { item, .. } => is_string(item),
        _ => false,
    }
}

///
/// Getter
///

pub struct Getter {
    docs: TokenStream,
    sig: TokenStream,
    body: TokenStream,
}

impl Getter {
    /// Inherent method on the declaring type.
    #[must_use]
    pub fn inherent(&self) -> TokenStream {
        let Self { docs, sig, body } = self;

        quote! {
            #docs
            #[must_use]
            pub #sig { #body }
        }
    }

    /// Required method of an abstract declaration's trait.
    #[must_use]
    pub fn declaration(&self) -> TokenStream {
        let Self { docs, sig, .. } = self;

        quote!(#docs #sig;)
    }

    /// Implementation of the trait method on a concrete descendant.
    #[must_use]
    pub fn implementation(&self) -> TokenStream {
        let Self { sig, body, .. } = self;

        quote!(#sig { #body })
    }
}

// reactive_storage
// runtime primitive a reactive member is stored as
fn reactive_storage(
    generator: &Generator,
    scope: &Declaration,
    reactive: &Reactive,
    aliases: &mut CodecAliases,
) -> Result<TokenStream, GenError> {
    let mut values = Vec::new();
    let mut codecs = Vec::new();
    for ty in &reactive.generic_params {
        values.push(surface(generator, ty, scope)?);
        codecs.push(aliases.codec_for(generator, ty, scope)?);
    }

    let primitive = match reactive.kind {
        ReactiveKind::Signal => quote!(RdSignal),
        ReactiveKind::Property { .. } => quote!(RdProperty),
        ReactiveKind::List => quote!(RdList),
        ReactiveKind::Set => quote!(RdSet),
        ReactiveKind::Map => quote!(RdMap),
        ReactiveKind::Task => match generator.config().flow_transform.apply(reactive.flow) {
            FlowKind::Sink => quote!(RdEndpoint),
            FlowKind::Source | FlowKind::Both => quote!(RdCall),
        },
        ReactiveKind::Extension { .. } => {
            return Err(GenError::NotDefaultable {
                decl: scope.name.clone(),
                context: format!("extension member '{}'", reactive.name),
            });
        }
    };

    Ok(quote!(::rdgen_runtime::reactive::#primitive<#(#values,)* #(#codecs),*>))
}

/// Literal for a declared default, typed by the member's type.
pub fn default_literal(
    generator: &Generator,
    scope: &Declaration,
    member: &str,
    ty: &Type,
    value: &DefaultValue,
) -> Result<TokenStream, GenError> {
    let invalid = |reason: String| GenError::InvalidDefault {
        decl: scope.name.clone(),
        member: member.to_string(),
        reason,
    };

    if let Type::Nullable(item) = ty {
        let inner = default_literal(generator, scope, member, item, value)?;
        return Ok(quote!(::core::option::Option::Some(#inner)));
    }

    let tokens = match (ty, value) {
        (Type::Predefined(PredefinedType::Bool), DefaultValue::Bool(b)) => quote!(#b),
        (Type::Predefined(p), DefaultValue::Long(n))
            if p.is_primitive() && !matches!(p, PredefinedType::Bool) =>
        {
            let fits = match p {
                PredefinedType::Byte => i8::try_from(*n).is_ok(),
                PredefinedType::Short => i16::try_from(*n).is_ok(),
                PredefinedType::Int => i32::try_from(*n).is_ok(),
                PredefinedType::Char => u16::try_from(*n).is_ok(),
                _ => true,
            };
            if !fits {
                return Err(invalid(format!("{n} is out of range for {}", p.signature())));
            }
            match p {
                PredefinedType::Float | PredefinedType::Double => float_lit(int_to_f64(*n)),
                _ => i64_lit(*n),
            }
        }
        (
            Type::Predefined(PredefinedType::Float | PredefinedType::Double),
            DefaultValue::Double(f),
        ) => {
            if !f.is_finite() {
                return Err(invalid(format!("{f} is not finite")));
            }
            float_lit(*f)
        }
        (Type::Predefined(PredefinedType::String), DefaultValue::String(s)) => {
            quote!(::std::string::String::from(#s))
        }
        (Type::Enum(name), DefaultValue::Const(c)) => {
            let path = generator.decl_path(name, scope)?;
            let variant = ident(c);
            quote!(#path::#variant)
        }
        (Type::Interned { item, .. }, _) => {
            default_literal(generator, scope, member, item, value)?
        }
        _ => return Err(invalid(format!("{value:?} does not fit '{ty}'"))),
    };

    Ok(tokens)
}

#[allow(clippy::cast_precision_loss)]
const fn int_to_f64(n: i64) -> f64 {
    n as f64
}

// float_lit
// always carries a fractional part so it never reads as an integer
fn float_lit(f: f64) -> TokenStream {
    let abs = Literal::f64_unsuffixed(f.abs());
    if f.is_sign_negative() && f != 0.0 {
        quote!(-#abs)
    } else {
        quote!(#abs)
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{FlowTransform, GeneratorConfig};
    use rdgen_schema::{build::SchemaBuilder, node::*};

    fn schema() -> Schema {
        SchemaBuilder::new(Declaration::root("Model"))
            .declare(Declaration::enumeration("Color", &["Red", "Green"]))
            .declare(
                Declaration::class("Widget")
                    .member(Field::new("label", Type::STRING))
                    .member(Field::new("ctx", Type::INT))
                    .member(Field::new("color", Type::enumeration("Color")))
                    .member(Reactive::call("resize", Type::INT, Type::BOOL))
                    .member(Reactive::map("tags", Type::STRING, Type::INT.array()).free_threaded()),
            )
            .build()
            .unwrap()
    }

    fn plan<'a>(generator: &Generator<'a>, name: &str) -> MemberPlan<'a> {
        let decl = generator.schema().get("Widget").unwrap();
        let member = decl.members.iter().find(|m| m.name() == name).unwrap();
        let mut aliases = CodecAliases::new(decl);

        MemberPlan::new(generator, decl, member, &mut aliases).unwrap()
    }

    fn text(tokens: TokenStream) -> String {
        tokens.to_string().replace(' ', "")
    }

    #[test]
    fn reader_locals_avoid_reader_bindings() {
        let schema = schema();
        let generator = Generator::new(&schema, GeneratorConfig::default());

        assert_eq!(plan(&generator, "ctx").local.to_string(), "ctx_");
        assert_eq!(plan(&generator, "label").local.to_string(), "label");
    }

    #[test]
    fn task_primitive_follows_the_flow_transform() {
        let schema = schema();
        let as_is = Generator::new(&schema, GeneratorConfig::default());
        let reversed = Generator::new(
            &schema,
            GeneratorConfig::default().with_flow_transform(FlowTransform::Reversed),
        );

        assert!(text(plan(&as_is, "resize").storage).contains("RdCall<"));
        assert!(text(plan(&reversed, "resize").storage).contains("RdEndpoint<"));
    }

    #[test]
    fn maps_give_up_mastership_only_when_reversed() {
        let schema = schema();
        let as_is = Generator::new(&schema, GeneratorConfig::default());
        let reversed = Generator::new(
            &schema,
            GeneratorConfig::default().with_flow_transform(FlowTransform::Reversed),
        );

        let plain = text(plan(&as_is, "tags").initialize_stmts(&as_is));
        let flipped = text(plan(&reversed, "tags").initialize_stmts(&reversed));

        assert!(plain.contains("set_optimize_nested(true)"), "{plain}");
        assert!(plain.contains("set_async(true)"), "{plain}");
        assert!(!plain.contains("set_master"), "{plain}");
        assert!(flipped.contains("set_master(false)"), "{flipped}");
    }

    #[test]
    fn getters_borrow_strings_and_copy_enums() {
        let schema = schema();
        let generator = Generator::new(&schema, GeneratorConfig::default());
        let decl = schema.get("Widget").unwrap();

        let label = plan(&generator, "label").getter(&generator, decl).unwrap();
        assert_eq!(text(label.implementation()), "fnlabel(&self)->&str{self.label.as_str()}");

        let color = plan(&generator, "color").getter(&generator, decl).unwrap();
        assert_eq!(text(color.declaration()), "fncolor(&self)->Color;");
    }

    #[test]
    fn defaults_are_range_checked() {
        let schema = schema();
        let generator = Generator::new(&schema, GeneratorConfig::default());
        let scope = schema.root().unwrap();

        let ok = default_literal(&generator, scope, "b", &Type::BYTE, &DefaultValue::Long(-5)).unwrap();
        assert_eq!(text(ok), "-5");

        let err = default_literal(&generator, scope, "b", &Type::BYTE, &DefaultValue::Long(300))
            .unwrap_err();
        assert!(matches!(err, GenError::InvalidDefault { .. }), "{err}");

        let color = default_literal(
            &generator,
            scope,
            "c",
            &Type::enumeration("Color").nullable(),
            &DefaultValue::Const("Green".into()),
        )
        .unwrap();
        assert_eq!(text(color), "::core::option::Option::Some(Color::Green)");
    }
}
