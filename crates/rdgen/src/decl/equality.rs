use crate::{
    decl::DeclContext,
    error::GenError,
    helper::{Implementor, TraitKind},
    model,
};
use proc_macro2::TokenStream;
use quote::quote;

///
/// Equality
///
/// Scalar declarations compare and hash by value; everything else bindable
/// compares by identity and hashes its wire id.
///

pub struct Equality {
    pub inherent: TokenStream,
    pub impls: TokenStream,
}

pub fn emit(ctx: &DeclContext) -> Result<Equality, GenError> {
    if ctx.is_scalar() {
        by_value(ctx)
    } else {
        Ok(by_identity(ctx))
    }
}

fn by_value(ctx: &DeclContext) -> Result<Equality, GenError> {
    let schema = ctx.generator.schema();
    let type_ident = &ctx.ident;

    let mut compared = Vec::new();
    for plan in &ctx.members {
        let Some(field) = plan.as_field() else {
            continue;
        };
        if !field.used_in_equals {
            continue;
        }
        if !model::is_scalar_type(schema, &field.ty) {
            return Err(GenError::NonScalarEquality {
                decl: ctx.decl.name.clone(),
                member: field.name.clone(),
                ty: field.ty.to_string(),
            });
        }
        compared.push(&plan.ident);
    }

    let mut terms: Vec<_> = compared
        .iter()
        .map(|f| quote!(self.#f == other.#f))
        .collect();
    if ctx.decl.is_unknown() {
        terms.push(quote!(self.unknown_id == other.unknown_id));
        terms.push(quote!(self.unknown_bytes == other.unknown_bytes));
    }
    let eq = if terms.is_empty() {
        quote!(true)
    } else {
        quote!(#(#terms)&&*)
    };

    let folds = compared.iter().map(|f| {
        quote! {
            let result = ::rdgen_runtime::hash::combine(
                result,
                ::rdgen_runtime::hash::RdHash::rd_hash(&self.#f),
            );
        }
    });

    let inherent = quote! {
        /// Hash of the members taking part in equality, stable across processes.
        #[must_use]
        pub fn hash_code(&self) -> i64 {
            let result: i64 = 0;
            #(#folds)*
            result
        }
    };

    let partial_eq = Implementor::new(type_ident, TraitKind::PartialEq).set_tokens(quote! {
        fn eq(&self, other: &Self) -> bool {
            #eq
        }
    });
    let hash = Implementor::new(type_ident, TraitKind::Hash).set_tokens(quote! {
        fn hash<H: ::core::hash::Hasher>(&self, state: &mut H) {
            state.write_i64(self.hash_code());
        }
    });
    let rd_hash = Implementor::new(type_ident, TraitKind::RdHash).set_tokens(quote! {
        fn rd_hash(&self) -> i64 {
            self.hash_code()
        }
    });

    Ok(Equality {
        inherent,
        impls: quote!(#partial_eq #hash #rd_hash),
    })
}

fn by_identity(ctx: &DeclContext) -> Equality {
    let type_ident = &ctx.ident;

    let partial_eq = Implementor::new(type_ident, TraitKind::PartialEq).set_tokens(quote! {
        fn eq(&self, other: &Self) -> bool {
            ::std::ptr::eq(self, other)
        }
    });
    let rd_hash = Implementor::new(type_ident, TraitKind::RdHash).set_tokens(quote! {
        fn rd_hash(&self) -> i64 {
            self.base.rdid().value()
        }
    });

    Equality {
        inherent: quote!(),
        impls: quote!(#partial_eq #rd_hash),
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Generator, config::GeneratorConfig};
    use rdgen_schema::{build::SchemaBuilder, node::*, types::Type};

    fn emit_for(schema: &Schema, name: &str) -> Result<String, GenError> {
        let generator = Generator::new(schema, GeneratorConfig::default());
        let decl = schema.get(name).unwrap();
        let ctx = DeclContext::new(&generator, decl, decl)?;
        let eq = emit(&ctx)?;

        Ok(format!("{} {}", eq.inherent, eq.impls).replace(' ', ""))
    }

    #[test]
    fn fields_left_out_of_equality_are_not_hashed() {
        let schema = SchemaBuilder::new(Declaration::root("Model"))
            .declare(
                Declaration::structure("Point")
                    .member(Field::new("x", Type::INT))
                    .member(Field::new("tag", Type::STRING).not_in_equals()),
            )
            .build()
            .unwrap();
        let out = emit_for(&schema, "Point").unwrap();

        assert!(out.contains("self.x==other.x"), "{out}");
        assert!(!out.contains("self.tag"), "{out}");
        assert!(out.contains("state.write_i64(self.hash_code())"), "{out}");
    }

    #[test]
    fn classes_with_reactives_compare_by_identity() {
        let schema = SchemaBuilder::new(Declaration::root("Model"))
            .declare(Declaration::class("Counter").member(Reactive::property("n", Type::INT)))
            .build()
            .unwrap();
        let out = emit_for(&schema, "Counter").unwrap();

        assert!(out.contains("::std::ptr::eq(self,other)"), "{out}");
        assert!(out.contains("self.base.rdid().value()"), "{out}");
        assert!(!out.contains("hash_code"), "{out}");
    }

    #[test]
    fn struct_equality_over_a_class_is_rejected() {
        let schema = SchemaBuilder::new(Declaration::root("Model"))
            .declare(Declaration::class("Counter").member(Reactive::property("n", Type::INT)))
            .declare(Declaration::structure("Wrapper").member(Field::new("counter", Type::decl("Counter"))))
            .build()
            .unwrap();

        let err = emit_for(&schema, "Wrapper").unwrap_err();
        assert!(matches!(err, GenError::NonScalarEquality { .. }), "{err}");
    }
}
