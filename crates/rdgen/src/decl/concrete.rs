use crate::{
    decl::{DeclContext, bindable, equality, serialize},
    error::GenError,
    helper::{Implementor, TraitKind, doc_attrs},
    model,
};
use proc_macro2::TokenStream;
use quote::quote;

/// Tokens for a concrete struct, class or toplevel. `extra` lands in the
/// inherent impl ahead of the constructors.
pub fn emit(ctx: &DeclContext, extra: TokenStream) -> Result<TokenStream, GenError> {
    let type_ident = &ctx.ident;
    let aliases = ctx.aliases.items();
    let definition = definition(ctx);

    let (initialize, has_initialize) = initialize(ctx);
    let ctors = constructors(ctx, has_initialize)?;
    let getters = ctx
        .own()
        .iter()
        .map(|plan| plan.getter(ctx.generator, ctx.scope).map(|g| g.inherent()))
        .collect::<Result<Vec<_>, _>>()?;
    let serialization_context = ctx.decl.is_intern_root().then(|| {
        quote! {
            /// Context carrying the intern tables rooted here, once this
            /// entity has been read or written.
            pub fn serialization_context(&self) -> ::core::result::Result<
                ::rdgen_runtime::serialization::SerializationCtx,
                ::rdgen_runtime::error::WireError,
            > {
                self.intern_roots.get()
            }
        }
    });

    let equality = equality::emit(ctx)?;
    let binding = bindable::emit(ctx);
    let default = default_impl(ctx)?;
    let wire = (!ctx.decl.is_toplevel()).then(|| serialize::emit(ctx));
    let ancestors = ancestor_impls(ctx)?;

    let eq_inherent = &equality.inherent;
    let bind_inherent = &binding.inherent;
    let eq_impls = &equality.impls;
    let bind_impls = &binding.impls;

    Ok(quote! {
        #aliases
        #definition

        impl #type_ident {
            #extra
            #ctors
            #initialize
            #(#getters)*
            #serialization_context
            #eq_inherent
            #bind_inherent
        }

        #default
        #wire
        #(#ancestors)*
        #eq_impls
        #bind_impls
    })
}

fn definition(ctx: &DeclContext) -> TokenStream {
    let decl = ctx.decl;
    let type_ident = &ctx.ident;

    let docs = if decl.is_unknown() {
        let line = format!(
            " Payload of a `{}` subtype this side has no serializer for.",
            decl.base.as_deref().unwrap_or_default()
        );
        quote!(#[doc = #line])
    } else {
        doc_attrs(decl.documentation.as_deref())
    };
    let derive = if decl.is_struct() {
        quote!(#[derive(Clone, Debug)])
    } else {
        quote!(#[derive(Debug)])
    };

    let base = if decl.is_toplevel() {
        quote!(base: ::rdgen_runtime::bindable::RdExtBase,)
    } else if decl.is_class() {
        quote!(base: ::rdgen_runtime::bindable::RdBindableBase,)
    } else {
        quote!()
    };
    let fields = ctx.members.iter().map(|plan| plan.storage_field());
    let intern_roots = decl
        .is_intern_root()
        .then(|| quote!(intern_roots: ::rdgen_runtime::serialization::InternRootsSlot,));
    let unknown = decl.is_unknown().then(|| {
        quote! {
            unknown_id: ::rdgen_runtime::id::RdId,
            unknown_bytes: ::std::vec::Vec<u8>,
        }
    });

    quote! {
        #docs
        #derive
        pub struct #type_ident {
            #base
            #(#fields,)*
            #intern_roots
            #unknown
        }
    }
}

// initialize
// flags set on reactive members right after construction
fn initialize(ctx: &DeclContext) -> (TokenStream, bool) {
    let mut stmts: Vec<_> = ctx
        .members
        .iter()
        .map(|plan| plan.initialize_stmts(ctx.generator))
        .filter(|tokens| !tokens.is_empty())
        .collect();
    if ctx.decl.is_toplevel() {
        stmts.push(quote!(self.base.set_serialization_hash(Self::SERIALIZATION_HASH);));
    }

    if stmts.is_empty() {
        return (quote!(), false);
    }

    (
        quote! {
            fn initialize(&self) {
                #(#stmts)*
            }
        },
        true,
    )
}

fn constructors(ctx: &DeclContext, has_initialize: bool) -> Result<TokenStream, GenError> {
    let decl = ctx.decl;
    let params: Vec<_> = ctx.params().collect();

    let param_decls = params.iter().map(|plan| plan.ctor_param());
    let param_idents = params.iter().map(|plan| &plan.ident);
    let extensions = ctx
        .members
        .iter()
        .filter(|plan| !plan.is_serialized())
        .map(|plan| {
            let ident = &plan.ident;
            quote!(#ident: ::core::default::Default::default(),)
        });

    let base = ctx
        .is_bindable()
        .then(|| quote!(base: ::core::default::Default::default(),));
    let intern_roots = decl
        .is_intern_root()
        .then(|| quote!(intern_roots: ::core::default::Default::default(),));
    let (unknown_params, unknown_init) = if decl.is_unknown() {
        (
            quote! {
                unknown_id: ::rdgen_runtime::id::RdId,
                unknown_bytes: ::std::vec::Vec<u8>,
            },
            quote!(unknown_id, unknown_bytes,),
        )
    } else {
        (quote!(), quote!())
    };

    let construct = quote! {
        Self {
            #base
            #(#param_idents,)*
            #(#extensions)*
            #intern_roots
            #unknown_init
        }
    };
    let body = if has_initialize {
        quote! {
            let res = #construct;
            res.initialize();
            res
        }
    } else {
        construct
    };

    let vis = ctx.primary_ctor_vis();
    let primary = ctx.primary_ctor();
    let mut tokens = quote! {
        #[must_use]
        #vis fn #primary(#(#param_decls,)* #unknown_params) -> Self {
            #body
        }
    };

    if ctx.has_secondary_ctor() {
        let required = params
            .iter()
            .filter(|plan| !plan.empty_constructible)
            .map(|plan| plan.ctor_param());
        let args = params
            .iter()
            .map(|plan| {
                if plan.empty_constructible {
                    plan.default_expr(ctx.generator, ctx.scope)
                } else {
                    let ident = &plan.ident;
                    Ok(quote!(#ident))
                }
            })
            .collect::<Result<Vec<_>, _>>()?;

        tokens.extend(quote! {
            #[must_use]
            pub fn new(#(#required),*) -> Self {
                Self::#primary(#(#args),*)
            }
        });
    }

    Ok(tokens)
}

fn default_impl(ctx: &DeclContext) -> Result<Option<TokenStream>, GenError> {
    if !model::is_defaultable_decl(ctx.generator.schema(), ctx.decl) {
        return Ok(None);
    }

    let primary = ctx.primary_ctor();
    let args = ctx
        .params()
        .map(|plan| plan.default_expr(ctx.generator, ctx.scope))
        .collect::<Result<Vec<_>, _>>()?;
    let tokens = Implementor::new(&ctx.ident, TraitKind::Default).set_tokens(quote! {
        fn default() -> Self {
            Self::#primary(#(#args),*)
        }
    });

    Ok(Some(quote!(#tokens)))
}

// ancestor_impls
// one trait impl per abstract ancestor, carrying the getters it declares
fn ancestor_impls(ctx: &DeclContext) -> Result<Vec<TokenStream>, GenError> {
    let type_ident = &ctx.ident;
    let mut out = Vec::new();

    for ancestor in ctx.generator.schema().ancestors(ctx.decl) {
        if !ancestor.is_abstract() {
            continue;
        }
        let path = ctx.decl_path(&ancestor.name)?;
        let getters = ctx
            .declared_by(ancestor)
            .map(|plan| plan.getter(ctx.generator, ctx.scope).map(|g| g.implementation()))
            .collect::<Result<Vec<_>, _>>()?;
        let eq_dyn = (ancestor.is_struct() && ancestor.base.is_none()).then(|| {
            quote! {
                fn eq_dyn(&self, other: &dyn ::core::any::Any) -> bool {
                    other.downcast_ref::<Self>().is_some_and(|other| self == other)
                }
            }
        });

        out.push(quote! {
            impl #path for #type_ident {
                #(#getters)*
                #eq_dyn
            }
        });
    }

    Ok(out)
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Generator, config::GeneratorConfig};
    use rdgen_schema::{
        build::SchemaBuilder,
        node::*,
        types::{DefaultValue, Type},
    };

    fn schema() -> Schema {
        SchemaBuilder::new(Declaration::root("Model"))
            .declare(Declaration::enumeration("Color", &["Red", "Green"]))
            .declare(
                Declaration::structure("Point")
                    .member(Field::new("x", Type::INT).with_default(DefaultValue::Long(3)))
                    .member(Field::new("y", Type::INT)),
            )
            .declare(Declaration::abstract_class("Shape").member(Field::new("label", Type::STRING)))
            .declare(
                Declaration::class("Circle")
                    .extends("Shape")
                    .member(Field::new("radius", Type::DOUBLE))
                    .member(Reactive::property("color", Type::enumeration("Color"))),
            )
            .declare(
                Declaration::class("Session")
                    .intern_root("Protocol")
                    .member(Field::new("name", Type::STRING.interned("Protocol"))),
            )
            .build()
            .unwrap()
    }

    fn emit_for(name: &str) -> String {
        let schema = schema();
        let generator = Generator::new(&schema, GeneratorConfig::default());
        let decl = schema.get(name).unwrap();
        let ctx = DeclContext::new(&generator, decl, decl).unwrap();

        emit(&ctx, quote!()).unwrap().to_string().replace(' ', "")
    }

    #[test]
    fn structs_are_cloneable_values() {
        let out = emit_for("Point");

        assert!(out.contains("#[derive(Clone,Debug)]pubstructPoint{x:i32,y:i32,}"), "{out}");
        assert!(out.contains("pubfnnew(x:i32,y:i32,)->Self"), "{out}");
        assert!(out.contains("Self::new(3,::core::default::Default::default())"), "{out}");
        assert!(!out.contains("RdId::read"), "{out}");
    }

    #[test]
    fn classes_implement_their_ancestor_trait() {
        let out = emit_for("Circle");

        assert!(out.contains("base:::rdgen_runtime::bindable::RdBindableBase,"), "{out}");
        assert!(out.contains("implShapeforCircle{fnlabel(&self)->&str{self.label.as_str()}}"), "{out}");
        assert!(out.contains("pubfnradius(&self)->f64{self.radius}"), "{out}");
        assert!(out.contains("self.color.set_optimize_nested(true);"), "{out}");
        assert!(out.contains("res.initialize();"), "{out}");
        assert!(out.contains("res.base.set_id(_id);"), "{out}");
    }

    #[test]
    fn secondary_ctor_skips_reactives() {
        let out = emit_for("Circle");

        assert!(out.contains("fnnew_full(label:::std::string::String,radius:f64,"), "{out}");
        assert!(out.contains("pubfnnew(label:::std::string::String,radius:f64)->Self"), "{out}");
    }

    #[test]
    fn intern_roots_switch_context_for_their_members() {
        let out = emit_for("Session");

        assert!(out.contains("intern_roots:::rdgen_runtime::serialization::InternRootsSlot,"), "{out}");
        assert!(out.contains("letctx=&intern_roots.attach(ctx,_id,&["), "{out}");
        assert!(out.contains("letctx=&self.intern_roots.attach(ctx,self.base.rdid(),&["), "{out}");
        assert!(out.contains("letmutres="), "{out}");
        assert!(out.contains("pubfnserialization_context(&self)"), "{out}");
    }

    #[test]
    fn interned_strings_read_back_as_str() {
        let out = emit_for("Session");

        assert!(out.contains("pubfnname(&self)->&str{self.name.as_str()}"), "{out}");
    }
}
