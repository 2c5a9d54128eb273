//! Toplevel units: the entity itself (with its fingerprint, serializer
//! registration and attachment) followed by every declaration it owns.

use crate::{
    Generator,
    decl::{self, DeclContext, emit_concrete},
    error::GenError,
    helper::{extension_name, i64_lit, ident, module_ident},
    model,
};
use proc_macro2::TokenStream;
use quote::quote;
use rdgen_schema::{
    fingerprint::serialization_hash,
    node::{Declaration, ToplevelKind},
};

/// Contents of the module generated for one toplevel.
pub fn emit_module(generator: &Generator, toplevel: &Declaration) -> Result<TokenStream, GenError> {
    let schema = generator.schema();
    let ctx = DeclContext::new(generator, toplevel, toplevel)?;

    let mut extra = fingerprint(generator, toplevel);
    extra.extend(register_serializers(generator, toplevel)?);
    if toplevel.is_root() {
        extra.extend(connect(toplevel));
    } else {
        extra.extend(extension_factory(generator, toplevel)?);
    }
    let entity = emit_concrete(&ctx, extra)?;

    let declared = schema.declared_types(toplevel);
    let items = declared
        .iter()
        .map(|decl| decl::emit(generator, decl))
        .collect::<Result<Vec<_>, _>>()?;

    tracing::debug!(
        toplevel = %toplevel.name,
        declarations = declared.len(),
        "generated toplevel"
    );

    Ok(quote! {
        use super::*;

        #entity
        #(#items)*
    })
}

fn fingerprint(generator: &Generator, toplevel: &Declaration) -> TokenStream {
    let hash = i64_lit(serialization_hash(generator.schema(), toplevel));

    quote! {
        /// Fingerprint of the declarations this unit serializes.
        pub const SERIALIZATION_HASH: i64 = #hash;
    }
}

// register_serializers
// every concrete declared type, under itself and under each abstract ancestor;
// the root also registers on behalf of its extensions
fn register_serializers(
    generator: &Generator,
    toplevel: &Declaration,
) -> Result<TokenStream, GenError> {
    let schema = generator.schema();
    let mut stmts = Vec::new();

    for decl in schema.declared_types(toplevel) {
        if !decl.is_concrete() {
            continue;
        }
        let name = &decl.name;
        let path = generator.decl_path(name, toplevel)?;

        stmts.push(quote! {
            serializers.register::<#path>(
                ::rdgen_runtime::id::RdId::from_type_name(#name),
                |ctx: &::rdgen_runtime::serialization::SerializationCtx,
                 buffer: &mut ::rdgen_runtime::buffer::Buffer|
                 -> ::core::result::Result<::std::rc::Rc<#path>, ::rdgen_runtime::error::WireError> {
                    <#path as ::rdgen_runtime::serialization::RdSerializable>::read(ctx, buffer)
                        .map(::std::rc::Rc::new)
                },
            );
        });

        for ancestor in schema.ancestors(decl) {
            if !ancestor.is_abstract() {
                continue;
            }
            let trait_path = generator.decl_path(&ancestor.name, toplevel)?;

            stmts.push(quote! {
                serializers.register::<dyn #trait_path>(
                    ::rdgen_runtime::id::RdId::from_type_name(#name),
                    |ctx: &::rdgen_runtime::serialization::SerializationCtx,
                     buffer: &mut ::rdgen_runtime::buffer::Buffer|
                     -> ::core::result::Result<::std::rc::Rc<dyn #trait_path>, ::rdgen_runtime::error::WireError> {
                        let res = <#path as ::rdgen_runtime::serialization::RdSerializable>::read(ctx, buffer)?;
                        ::core::result::Result::Ok(::std::rc::Rc::new(res) as ::std::rc::Rc<dyn #trait_path>)
                    },
                );
            });
        }
    }

    if let Some(unit) = toplevel.as_toplevel()
        && let ToplevelKind::Root { toplevels } = &unit.kind
    {
        let mut names: Vec<&String> = toplevels.iter().collect();
        names.sort();
        for name in names {
            let ext = schema.try_get(name)?;
            let module = module_ident(ext);
            let ext_ident = ident(&ext.name);

            stmts.push(quote!(super::#module::#ext_ident::register_serializers(serializers);));
        }
    }

    Ok(quote! {
        /// Register readers for every concrete type this unit declares.
        pub fn register_serializers(serializers: &::rdgen_runtime::serialization::Serializers) {
            #(#stmts)*
        }
    })
}

fn connect(root: &Declaration) -> TokenStream {
    let name = &root.name;

    quote! {
        /// Register serializers, assign ids and bind this model under the
        /// protocol root.
        pub fn connect(
            &self,
            lifetime: &::rdgen_runtime::lifetime::Lifetime,
            protocol: &::rdgen_runtime::protocol::Protocol,
        ) {
            Self::register_serializers(protocol.serializers());
            ::rdgen_runtime::bindable::RdBindable::identify(
                self,
                protocol.identities(),
                ::rdgen_runtime::id::RdId::NULL.mix(#name),
            );
            ::rdgen_runtime::bindable::RdBindable::bind(self, lifetime, protocol.root(), #name);
        }
    }
}

// extension_factory
// an extension lives on its pointcut under its extension name
fn extension_factory(generator: &Generator, ext: &Declaration) -> Result<TokenStream, GenError> {
    let schema = generator.schema();
    let pointcut = ext
        .pointcut()
        .ok_or_else(|| GenError::MissingPointcut(ext.name.clone()))?;
    if !model::is_defaultable_decl(schema, ext) {
        return Err(GenError::NotDefaultable {
            decl: ext.name.clone(),
            context: "the extension factory".to_string(),
        });
    }

    let path = generator.decl_path(pointcut, ext)?;
    let target = if schema.try_get(pointcut)?.is_abstract() {
        quote!(&dyn #path)
    } else {
        quote!(&#path)
    };
    let ext_name = extension_name(ext);

    Ok(quote! {
        /// The extension attached to `pointcut`, created on first use.
        /// `None` when another type already occupies the extension name.
        #[must_use]
        pub fn get_or_create_extension_of(
            pointcut: #target,
        ) -> ::core::option::Option<::std::rc::Rc<Self>> {
            ::rdgen_runtime::bindable::RdDynamic::bindable_base(pointcut)
                .get_or_create_extension(#ext_name, Self::default)
        }
    })
}

///
/// TESTS
///
