use crate::{
    decl::DeclContext,
    helper::{Implementor, TraitKind, i64_lit},
};
use proc_macro2::TokenStream;
use quote::{ToTokens, quote};

/// Intern scope keys of an intern-root class.
fn intern_keys(ctx: &DeclContext) -> Vec<TokenStream> {
    ctx.decl
        .intern_scopes()
        .into_iter()
        .map(|scope| i64_lit(scope.hash()))
        .collect()
}

/// `RdSerializable` and `RdPolymorphic` for a concrete struct or class.
pub fn emit(ctx: &DeclContext) -> TokenStream {
    let serializable = if ctx.decl.is_unknown() {
        unknown_serializable(ctx)
    } else {
        serializable(ctx)
    };

    let polymorphic = polymorphic(ctx);

    quote! {
        #serializable
        #polymorphic
    }
}

// serializable
// classes lead with their wire id; intern roots then switch to fresh tables
// for their own members on every read and write
fn serializable(ctx: &DeclContext) -> TokenStream {
    let type_ident = &ctx.ident;
    let is_class = ctx.decl.is_class();
    let is_intern_root = ctx.decl.is_intern_root();
    let keys = intern_keys(ctx);
    let primary = ctx.primary_ctor();

    let reads = ctx.params().map(|plan| plan.read_stmt());
    let locals = ctx.params().map(|plan| &plan.local);
    let writes = ctx.params().map(|plan| plan.write_stmt());

    let read_id = is_class.then(|| quote!(let _id = ::rdgen_runtime::id::RdId::read(buffer)?;));
    let set_id = is_class.then(|| quote!(res.base.set_id(_id);));
    let write_id = is_class.then(|| quote!(self.base.rdid().write(buffer);));

    let (read_ctx, keep_roots, write_ctx) = if is_intern_root {
        (
            quote! {
                let intern_roots = ::rdgen_runtime::serialization::InternRootsSlot::default();
                let ctx = &intern_roots.attach(ctx, _id, &[#(#keys),*]);
            },
            quote!(res.intern_roots = intern_roots;),
            quote! {
                let ctx = &self.intern_roots.attach(ctx, self.base.rdid(), &[#(#keys),*]);
            },
        )
    } else {
        (quote!(), quote!(), quote!())
    };
    let binding = if is_intern_root {
        quote!(let mut res)
    } else {
        quote!(let res)
    };

    Implementor::new(type_ident, TraitKind::RdSerializable)
        .set_tokens(quote! {
            fn read(
                ctx: &::rdgen_runtime::serialization::SerializationCtx,
                buffer: &mut ::rdgen_runtime::buffer::Buffer,
            ) -> ::core::result::Result<Self, ::rdgen_runtime::error::WireError> {
                #read_id
                #read_ctx
                #(#reads)*
                #binding = Self::#primary(#(#locals),*);
                #set_id
                #keep_roots
                ::core::result::Result::Ok(res)
            }

            fn write(
                &self,
                ctx: &::rdgen_runtime::serialization::SerializationCtx,
                buffer: &mut ::rdgen_runtime::buffer::Buffer,
            ) -> ::core::result::Result<(), ::rdgen_runtime::error::WireError> {
                #write_id
                #write_ctx
                #(#writes)*
                ::core::result::Result::Ok(())
            }
        })
        .to_token_stream()
}

// unknown_serializable
// an unknown payload is only ever built by its abstract base, and written
// back verbatim after the members it shares with the base
fn unknown_serializable(ctx: &DeclContext) -> TokenStream {
    let type_ident = &ctx.ident;
    let name = &ctx.decl.name;
    let write_id = ctx
        .decl
        .is_class()
        .then(|| quote!(self.base.rdid().write(buffer);));
    let writes = ctx.params().map(|plan| plan.write_stmt());

    Implementor::new(type_ident, TraitKind::RdSerializable)
        .set_tokens(quote! {
            fn read(
                _: &::rdgen_runtime::serialization::SerializationCtx,
                _: &mut ::rdgen_runtime::buffer::Buffer,
            ) -> ::core::result::Result<Self, ::rdgen_runtime::error::WireError> {
                ::core::result::Result::Err(
                    ::rdgen_runtime::error::WireError::UnknownInstanceRead(#name),
                )
            }

            fn write(
                &self,
                ctx: &::rdgen_runtime::serialization::SerializationCtx,
                buffer: &mut ::rdgen_runtime::buffer::Buffer,
            ) -> ::core::result::Result<(), ::rdgen_runtime::error::WireError> {
                #write_id
                #(#writes)*
                buffer.write_raw(&self.unknown_bytes);
                ::core::result::Result::Ok(())
            }
        })
        .to_token_stream()
}

fn polymorphic(ctx: &DeclContext) -> TokenStream {
    let type_ident = &ctx.ident;
    let name = &ctx.decl.name;
    let type_id = if ctx.decl.is_unknown() {
        quote!(self.unknown_id)
    } else {
        quote!(::rdgen_runtime::id::RdId::from_type_name(#name))
    };

    Implementor::new(type_ident, TraitKind::RdPolymorphic)
        .set_tokens(quote! {
            fn type_name(&self) -> &'static str {
                #name
            }

            fn rd_type_id(&self) -> ::rdgen_runtime::id::RdId {
                #type_id
            }

            fn write_polymorphic(
                &self,
                ctx: &::rdgen_runtime::serialization::SerializationCtx,
                buffer: &mut ::rdgen_runtime::buffer::Buffer,
            ) -> ::core::result::Result<(), ::rdgen_runtime::error::WireError> {
                ::rdgen_runtime::serialization::RdSerializable::write(self, ctx, buffer)
            }

            fn hash_code_dyn(&self) -> i64 {
                ::rdgen_runtime::hash::RdHash::rd_hash(self)
            }

            fn as_any(&self) -> &dyn ::core::any::Any {
                self
            }
        })
        .to_token_stream()
}
