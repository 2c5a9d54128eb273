use crate::{
    Generator,
    decl::{DeclContext, concrete},
    error::GenError,
    helper::{Implementor, TraitKind, doc_attrs},
};
use proc_macro2::TokenStream;
use quote::quote;
use rdgen_schema::node::{Declaration, NodeError};

/// An abstract declaration becomes a trait object type with a synthesized
/// Unknown implementor that keeps unrecognized payloads intact.
pub fn emit(generator: &Generator, decl: &Declaration) -> Result<TokenStream, GenError> {
    let unknown = decl
        .synthesize_unknown()
        .ok_or_else(|| NodeError::IncorrectKind {
            name: decl.name.clone(),
            expected: "abstract declaration",
        })?;

    let ctx = DeclContext::new(generator, decl, decl)?;
    let unknown_ctx = DeclContext::new(generator, &unknown, decl)?;

    let definition = trait_definition(&ctx)?;
    let reader = unknown_reader(&ctx, &unknown_ctx);
    let equality = dyn_equality(&ctx);
    let unknown_tokens = concrete::emit(&unknown_ctx, quote!())?;

    Ok(quote! {
        #definition
        #reader
        #equality
        #unknown_tokens
    })
}

fn trait_definition(ctx: &DeclContext) -> Result<TokenStream, GenError> {
    let decl = ctx.decl;
    let type_ident = &ctx.ident;
    let docs = doc_attrs(decl.documentation.as_deref());
    let aliases = ctx.aliases.items();

    let mut supertraits = vec![
        quote!(::rdgen_runtime::serialization::RdPolymorphic),
        quote!(::core::fmt::Debug),
    ];
    if decl.is_class() {
        supertraits.push(quote!(::rdgen_runtime::bindable::RdDynamic));
    }
    if let Some(base) = &decl.base {
        supertraits.push(ctx.decl_path(base)?);
    }

    let getters = ctx
        .own()
        .iter()
        .map(|plan| plan.getter(ctx.generator, ctx.scope).map(|g| g.declaration()))
        .collect::<Result<Vec<_>, _>>()?;
    let eq_dyn = (decl.is_struct() && decl.base.is_none()).then(|| {
        quote! {
            /// Value equality against another member of this family.
            fn eq_dyn(&self, other: &dyn ::core::any::Any) -> bool;
        }
    });

    Ok(quote! {
        #aliases

        #docs
        pub trait #type_ident: #(#supertraits)+* {
            #(#getters)*
            #eq_dyn
        }
    })
}

// unknown_reader
// reads the members this side knows, keeps the rest of the payload as bytes
fn unknown_reader(ctx: &DeclContext, unknown: &DeclContext) -> TokenStream {
    let type_ident = &ctx.ident;
    let unknown_ident = &unknown.ident;
    let is_class = ctx.decl.is_class();

    let reads = unknown.params().map(|plan| plan.read_stmt());
    let locals = unknown.params().map(|plan| &plan.local);
    let read_id = is_class.then(|| quote!(let _id = ::rdgen_runtime::id::RdId::read(buffer)?;));
    let set_id = is_class.then(|| quote!(res.base.set_id(_id);));

    let reader = Implementor::new(quote!(dyn #type_ident), TraitKind::AbstractDeclaration)
        .set_tokens(quote! {
            fn read_unknown_instance(
                ctx: &::rdgen_runtime::serialization::SerializationCtx,
                buffer: &mut ::rdgen_runtime::buffer::Buffer,
                unknown_id: ::rdgen_runtime::id::RdId,
                size: usize,
            ) -> ::core::result::Result<
                ::std::rc::Rc<Self>,
                ::rdgen_runtime::error::WireError,
            > {
                let start = buffer.position();
                #read_id
                #(#reads)*
                let unknown_bytes = buffer.read_rest_of(start, size)?;
                let res = #unknown_ident::new(#(#locals,)* unknown_id, unknown_bytes);
                #set_id
                ::core::result::Result::Ok(::std::rc::Rc::new(res) as ::std::rc::Rc<Self>)
            }
        });

    quote!(#reader)
}

// dyn_equality
// abstract classes compare by identity, abstract structs by value
fn dyn_equality(ctx: &DeclContext) -> TokenStream {
    let type_ident = &ctx.ident;
    let target = quote!(dyn #type_ident);

    let eq = if ctx.decl.is_struct() {
        quote!(self.eq_dyn(::rdgen_runtime::serialization::RdPolymorphic::as_any(other)))
    } else {
        quote!(::std::ptr::addr_eq(self, other))
    };

    let partial_eq = Implementor::new(&target, TraitKind::PartialEq).set_tokens(quote! {
        fn eq(&self, other: &Self) -> bool {
            #eq
        }
    });
    let rd_hash = Implementor::new(&target, TraitKind::RdHash).set_tokens(quote! {
        fn rd_hash(&self) -> i64 {
            self.hash_code_dyn()
        }
    });

    quote!(#partial_eq #rd_hash)
}

///
/// TESTS
///
