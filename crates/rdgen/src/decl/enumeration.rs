use crate::helper::{Implementor, TraitKind, doc_attrs, ident};
use proc_macro2::{Literal, TokenStream};
use quote::quote;
use rdgen_schema::node::Declaration;

// emit
// enums travel as their ordinal, so constants keep declaration order
pub fn emit(decl: &Declaration) -> TokenStream {
    let name = &decl.name;
    let type_ident = ident(name);
    let docs = doc_attrs(decl.documentation.as_deref());

    let variants: Vec<_> = decl
        .members
        .iter()
        .enumerate()
        .map(|(i, member)| {
            let variant = ident(member.name());
            let docs = doc_attrs(member.documentation());
            let default = (i == 0).then(|| quote!(#[default]));

            quote!(#docs #default #variant)
        })
        .collect();

    let derive = if decl.members.is_empty() {
        quote!(#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)])
    } else {
        quote!(#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)])
    };

    let (to_ordinal, from_ordinal): (Vec<_>, Vec<_>) = decl
        .members
        .iter()
        .enumerate()
        .map(|(i, member)| {
            let variant = ident(member.name());
            let ordinal = Literal::usize_unsuffixed(i);

            (
                quote!(Self::#variant => #ordinal,),
                quote!(#ordinal => ::core::option::Option::Some(Self::#variant),),
            )
        })
        .unzip();

    let rd_enum = Implementor::new(&type_ident, TraitKind::RdEnum).set_tokens(quote! {
        const TYPE_NAME: &'static str = #name;

        fn ordinal(self) -> i32 {
            match self {
                #(#to_ordinal)*
            }
        }

        fn from_ordinal(ordinal: i32) -> ::core::option::Option<Self> {
            match ordinal {
                #(#from_ordinal)*
                _ => ::core::option::Option::None,
            }
        }
    });

    let rd_hash = Implementor::new(&type_ident, TraitKind::RdHash).set_tokens(quote! {
        fn rd_hash(&self) -> i64 {
            i64::from(::rdgen_runtime::serialization::RdEnum::ordinal(*self))
        }
    });

    quote! {
        #docs
        #derive
        pub enum #type_ident {
            #(#variants,)*
        }

        #rd_enum
        #rd_hash
    }
}

///
/// TESTS
///
