use convert_case::{Case, Casing};
use proc_macro2::{Literal, Span, TokenStream};
use quote::{ToTokens, format_ident, quote};
use rdgen_schema::{node::Declaration, validate::naming::member_ident};
use syn::Ident;

// Identifier helpers

/// Identifier for a declaration or enum constant, escaped when it is a keyword.
#[must_use]
pub fn ident(name: &str) -> Ident {
    if syn::parse_str::<Ident>(name).is_ok() {
        format_ident!("{name}")
    } else {
        Ident::new_raw(name, Span::call_site())
    }
}

/// Snake-case identifier for a member's field and getter.
#[must_use]
pub fn field_ident(name: &str) -> Ident {
    ident(&member_ident(name))
}

/// Module identifier of a toplevel.
#[must_use]
pub fn module_ident(toplevel: &Declaration) -> Ident {
    ident(&toplevel.name.to_case(Case::Snake))
}

/// Key an extension is stored under on its pointcut.
#[must_use]
pub fn extension_name(decl: &Declaration) -> String {
    if let Some(name) = decl.explicit_ext_name() {
        return name.to_string();
    }

    let mut chars = decl.name.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_lowercase().chain(chars).collect()
    })
}

/// `i64` literal, negated when below zero so `i64::MIN` stays in range.
#[must_use]
pub fn i64_lit(value: i64) -> TokenStream {
    let abs = Literal::u64_unsuffixed(value.unsigned_abs());
    if value < 0 { quote!(-#abs) } else { quote!(#abs) }
}

/// `#[doc]` attributes, one per line.
#[must_use]
pub fn doc_attrs(documentation: Option<&str>) -> TokenStream {
    let lines = documentation
        .into_iter()
        .flat_map(str::lines)
        .map(|line| format!(" {}", line.trim_end()));

    quote!(#(#[doc = #lines])*)
}

///
/// TraitKind
///
/// Runtime and std traits the generated code implements.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[remain::sorted]
pub enum TraitKind {
    AbstractDeclaration,
    Default,
    Hash,
    PartialEq,
    RdBindable,
    RdDynamic,
    RdEnum,
    RdHash,
    RdPolymorphic,
    RdSerializable,
}

impl TraitKind {
    #[must_use]
    #[remain::check]
    pub fn path(self) -> TokenStream {
        #[remain::sorted]
        match self {
            Self::AbstractDeclaration => {
                quote!(::rdgen_runtime::serialization::AbstractDeclaration)
            }
            Self::Default => quote!(::core::default::Default),
            Self::Hash => quote!(::core::hash::Hash),
            Self::PartialEq => quote!(::core::cmp::PartialEq),
            Self::RdBindable => quote!(::rdgen_runtime::bindable::RdBindable),
            Self::RdDynamic => quote!(::rdgen_runtime::bindable::RdDynamic),
            Self::RdEnum => quote!(::rdgen_runtime::serialization::RdEnum),
            Self::RdHash => quote!(::rdgen_runtime::hash::RdHash),
            Self::RdPolymorphic => quote!(::rdgen_runtime::serialization::RdPolymorphic),
            Self::RdSerializable => quote!(::rdgen_runtime::serialization::RdSerializable),
        }
    }
}

impl ToTokens for TraitKind {
    fn to_tokens(&self, tokens: &mut TokenStream) {
        self.path().to_tokens(tokens);
    }
}

///
/// Implementor
///
/// `impl Trait for Target { .. }` with the body supplied separately.
///

pub struct Implementor {
    target: TokenStream,
    kind: TraitKind,
    tokens: TokenStream,
}

impl Implementor {
    pub fn new(target: impl ToTokens, kind: TraitKind) -> Self {
        Self {
            target: target.to_token_stream(),
            kind,
            tokens: quote!(),
        }
    }

    #[must_use]
    pub fn set_tokens(mut self, tokens: TokenStream) -> Self {
        self.tokens = tokens;
        self
    }
}

impl ToTokens for Implementor {
    fn to_tokens(&self, tokens: &mut TokenStream) {
        let Self {
            target,
            kind,
            tokens: body,
        } = self;

        tokens.extend(quote! {
            impl #kind for #target {
                #body
            }
        });
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keywords_become_raw_identifiers() {
        assert_eq!(ident("type").to_string(), "r#type");
        assert_eq!(ident("Point").to_string(), "Point");
        assert_eq!(field_ident("fooBar").to_string(), "foo_bar");
        assert_eq!(field_ident("match").to_string(), "r#match");
    }

    #[test]
    fn extension_name_lowercases_the_first_letter() {
        assert_eq!(extension_name(&Declaration::ext("SolutionModel", None)), "solutionModel");
        assert_eq!(
            extension_name(&Declaration::ext("SolutionModel", None).ext_name("sln")),
            "sln"
        );
    }

    #[test]
    fn negative_literals_are_negated_tokens() {
        assert_eq!(i64_lit(-7).to_string(), "- 7");
        assert_eq!(i64_lit(i64::MIN).to_string(), "- 9223372036854775808");
        assert_eq!(i64_lit(42).to_string(), "42");
    }

    #[test]
    fn documentation_becomes_one_attribute_per_line() {
        let docs = doc_attrs(Some("first\nsecond")).to_string();

        assert_eq!(docs.matches("doc").count(), 2, "{docs}");
        assert!(doc_attrs(None).is_empty());
    }

    #[test]
    fn implementor_wraps_the_body() {
        let tokens = Implementor::new(quote!(Point), TraitKind::RdHash)
            .set_tokens(quote!(fn rd_hash(&self) -> i64 { 0 }))
            .to_token_stream()
            .to_string();

        assert!(tokens.starts_with("impl :: rdgen_runtime :: hash :: RdHash for Point"), "{tokens}");
    }
}
