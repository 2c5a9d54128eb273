use crate::{Generator, error::GenError};
use proc_macro2::TokenStream;
use quote::quote;
use rdgen_schema::{
    node::{Declaration, NodeError},
    types::{PredefinedType, Type},
};

/// Rust type a member of type `ty` is stored as, seen from `scope`.
pub fn surface(generator: &Generator, ty: &Type, scope: &Declaration) -> Result<TokenStream, GenError> {
    let tokens = match ty {
        Type::Predefined(p) => predefined(*p),
        Type::Enum(name) => generator.decl_path(name, scope)?,
        Type::Declaration(name) => {
            let target = generator.schema().try_get(name)?;
            let path = generator.decl_path(name, scope)?;

            if target.is_abstract() {
                quote!(::std::rc::Rc<dyn #path>)
            } else if target.is_class() {
                quote!(::std::rc::Rc<#path>)
            } else if target.is_struct() {
                path
            } else {
                return Err(NodeError::IncorrectKind {
                    name: name.clone(),
                    expected: "struct or class",
                }
                .into());
            }
        }
        Type::Nullable(item) => {
            let inner = surface(generator, item, scope)?;
            quote!(::core::option::Option<#inner>)
        }
        Type::Array(item) | Type::ImmutableList(item) => {
            let inner = surface(generator, item, scope)?;
            quote!(::std::vec::Vec<#inner>)
        }
        Type::Interned { item, .. } => surface(generator, item, scope)?,
    };

    Ok(tokens)
}

/// Fixed Rust spelling of a predefined type.
#[must_use]
#[remain::check]
pub fn predefined(p: PredefinedType) -> TokenStream {
    #[remain::sorted]
    match p {
        PredefinedType::Bool => quote!(bool),
        PredefinedType::Byte => quote!(i8),
        PredefinedType::Char => quote!(u16),
        PredefinedType::DateTime => quote!(::rdgen_runtime::types::DateTime),
        PredefinedType::Double => quote!(f64),
        PredefinedType::Float => quote!(f32),
        PredefinedType::Guid => quote!(::rdgen_runtime::types::Guid),
        PredefinedType::Int => quote!(i32),
        PredefinedType::Long => quote!(i64),
        PredefinedType::RdId => quote!(::rdgen_runtime::id::RdId),
        PredefinedType::SecureString => quote!(::rdgen_runtime::types::SecureString),
        PredefinedType::Short => quote!(i16),
        PredefinedType::String => quote!(::std::string::String),
        PredefinedType::Uri => quote!(::rdgen_runtime::types::Uri),
        PredefinedType::Void => quote!(::rdgen_runtime::types::Void),
    }
}

///
/// TESTS
///
