//! Language-neutral model of an rd protocol schema.
//!
//! The model is built once per generator run with [`build::SchemaBuilder`]
//! (or deserialized from JSON), validated into an [`error::ErrorTree`], and
//! then only read.

pub mod build;
pub mod error;
pub mod fingerprint;
pub mod node;
pub mod types;
pub mod validate;

use crate::{build::BuildError, node::NodeError};
use thiserror::Error as ThisError;

/// Maximum length for declaration and member identifiers.
pub const MAX_NAME_LEN: usize = 128;

///
/// Prelude
///

pub mod prelude {
    pub use crate::{
        err,
        error::ErrorTree,
        node::*,
        types::{DefaultValue, FlowKind, InternScope, PredefinedType, Type},
        validate::ValidateNode,
    };
    pub use serde::{Deserialize, Serialize};
}

///
/// Error
///

#[derive(Debug, ThisError)]
pub enum Error {
    #[error(transparent)]
    BuildError(#[from] BuildError),

    #[error(transparent)]
    NodeError(#[from] NodeError),
}
