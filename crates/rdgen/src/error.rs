use crate::config::ConfigError;
use rdgen_schema::node::NodeError;
use std::path::PathBuf;
use thiserror::Error as ThisError;

///
/// GenError
///
/// Fatal modeling or output problems. Generation stops at the first one.
///

#[derive(Debug, ThisError)]
#[remain::sorted]
pub enum GenError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("'{decl}.{member}': invalid default ({reason})")]
    InvalidDefault {
        decl: String,
        member: String,
        reason: String,
    },

    #[error("failed to write '{path}'")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("extension '{0}' has no pointcut to attach its factory to")]
    MissingPointcut(String),

    #[error(transparent)]
    Node(#[from] NodeError),

    #[error("'{decl}.{member}' takes part in equality but its type '{ty}' is not scalar")]
    NonScalarEquality {
        decl: String,
        member: String,
        ty: String,
    },

    #[error("'{decl}' needs a default value for {context}")]
    NotDefaultable { decl: String, context: String },

    #[error(transparent)]
    Schema(#[from] rdgen_schema::Error),

    #[error("generated code for '{unit}' does not parse: {message}")]
    Syntax { unit: String, message: String },

    #[error("'{decl}': type '{ty}' cannot be interned")]
    UnsupportedInterned { decl: String, ty: String },
}
