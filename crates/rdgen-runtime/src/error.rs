use crate::id::RdId;
use thiserror::Error as ThisError;

///
/// WireError
///
/// Failures while decoding or encoding a message. An unrecognized
/// polymorphic type id is not among them: it decodes to an Unknown instance.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
#[remain::sorted]
pub enum WireError {
    #[error("intern root context requested before it was attached")]
    ContextNotAttached,

    #[error("unexpected end of buffer: needed {needed} bytes, {remaining} remaining")]
    EndOfBuffer { needed: usize, remaining: usize },

    #[error("invalid boolean byte {0}")]
    InvalidBool(u8),

    #[error("invalid ordinal {ordinal} for enum '{type_name}'")]
    InvalidEnumOrdinal {
        type_name: &'static str,
        ordinal: i32,
    },

    #[error("invalid length {0}")]
    InvalidLength(i32),

    #[error("invalid UTF-16 string")]
    InvalidUtf16,

    #[error("polymorphic payload of {type_id} declared {declared} bytes but used {consumed}")]
    PayloadSizeMismatch {
        type_id: RdId,
        declared: usize,
        consumed: usize,
    },

    #[error("'{0}' is an unknown instance and cannot be read directly")]
    UnknownInstanceRead(&'static str),

    #[error("unknown intern reference {index} in scope {scope}")]
    UnknownInternReference { scope: i64, index: i32 },

    #[error("no serializer registered for type id {0}")]
    UnregisteredType(RdId),
}
