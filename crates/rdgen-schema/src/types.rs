use crate::prelude::*;
use derive_more::Display;
use rdgen_primitives::platform_independent_hash;
use std::fmt;

///
/// PredefinedType
///

#[derive(
    Clone, Copy, Debug, Deserialize, Display, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
#[serde(rename_all = "camelCase")]
#[remain::sorted]
pub enum PredefinedType {
    Bool,
    Byte,
    Char,
    DateTime,
    Double,
    Float,
    Guid,
    Int,
    Long,
    RdId,
    SecureString,
    Short,
    String,
    Uri,
    Void,
}

impl PredefinedType {
    /// Fixed-width numeric (and bool/char) types that have a bulk array codec.
    #[must_use]
    pub const fn is_primitive(self) -> bool {
        matches!(
            self,
            Self::Bool
                | Self::Byte
                | Self::Char
                | Self::Double
                | Self::Float
                | Self::Int
                | Self::Long
                | Self::Short
        )
    }

    // signature
    // lower-case structural spelling, part of the fingerprint
    #[must_use]
    pub const fn signature(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Byte => "byte",
            Self::Char => "char",
            Self::DateTime => "dateTime",
            Self::Double => "double",
            Self::Float => "float",
            Self::Guid => "guid",
            Self::Int => "int",
            Self::Long => "long",
            Self::RdId => "rdId",
            Self::SecureString => "secureString",
            Self::Short => "short",
            Self::String => "string",
            Self::Uri => "uri",
            Self::Void => "void",
        }
    }
}

///
/// InternScope
///
/// Names a dedup scope. The hash of the key name is the wire key shared by
/// every process speaking the protocol.
///

#[derive(Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct InternScope {
    pub key_name: String,
}

impl InternScope {
    #[must_use]
    pub fn new(key_name: impl Into<String>) -> Self {
        Self {
            key_name: key_name.into(),
        }
    }

    #[must_use]
    pub fn hash(&self) -> i64 {
        platform_independent_hash(&self.key_name)
    }
}

///
/// Type
///
/// Structural type of a field or reactive generic parameter. `Ord` so that
/// delegating codecs can be memoized by structure.
///

#[derive(Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Type {
    Predefined(PredefinedType),
    Enum(String),
    Declaration(String),
    Nullable(Box<Self>),
    Array(Box<Self>),
    ImmutableList(Box<Self>),
    Interned { item: Box<Self>, scope: InternScope },
}

impl Type {
    pub const BOOL: Self = Self::Predefined(PredefinedType::Bool);
    pub const BYTE: Self = Self::Predefined(PredefinedType::Byte);
    pub const CHAR: Self = Self::Predefined(PredefinedType::Char);
    pub const DATE_TIME: Self = Self::Predefined(PredefinedType::DateTime);
    pub const DOUBLE: Self = Self::Predefined(PredefinedType::Double);
    pub const FLOAT: Self = Self::Predefined(PredefinedType::Float);
    pub const GUID: Self = Self::Predefined(PredefinedType::Guid);
    pub const INT: Self = Self::Predefined(PredefinedType::Int);
    pub const LONG: Self = Self::Predefined(PredefinedType::Long);
    pub const RD_ID: Self = Self::Predefined(PredefinedType::RdId);
    pub const SECURE_STRING: Self = Self::Predefined(PredefinedType::SecureString);
    pub const SHORT: Self = Self::Predefined(PredefinedType::Short);
    pub const STRING: Self = Self::Predefined(PredefinedType::String);
    pub const URI: Self = Self::Predefined(PredefinedType::Uri);
    pub const VOID: Self = Self::Predefined(PredefinedType::Void);

    #[must_use]
    pub fn enumeration(name: impl Into<String>) -> Self {
        Self::Enum(name.into())
    }

    #[must_use]
    pub fn decl(name: impl Into<String>) -> Self {
        Self::Declaration(name.into())
    }

    #[must_use]
    pub fn nullable(self) -> Self {
        Self::Nullable(Box::new(self))
    }

    #[must_use]
    pub fn array(self) -> Self {
        Self::Array(Box::new(self))
    }

    #[must_use]
    pub fn list(self) -> Self {
        Self::ImmutableList(Box::new(self))
    }

    #[must_use]
    pub fn interned(self, scope: impl Into<String>) -> Self {
        Self::Interned {
            item: Box::new(self),
            scope: InternScope::new(scope),
        }
    }

    #[must_use]
    pub const fn is_nullable(&self) -> bool {
        matches!(self, Self::Nullable(_))
    }

    /// Name of the declaration this type refers to, if any.
    #[must_use]
    pub fn referenced_name(&self) -> Option<&str> {
        match self {
            Self::Enum(name) | Self::Declaration(name) => Some(name),
            _ => None,
        }
    }

    /// Visit this type and every nested item type, outermost first.
    pub fn walk<'a>(&'a self, f: &mut impl FnMut(&'a Self)) {
        f(self);
        match self {
            Self::Nullable(item) | Self::Array(item) | Self::ImmutableList(item) => item.walk(f),
            Self::Interned { item, .. } => item.walk(f),
            Self::Predefined(_) | Self::Enum(_) | Self::Declaration(_) => {}
        }
    }

    /// Identifier-friendly name, e.g. `IntArray` or `StringNullable`.
    #[must_use]
    pub fn type_name(&self) -> String {
        match self {
            Self::Predefined(p) => p.to_string(),
            Self::Enum(name) | Self::Declaration(name) => name.clone(),
            Self::Nullable(item) => format!("{}Nullable", item.type_name()),
            Self::Array(item) => format!("{}Array", item.type_name()),
            Self::ImmutableList(item) => format!("{}List", item.type_name()),
            Self::Interned { item, .. } => format!("{}Interned", item.type_name()),
        }
    }
}

// Display
// structural spelling used by the fingerprint and in error messages
impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Predefined(p) => f.write_str(p.signature()),
            Self::Enum(name) | Self::Declaration(name) => f.write_str(name),
            Self::Nullable(item) => write!(f, "{item}?"),
            Self::Array(item) => write!(f, "{item}[]"),
            Self::ImmutableList(item) => write!(f, "List<{item}>"),
            Self::Interned { item, scope } => write!(f, "{item}@{}", scope.key_name),
        }
    }
}

///
/// FlowKind
///
/// Direction of a reactive member relative to the side being generated.
///

#[derive(
    Clone, Copy, Debug, Default, Deserialize, Display, Eq, Hash, PartialEq, Serialize,
)]
#[serde(rename_all = "snake_case")]
pub enum FlowKind {
    Sink,
    Source,
    #[default]
    Both,
}

impl FlowKind {
    /// The same member seen from the opposite side of the connection.
    #[must_use]
    pub const fn reversed(self) -> Self {
        match self {
            Self::Sink => Self::Source,
            Self::Source => Self::Sink,
            Self::Both => Self::Both,
        }
    }
}

///
/// DefaultValue
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DefaultValue {
    Bool(bool),
    Long(i64),
    Double(f64),
    String(String),
    /// Name of a constant of the member's enum type.
    Const(String),
}

///
/// TESTS
///
