use crate::prelude::*;

///
/// Member
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Member {
    EnumConst(EnumConst),
    Field(Field),
    Reactive(Reactive),
}

impl Member {
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::EnumConst(c) => &c.name,
            Self::Field(f) => &f.name,
            Self::Reactive(r) => &r.name,
        }
    }

    #[must_use]
    pub fn documentation(&self) -> Option<&str> {
        match self {
            Self::EnumConst(c) => c.documentation.as_deref(),
            Self::Field(f) => f.documentation.as_deref(),
            Self::Reactive(r) => r.documentation.as_deref(),
        }
    }

    #[must_use]
    pub const fn as_field(&self) -> Option<&Field> {
        match self {
            Self::Field(f) => Some(f),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_reactive(&self) -> Option<&Reactive> {
        match self {
            Self::Reactive(r) => Some(r),
            _ => None,
        }
    }

    /// Every type this member mentions, outermost only.
    #[must_use]
    pub fn types(&self) -> Vec<&Type> {
        match self {
            Self::EnumConst(_) => Vec::new(),
            Self::Field(f) => vec![&f.ty],
            Self::Reactive(r) => {
                let mut out: Vec<&Type> = r.generic_params.iter().collect();
                if let ReactiveKind::Extension { delegated_by } = &r.kind {
                    out.push(delegated_by);
                }
                out
            }
        }
    }
}

impl From<EnumConst> for Member {
    fn from(c: EnumConst) -> Self {
        Self::EnumConst(c)
    }
}

impl From<Field> for Member {
    fn from(f: Field) -> Self {
        Self::Field(f)
    }
}

impl From<Reactive> for Member {
    fn from(r: Reactive) -> Self {
        Self::Reactive(r)
    }
}

///
/// EnumConst
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct EnumConst {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub documentation: Option<String>,
}

impl EnumConst {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            documentation: None,
        }
    }

    #[must_use]
    pub fn doc(mut self, text: impl Into<String>) -> Self {
        self.documentation = Some(text.into());
        self
    }
}

///
/// Field
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Field {
    pub name: String,
    pub ty: Type,

    #[serde(default)]
    pub is_optional: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<DefaultValue>,

    #[serde(default = "default_true")]
    pub used_in_equals: bool,

    #[serde(default)]
    pub empty_ctor_suppressed: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub documentation: Option<String>,
}

const fn default_true() -> bool {
    true
}

impl Field {
    #[must_use]
    pub fn new(name: impl Into<String>, ty: Type) -> Self {
        Self {
            name: name.into(),
            ty,
            is_optional: false,
            default: None,
            used_in_equals: true,
            empty_ctor_suppressed: false,
            documentation: None,
        }
    }

    /// Mark the field optional; its type becomes nullable if it is not already.
    #[must_use]
    pub fn optional(mut self) -> Self {
        self.is_optional = true;
        if !self.ty.is_nullable() {
            self.ty = self.ty.nullable();
        }
        self
    }

    #[must_use]
    pub fn with_default(mut self, value: DefaultValue) -> Self {
        self.default = Some(value);
        self
    }

    #[must_use]
    pub const fn not_in_equals(mut self) -> Self {
        self.used_in_equals = false;
        self
    }

    #[must_use]
    pub const fn suppress_empty_ctor(mut self) -> Self {
        self.empty_ctor_suppressed = true;
        self
    }

    #[must_use]
    pub fn doc(mut self, text: impl Into<String>) -> Self {
        self.documentation = Some(text.into());
        self
    }
}

///
/// ReactiveKind
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReactiveKind {
    Signal,
    Task,
    Property {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        default: Option<DefaultValue>,
    },
    List,
    Set,
    Map,
    Extension {
        delegated_by: Type,
    },
}

impl ReactiveKind {
    #[must_use]
    pub const fn tag(&self) -> &'static str {
        match self {
            Self::Signal => "signal",
            Self::Task => "task",
            Self::Property { .. } => "property",
            Self::List => "list",
            Self::Set => "set",
            Self::Map => "map",
            Self::Extension { .. } => "extension",
        }
    }

    /// Number of generic parameters the kind takes.
    #[must_use]
    pub const fn arity(&self) -> usize {
        match self {
            Self::Signal | Self::Property { .. } | Self::List | Self::Set => 1,
            Self::Task | Self::Map => 2,
            Self::Extension { .. } => 0,
        }
    }
}

///
/// Reactive
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Reactive {
    pub name: String,
    pub kind: ReactiveKind,

    #[serde(default)]
    pub generic_params: Vec<Type>,

    #[serde(default)]
    pub flow: FlowKind,

    #[serde(default)]
    pub free_threaded: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub documentation: Option<String>,
}

impl Reactive {
    #[must_use]
    pub fn new(name: impl Into<String>, kind: ReactiveKind, generic_params: Vec<Type>) -> Self {
        Self {
            name: name.into(),
            kind,
            generic_params,
            flow: FlowKind::Both,
            free_threaded: false,
            documentation: None,
        }
    }

    #[must_use]
    pub fn signal(name: impl Into<String>, ty: Type) -> Self {
        Self::new(name, ReactiveKind::Signal, vec![ty])
    }

    #[must_use]
    pub fn property(name: impl Into<String>, ty: Type) -> Self {
        Self::new(name, ReactiveKind::Property { default: None }, vec![ty])
    }

    #[must_use]
    pub fn list(name: impl Into<String>, ty: Type) -> Self {
        Self::new(name, ReactiveKind::List, vec![ty])
    }

    #[must_use]
    pub fn set(name: impl Into<String>, ty: Type) -> Self {
        Self::new(name, ReactiveKind::Set, vec![ty])
    }

    #[must_use]
    pub fn map(name: impl Into<String>, key: Type, value: Type) -> Self {
        Self::new(name, ReactiveKind::Map, vec![key, value])
    }

    /// A task issued by this side.
    #[must_use]
    pub fn call(name: impl Into<String>, request: Type, response: Type) -> Self {
        Self::new(name, ReactiveKind::Task, vec![request, response]).flow(FlowKind::Source)
    }

    /// A task handled by this side.
    #[must_use]
    pub fn callback(name: impl Into<String>, request: Type, response: Type) -> Self {
        Self::new(name, ReactiveKind::Task, vec![request, response]).flow(FlowKind::Sink)
    }

    #[must_use]
    pub fn extension(name: impl Into<String>, delegated_by: Type) -> Self {
        Self::new(name, ReactiveKind::Extension { delegated_by }, Vec::new())
    }

    #[must_use]
    pub const fn flow(mut self, flow: FlowKind) -> Self {
        self.flow = flow;
        self
    }

    #[must_use]
    pub const fn free_threaded(mut self) -> Self {
        self.free_threaded = true;
        self
    }

    /// Default value of a property; ignored for other kinds.
    #[must_use]
    pub fn with_default(mut self, value: DefaultValue) -> Self {
        if let ReactiveKind::Property { default } = &mut self.kind {
            *default = Some(value);
        }
        self
    }

    #[must_use]
    pub fn doc(mut self, text: impl Into<String>) -> Self {
        self.documentation = Some(text.into());
        self
    }
}
