use crate::prelude::*;
use std::collections::BTreeSet;

///
/// StructKind
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StructKind {
    Concrete {
        #[serde(default)]
        is_unknown: bool,
    },
    Abstract,
}

///
/// ClassKind
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassKind {
    Concrete {
        #[serde(default)]
        is_unknown: bool,

        #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
        intern_root_for: BTreeSet<InternScope>,
    },
    Abstract,
}

///
/// ToplevelKind
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ToplevelKind {
    Root {
        #[serde(default)]
        toplevels: Vec<String>,
    },
    Ext {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pointcut: Option<String>,

        #[serde(default, skip_serializing_if = "Option::is_none")]
        ext_name: Option<String>,
    },
}

///
/// Toplevel
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Toplevel {
    pub kind: ToplevelKind,

    /// Declarations owned by this unit, in declaration order.
    #[serde(default)]
    pub declared_types: Vec<String>,
}

///
/// DeclKind
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeclKind {
    Enum,
    Struct(StructKind),
    Class(ClassKind),
    Toplevel(Toplevel),
}

impl DeclKind {
    /// Stable tag folded into the fingerprint.
    #[must_use]
    pub const fn tag(&self) -> &'static str {
        match self {
            Self::Enum => "enum",
            Self::Struct(StructKind::Concrete { .. }) => "struct",
            Self::Struct(StructKind::Abstract) => "abstract struct",
            Self::Class(ClassKind::Concrete { .. }) => "class",
            Self::Class(ClassKind::Abstract) => "abstract class",
            Self::Toplevel(Toplevel {
                kind: ToplevelKind::Root { .. },
                ..
            }) => "root",
            Self::Toplevel(Toplevel {
                kind: ToplevelKind::Ext { .. },
                ..
            }) => "ext",
        }
    }
}

///
/// Declaration
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Declaration {
    pub name: String,
    pub kind: DeclKind,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base: Option<String>,

    /// Own members only; inherited members live on the base.
    #[serde(default)]
    pub members: Vec<Member>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub documentation: Option<String>,

    #[serde(default)]
    pub settings: Settings,
}

impl Declaration {
    #[must_use]
    pub fn new(name: impl Into<String>, kind: DeclKind) -> Self {
        Self {
            name: name.into(),
            kind,
            base: None,
            members: Vec::new(),
            documentation: None,
            settings: Settings::default(),
        }
    }

    #[must_use]
    pub fn enumeration<S: AsRef<str>>(name: impl Into<String>, consts: &[S]) -> Self {
        let mut decl = Self::new(name, DeclKind::Enum);
        decl.members = consts
            .iter()
            .map(|c| Member::EnumConst(EnumConst::new(c.as_ref())))
            .collect();
        decl
    }

    #[must_use]
    pub fn structure(name: impl Into<String>) -> Self {
        Self::new(name, DeclKind::Struct(StructKind::Concrete { is_unknown: false }))
    }

    #[must_use]
    pub fn abstract_struct(name: impl Into<String>) -> Self {
        Self::new(name, DeclKind::Struct(StructKind::Abstract))
    }

    #[must_use]
    pub fn class(name: impl Into<String>) -> Self {
        Self::new(
            name,
            DeclKind::Class(ClassKind::Concrete {
                is_unknown: false,
                intern_root_for: BTreeSet::new(),
            }),
        )
    }

    #[must_use]
    pub fn abstract_class(name: impl Into<String>) -> Self {
        Self::new(name, DeclKind::Class(ClassKind::Abstract))
    }

    #[must_use]
    pub fn root(name: impl Into<String>) -> Self {
        Self::new(
            name,
            DeclKind::Toplevel(Toplevel {
                kind: ToplevelKind::Root {
                    toplevels: Vec::new(),
                },
                declared_types: Vec::new(),
            }),
        )
    }

    #[must_use]
    pub fn ext(name: impl Into<String>, pointcut: Option<&str>) -> Self {
        Self::new(
            name,
            DeclKind::Toplevel(Toplevel {
                kind: ToplevelKind::Ext {
                    pointcut: pointcut.map(str::to_string),
                    ext_name: None,
                },
                declared_types: Vec::new(),
            }),
        )
    }

    //
    // chaining
    //

    #[must_use]
    pub fn extends(mut self, base: impl Into<String>) -> Self {
        self.base = Some(base.into());
        self
    }

    #[must_use]
    pub fn member(mut self, member: impl Into<Member>) -> Self {
        self.members.push(member.into());
        self
    }

    #[must_use]
    pub fn doc(mut self, text: impl Into<String>) -> Self {
        self.documentation = Some(text.into());
        self
    }

    #[must_use]
    pub fn with_settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    /// Make a concrete class the intern root for a scope.
    #[must_use]
    pub fn intern_root(mut self, scope: impl Into<String>) -> Self {
        if let DeclKind::Class(ClassKind::Concrete {
            intern_root_for, ..
        }) = &mut self.kind
        {
            intern_root_for.insert(InternScope::new(scope));
        }
        self
    }

    /// Explicit extension name of an `Ext` toplevel.
    #[must_use]
    pub fn ext_name(mut self, name: impl Into<String>) -> Self {
        if let DeclKind::Toplevel(Toplevel {
            kind: ToplevelKind::Ext { ext_name, .. },
            ..
        }) = &mut self.kind
        {
            *ext_name = Some(name.into());
        }
        self
    }

    //
    // queries
    //

    #[must_use]
    pub const fn is_enum(&self) -> bool {
        matches!(self.kind, DeclKind::Enum)
    }

    #[must_use]
    pub const fn is_struct(&self) -> bool {
        matches!(self.kind, DeclKind::Struct(_))
    }

    #[must_use]
    pub const fn is_class(&self) -> bool {
        matches!(self.kind, DeclKind::Class(_))
    }

    #[must_use]
    pub const fn is_toplevel(&self) -> bool {
        matches!(self.kind, DeclKind::Toplevel(_))
    }

    /// Classes and toplevels take part in binding and identity.
    #[must_use]
    pub const fn is_bindable(&self) -> bool {
        self.is_class() || self.is_toplevel()
    }

    #[must_use]
    pub const fn is_abstract(&self) -> bool {
        matches!(
            self.kind,
            DeclKind::Struct(StructKind::Abstract) | DeclKind::Class(ClassKind::Abstract)
        )
    }

    #[must_use]
    pub const fn is_concrete(&self) -> bool {
        matches!(
            self.kind,
            DeclKind::Struct(StructKind::Concrete { .. }) | DeclKind::Class(ClassKind::Concrete { .. })
        )
    }

    #[must_use]
    pub const fn is_unknown(&self) -> bool {
        matches!(
            self.kind,
            DeclKind::Struct(StructKind::Concrete { is_unknown: true })
                | DeclKind::Class(ClassKind::Concrete {
                    is_unknown: true,
                    ..
                })
        )
    }

    /// Scopes this class is the intern root for.
    #[must_use]
    pub fn intern_scopes(&self) -> Vec<&InternScope> {
        match &self.kind {
            DeclKind::Class(ClassKind::Concrete {
                intern_root_for, ..
            }) => intern_root_for.iter().collect(),
            _ => Vec::new(),
        }
    }

    #[must_use]
    pub fn is_intern_root(&self) -> bool {
        !self.intern_scopes().is_empty()
    }

    #[must_use]
    pub const fn as_toplevel(&self) -> Option<&Toplevel> {
        match &self.kind {
            DeclKind::Toplevel(t) => Some(t),
            _ => None,
        }
    }

    pub const fn as_toplevel_mut(&mut self) -> Option<&mut Toplevel> {
        match &mut self.kind {
            DeclKind::Toplevel(t) => Some(t),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_root(&self) -> bool {
        matches!(
            self.kind,
            DeclKind::Toplevel(Toplevel {
                kind: ToplevelKind::Root { .. },
                ..
            })
        )
    }

    #[must_use]
    pub const fn is_ext(&self) -> bool {
        matches!(
            self.kind,
            DeclKind::Toplevel(Toplevel {
                kind: ToplevelKind::Ext { .. },
                ..
            })
        )
    }

    #[must_use]
    pub fn pointcut(&self) -> Option<&str> {
        match &self.kind {
            DeclKind::Toplevel(Toplevel {
                kind: ToplevelKind::Ext { pointcut, .. },
                ..
            }) => pointcut.as_deref(),
            _ => None,
        }
    }

    /// Explicit extension name, if one was set.
    #[must_use]
    pub fn explicit_ext_name(&self) -> Option<&str> {
        match &self.kind {
            DeclKind::Toplevel(Toplevel {
                kind: ToplevelKind::Ext { ext_name, .. },
                ..
            }) => ext_name.as_deref(),
            _ => None,
        }
    }

    /// Same family for inheritance purposes: struct with struct, class with class.
    #[must_use]
    pub const fn same_family(&self, other: &Self) -> bool {
        matches!(
            (&self.kind, &other.kind),
            (DeclKind::Struct(_), DeclKind::Struct(_)) | (DeclKind::Class(_), DeclKind::Class(_))
        )
    }

    /// Name of the synthesized fallback subtype of an abstract declaration.
    #[must_use]
    pub fn unknown_name(&self) -> String {
        format!("{}Unknown", self.name)
    }

    /// Build the Unknown fallback subtype of this abstract declaration.
    #[must_use]
    pub fn synthesize_unknown(&self) -> Option<Self> {
        let kind = match self.kind {
            DeclKind::Struct(StructKind::Abstract) => {
                DeclKind::Struct(StructKind::Concrete { is_unknown: true })
            }
            DeclKind::Class(ClassKind::Abstract) => DeclKind::Class(ClassKind::Concrete {
                is_unknown: true,
                intern_root_for: BTreeSet::new(),
            }),
            _ => return None,
        };

        Some(Self {
            name: self.unknown_name(),
            kind,
            base: Some(self.name.clone()),
            members: Vec::new(),
            documentation: None,
            settings: self.settings.clone(),
        })
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_is_synthesized_only_for_abstract() {
        let shape = Declaration::abstract_class("Shape");
        let unknown = shape.synthesize_unknown().expect("abstract class has an unknown");

        assert_eq!(unknown.name, "ShapeUnknown");
        assert_eq!(unknown.base.as_deref(), Some("Shape"));
        assert!(unknown.is_unknown() && unknown.is_class() && unknown.is_concrete());

        assert!(Declaration::class("Circle").synthesize_unknown().is_none());
        assert!(Declaration::root("Model").synthesize_unknown().is_none());
    }

    #[test]
    fn intern_root_applies_to_concrete_classes_only() {
        let root = Declaration::class("Session").intern_root("Protocol");
        assert!(root.is_intern_root());

        let not_root = Declaration::structure("Point").intern_root("Protocol");
        assert!(!not_root.is_intern_root());
    }

    #[test]
    fn ext_carries_pointcut_and_name() {
        let ext = Declaration::ext("ExtModel", Some("Session")).ext_name("ext");

        assert!(ext.is_ext() && ext.is_bindable());
        assert_eq!(ext.pointcut(), Some("Session"));
        assert_eq!(ext.explicit_ext_name(), Some("ext"));
    }

    #[test]
    fn kinds_serialize_round_trip() {
        let decl = Declaration::class("Point")
            .member(Field::new("x", Type::INT))
            .member(Reactive::property("name", Type::STRING));
        let json = serde_json::to_string(&decl).expect("serialize");
        let back: Declaration = serde_json::from_str(&json).expect("deserialize");

        assert_eq!(decl, back);
    }
}
