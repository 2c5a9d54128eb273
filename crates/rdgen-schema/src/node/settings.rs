use crate::prelude::*;
use std::path::{Path, PathBuf};

///
/// Settings
///
/// Typed per-declaration configuration. A setting applies only to the
/// declaration it is attached to; an absent value means the generator-wide
/// default.
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct Settings {
    #[serde(skip_serializing_if = "Option::is_none")]
    namespace: Option<String>,

    #[serde(skip_serializing_if = "std::ops::Not::not")]
    public_ctors: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    fs_path: Option<PathBuf>,

    #[serde(skip_serializing_if = "Option::is_none")]
    target_name: Option<String>,
}

impl Settings {
    #[must_use]
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    #[must_use]
    pub const fn public_ctors(&self) -> bool {
        self.public_ctors
    }

    #[must_use]
    pub fn fs_path(&self) -> Option<&Path> {
        self.fs_path.as_deref()
    }

    #[must_use]
    pub fn target_name(&self) -> Option<&str> {
        self.target_name.as_deref()
    }

    #[must_use]
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    #[must_use]
    pub const fn with_public_ctors(mut self) -> Self {
        self.public_ctors = true;
        self
    }

    #[must_use]
    pub fn with_fs_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.fs_path = Some(path.into());
        self
    }

    #[must_use]
    pub fn with_target_name(mut self, name: impl Into<String>) -> Self {
        self.target_name = Some(name.into());
        self
    }
}
