//! Generator configuration, loaded from TOML.
//!
//! ```toml
//! default_namespace = "demo"
//! flow_transform = "reversed"
//! output_dir = "src/generated"
//! clear_output_dir = true
//! ```

use rdgen_schema::types::FlowKind;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};
use thiserror::Error as ThisError;

/// Namespace used when neither a declaration nor its toplevel sets one.
pub const DEFAULT_NAMESPACE: &str = "rd";

///
/// ConfigError
///

#[derive(Debug, ThisError)]
pub enum ConfigError {
    #[error("failed to read config '{path}'")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

///
/// FlowTransform
///
/// Which side of the protocol is being generated.
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowTransform {
    #[default]
    AsIs,
    Reversed,
}

impl FlowTransform {
    #[must_use]
    pub const fn apply(self, flow: FlowKind) -> FlowKind {
        match self {
            Self::AsIs => flow,
            Self::Reversed => flow.reversed(),
        }
    }
}

///
/// GeneratorConfig
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeneratorConfig {
    pub default_namespace: String,
    pub flow_transform: FlowTransform,
    pub output_dir: Option<PathBuf>,
    pub clear_output_dir: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            default_namespace: DEFAULT_NAMESPACE.to_string(),
            flow_transform: FlowTransform::default(),
            output_dir: None,
            clear_output_dir: false,
        }
    }
}

impl GeneratorConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_toml_str(&text)
    }

    #[must_use]
    pub const fn with_flow_transform(mut self, flow_transform: FlowTransform) -> Self {
        self.flow_transform = flow_transform;
        self
    }

    #[must_use]
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_keys_use_defaults() {
        let config = GeneratorConfig::from_toml_str("").unwrap();

        assert_eq!(config, GeneratorConfig::default());
        assert_eq!(config.default_namespace, DEFAULT_NAMESPACE);
    }

    #[test]
    fn parses_every_key() {
        let config = GeneratorConfig::from_toml_str(
            r#"
            default_namespace = "demo"
            flow_transform = "reversed"
            output_dir = "out"
            clear_output_dir = true
            "#,
        )
        .unwrap();

        assert_eq!(config.default_namespace, "demo");
        assert_eq!(config.flow_transform, FlowTransform::Reversed);
        assert_eq!(config.output_dir, Some(PathBuf::from("out")));
        assert!(config.clear_output_dir);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = GeneratorConfig::from_toml_str("flow = \"as_is\"").unwrap_err();

        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn reversed_transform_swaps_directions() {
        assert_eq!(FlowTransform::Reversed.apply(FlowKind::Sink), FlowKind::Source);
        assert_eq!(FlowTransform::Reversed.apply(FlowKind::Both), FlowKind::Both);
        assert_eq!(FlowTransform::AsIs.apply(FlowKind::Sink), FlowKind::Sink);
    }
}
