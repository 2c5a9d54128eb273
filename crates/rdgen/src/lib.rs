//! Rust backend of the rd protocol generator.
//!
//! A [`Generator`] projects a validated [`Schema`] into Rust source that
//! binds against `rdgen-runtime`: one module per toplevel plus an aggregate
//! `mod.rs`, or a single bundle for `include!` from a build script.

pub mod config;
pub mod error;
pub mod output;

mod decl;
mod helper;
mod macros;
mod member;
mod model;
mod resolve;
mod toplevel;

pub use config::{ConfigError, FlowTransform, GeneratorConfig};
pub use error::GenError;
pub use output::GeneratedFile;

use crate::helper::{ident, module_ident};
use proc_macro2::TokenStream;
use quote::quote;
use rdgen_schema::node::{Declaration, Schema};

///
/// Prelude
///

pub mod prelude {
    pub use crate::{
        config::{FlowTransform, GeneratorConfig},
        error::GenError,
        output::GeneratedFile,
        Generator,
    };
}

/// Generate the single-file bundle for a schema.
pub fn generate_bundle(schema: &Schema, config: GeneratorConfig) -> Result<String, GenError> {
    Generator::new(schema, config).generate_bundle()
}

///
/// Generator
///

pub struct Generator<'a> {
    schema: &'a Schema,
    config: GeneratorConfig,
}

impl<'a> Generator<'a> {
    #[must_use]
    pub const fn new(schema: &'a Schema, config: GeneratorConfig) -> Self {
        Self { schema, config }
    }

    #[must_use]
    pub const fn schema(&self) -> &'a Schema {
        self.schema
    }

    #[must_use]
    pub const fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Namespace of a declaration: its own setting, then its toplevel's,
    /// then the configured default.
    #[must_use]
    pub fn namespace_of<'s>(&'s self, decl: &'s Declaration) -> &'s str {
        decl.settings
            .namespace()
            .or_else(|| {
                self.schema
                    .owner_of(&decl.name)
                    .and_then(|owner| owner.settings.namespace())
            })
            .unwrap_or(&self.config.default_namespace)
    }

    /// Path to a declaration as seen from `scope`. Declarations of another
    /// namespace are qualified with their toplevel module.
    pub fn decl_path(&self, name: &str, scope: &Declaration) -> Result<TokenStream, GenError> {
        let target = self.schema.try_get(name)?;
        let type_ident = ident(&target.name);

        if self.namespace_of(target) == self.namespace_of(scope) {
            return Ok(quote!(#type_ident));
        }

        let owner = self
            .schema
            .owner_of(name)
            .ok_or_else(|| rdgen_schema::node::NodeError::NotFound(name.to_string()))?;
        let module = module_ident(owner);

        Ok(quote!(super::#module::#type_ident))
    }

    /// Every toplevel in generation order.
    #[must_use]
    pub fn toplevels(&self) -> Vec<&'a Declaration> {
        self.schema.toplevels()
    }

    /// Name of the aggregate: the root's target name, else the root name.
    pub fn target_name(&self) -> Result<String, GenError> {
        let root = self.schema.root()?;

        Ok(root
            .settings
            .target_name()
            .map_or_else(|| root.name.clone(), str::to_string))
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use rdgen_schema::{build::SchemaBuilder, node::Settings};

    fn schema() -> Schema {
        SchemaBuilder::new(Declaration::root("Model"))
            .declare(Declaration::class("Session"))
            .declare(
                Declaration::class("Pinned")
                    .with_settings(Settings::default().with_namespace("pinned")),
            )
            .toplevel(
                Declaration::ext("Tools", Some("Session"))
                    .with_settings(Settings::default().with_namespace("tools")),
            )
            .declare_in("Tools", Declaration::class("Brush"))
            .build()
            .unwrap()
    }

    #[test]
    fn namespace_falls_back_from_declaration_to_toplevel_to_config() {
        let schema = schema();
        let generator = Generator::new(&schema, GeneratorConfig::default());
        let namespace = |name: &str| {
            let decl = schema.get(name).unwrap();
            generator.namespace_of(decl).to_string()
        };

        assert_eq!(namespace("Pinned"), "pinned");
        assert_eq!(namespace("Brush"), "tools");
        assert_eq!(namespace("Session"), config::DEFAULT_NAMESPACE);
    }

    #[test]
    fn paths_across_namespaces_go_through_the_owner_module() {
        let schema = schema();
        let generator = Generator::new(&schema, GeneratorConfig::default());
        let brush = schema.get("Brush").unwrap();

        let path = generator.decl_path("Session", brush).unwrap().to_string();
        assert_eq!(path.replace(' ', ""), "super::model::Session");

        let local = generator.decl_path("Brush", brush).unwrap().to_string();
        assert_eq!(local, "Brush");
    }
}
