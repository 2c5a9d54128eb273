//! Rendering generated modules to source text and writing them out.
//!
//! Two layouts are produced from the same units: a single bundle meant for
//! `include!` from a build script, and a directory of one file per toplevel
//! with an aggregate `mod.rs`.

use crate::{
    Generator,
    error::GenError,
    helper::{doc_attrs, module_ident},
    toplevel,
};
use proc_macro2::{Ident, TokenStream};
use quote::quote;
use rdgen_schema::node::Declaration;
use std::{
    fs,
    path::{Path, PathBuf},
};

/// First line of every generated file.
pub const HEADER: &str = "// @generated by rdgen. Do not edit.\n";

/// File name of the aggregate in directory layout.
pub const AGGREGATE_FILE: &str = "mod.rs";

/// File name `build!` writes the bundle to under `OUT_DIR`.
pub const BUNDLE_FILE: &str = "rdgen_model.rs";

///
/// GeneratedFile
///
/// One rendered file, with its path relative to the output directory.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct GeneratedFile {
    pub path: PathBuf,
    pub contents: String,
}

///
/// Unit
///

struct Unit<'a> {
    decl: &'a Declaration,
    module: Ident,
    body: TokenStream,
}

impl Unit<'_> {
    // file_path
    // an explicit fs_path wins over the module name
    fn file_path(&self) -> PathBuf {
        self.decl
            .settings
            .fs_path()
            .map_or_else(|| PathBuf::from(format!("{}.rs", self.module)), Path::to_path_buf)
    }
}

impl Generator<'_> {
    /// Every toplevel rendered into one source string.
    pub fn generate_bundle(&self) -> Result<String, GenError> {
        let units = self.units()?;
        let target = self.target_name()?;

        let modules = units.iter().map(|unit| {
            let module = &unit.module;
            let body = &unit.body;
            let docs = doc_attrs(unit.decl.documentation.as_deref());
            let allow = module_allow();

            quote! {
                #docs
                #allow
                pub mod #module {
                    #body
                }
                pub use #module::*;
            }
        });

        render(
            &target,
            quote! {
                /// Name of the generated model.
                pub const TARGET_NAME: &str = #target;

                #(#modules)*
            },
        )
    }

    /// One file per toplevel plus the aggregate `mod.rs`, which comes last.
    pub fn generate_files(&self) -> Result<Vec<GeneratedFile>, GenError> {
        let units = self.units()?;
        let target = self.target_name()?;
        let mut files = Vec::with_capacity(units.len() + 1);
        let mut decls = Vec::with_capacity(units.len());

        for unit in &units {
            let module = &unit.module;
            let docs = doc_attrs(unit.decl.documentation.as_deref());
            let allow = module_allow();
            let path_attr = unit.decl.settings.fs_path().map(|path| {
                let path = path.to_string_lossy().replace('\\', "/");
                quote!(#[path = #path])
            });

            files.push(GeneratedFile {
                path: unit.file_path(),
                contents: render(&unit.decl.name, unit.body.clone())?,
            });
            decls.push(quote! {
                #docs
                #allow
                #path_attr
                pub mod #module;
                pub use #module::*;
            });
        }

        files.push(GeneratedFile {
            path: PathBuf::from(AGGREGATE_FILE),
            contents: render(
                &target,
                quote! {
                    /// Name of the generated model.
                    pub const TARGET_NAME: &str = #target;

                    #(#decls)*
                },
            )?,
        });

        Ok(files)
    }

    /// Write the directory layout under `dir`, clearing it first when the
    /// config asks for it. Returns the written paths.
    pub fn write_output(&self, dir: &Path) -> Result<Vec<PathBuf>, GenError> {
        let files = self.generate_files()?;
        let io_err = |path: &Path| {
            let path = path.to_path_buf();
            move |source| GenError::Io { path, source }
        };

        if self.config().clear_output_dir && dir.exists() {
            tracing::debug!(dir = %dir.display(), "clearing output directory");
            fs::remove_dir_all(dir).map_err(io_err(dir))?;
        }
        fs::create_dir_all(dir).map_err(io_err(dir))?;

        let mut written = Vec::with_capacity(files.len());
        for file in files {
            let path = dir.join(&file.path);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).map_err(io_err(parent))?;
            }
            fs::write(&path, file.contents.as_bytes()).map_err(io_err(&path))?;

            tracing::debug!(path = %path.display(), bytes = file.contents.len(), "wrote generated file");
            written.push(path);
        }

        Ok(written)
    }

    fn units(&self) -> Result<Vec<Unit<'_>>, GenError> {
        let toplevels = self.toplevels();
        tracing::info!(
            root = %self.schema().root_name(),
            toplevels = toplevels.len(),
            flow_transform = ?self.config().flow_transform,
            "generating rust model"
        );

        toplevels
            .into_iter()
            .map(|decl| {
                Ok(Unit {
                    decl,
                    module: module_ident(decl),
                    body: toplevel::emit_module(self, decl)?,
                })
            })
            .collect()
    }
}

// module_allow
// generated modules are not held to the workspace lints
fn module_allow() -> TokenStream {
    quote! {
        #[allow(
            clippy::all,
            clippy::pedantic,
            clippy::nursery,
            dead_code,
            non_camel_case_types,
            non_snake_case,
            unused_imports,
            unused_mut,
            unused_variables
        )]
    }
}

fn render(unit: &str, tokens: TokenStream) -> Result<String, GenError> {
    let file = syn::parse2::<syn::File>(tokens).map_err(|err| GenError::Syntax {
        unit: unit.to_string(),
        message: err.to_string(),
    })?;

    Ok(format!("{HEADER}{}", prettyplease::unparse(&file)))
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GeneratorConfig;
    use rdgen_schema::{
        build::SchemaBuilder,
        node::*,
        types::Type,
    };

    fn schema() -> Schema {
        SchemaBuilder::new(
            Declaration::root("Model")
                .doc("The whole model.")
                .member(Reactive::property("count", Type::INT)),
        )
        .declare(Declaration::class("Session"))
        .toplevel(
            Declaration::ext("Tools", Some("Session"))
                .with_settings(Settings::default().with_fs_path("nested/tools_ext.rs")),
        )
        .build()
        .unwrap()
    }

    #[test]
    fn bundle_wraps_each_toplevel_in_a_module() {
        let schema = schema();
        let bundle = Generator::new(&schema, GeneratorConfig::default())
            .generate_bundle()
            .unwrap();

        assert!(bundle.starts_with(HEADER));
        assert!(bundle.contains("pub const TARGET_NAME: &str = \"Model\";"), "{bundle}");
        assert!(bundle.contains("pub mod model {"), "{bundle}");
        assert!(bundle.contains("pub use tools::*;"), "{bundle}");
        assert!(bundle.contains("/// The whole model."), "{bundle}");
        assert!(bundle.contains("unused_variables"), "{bundle}");
    }

    #[test]
    fn files_follow_fs_path_and_end_with_the_aggregate() {
        let schema = schema();
        let files = Generator::new(&schema, GeneratorConfig::default())
            .generate_files()
            .unwrap();
        let paths: Vec<_> = files.iter().map(|file| file.path.clone()).collect();

        assert_eq!(
            paths,
            vec![
                PathBuf::from("model.rs"),
                PathBuf::from("nested/tools_ext.rs"),
                PathBuf::from(AGGREGATE_FILE),
            ]
        );

        let aggregate = &files[2].contents;
        assert!(aggregate.contains("#[path = \"nested/tools_ext.rs\"]"), "{aggregate}");
        assert!(aggregate.contains("pub mod model;"), "{aggregate}");
        assert!(files[0].contents.starts_with(HEADER));
        assert!(files[0].contents.contains("use super::*;"));
    }

    #[test]
    fn generation_is_deterministic() {
        let schema = schema();
        let first = Generator::new(&schema, GeneratorConfig::default()).generate_files();
        let second = Generator::new(&schema, GeneratorConfig::default()).generate_files();

        assert_eq!(first.unwrap(), second.unwrap());
    }

    #[test]
    fn write_output_clears_stale_files_when_asked() {
        let dir = tempfile::tempdir().unwrap();
        let stale = dir.path().join("stale.rs");
        fs::write(&stale, "// old").unwrap();

        let schema = schema();
        let config = GeneratorConfig {
            clear_output_dir: true,
            ..GeneratorConfig::default()
        };
        let written = Generator::new(&schema, config)
            .write_output(dir.path())
            .unwrap();

        assert!(!stale.exists());
        assert_eq!(written.len(), 3);
        assert!(dir.path().join("nested/tools_ext.rs").exists());
        assert!(dir.path().join(AGGREGATE_FILE).exists());
    }

    #[test]
    fn write_output_keeps_unrelated_files_by_default() {
        let dir = tempfile::tempdir().unwrap();
        let keep = dir.path().join("keep.txt");
        fs::write(&keep, "keep").unwrap();

        let schema = schema();
        Generator::new(&schema, GeneratorConfig::default())
            .write_output(dir.path())
            .unwrap();

        assert!(keep.exists());
    }
}
