//! Build-script helper that renders a schema into `OUT_DIR` for `include!`.
//!
//! Expands to statements, so it belongs in a `main` returning
//! `Result<(), Box<dyn std::error::Error>>`:
//!
//! ```ignore
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let schema = my_schema::schema()?;
//!     rdgen::build!(&schema);
//!     Ok(())
//! }
//! ```
#[macro_export]
macro_rules! build {
    ($schema:expr) => {
        $crate::build!($schema, $crate::GeneratorConfig::default());
    };
    ($schema:expr, $config:expr) => {
        use std::{env::var, fs::File, io::Write, path::PathBuf};

        //
        // CARGO
        //

        println!("cargo:rerun-if-changed=build.rs");

        let out_dir = var("OUT_DIR")?;

        //
        // MODEL CODE
        //

        let output = $crate::generate_bundle($schema, $config)?;

        let model_file = PathBuf::from(out_dir).join($crate::output::BUNDLE_FILE);
        let mut file = File::create(model_file)?;
        file.write_all(output.as_bytes())?;
    };
}
