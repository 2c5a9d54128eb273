fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("cargo:rerun-if-changed=../../schema/demo/src/lib.rs");

    let schema = rdgen_schema_demo::schema()?;
    rdgen::build!(&schema);

    Ok(())
}
