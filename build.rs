use std::env;
use std::path::PathBuf;

fn main() {
    println!("cargo:rerun-if-changed=src/ffi/mod.rs");

    let crate_dir = match env::var("CARGO_MANIFEST_DIR") {
        Ok(dir) => PathBuf::from(dir),
        Err(_) => return,
    };
    let out_dir = match env::var("OUT_DIR") {
        Ok(dir) => PathBuf::from(dir),
        Err(_) => return,
    };

    // Best-effort header
    match cbindgen::Builder::new()
        .with_crate(&crate_dir)
        .with_language(cbindgen::Language::C)
        .with_include_guard("RELGEN_CORE_H")
        .generate()
    {
        Ok(bindings) => {
            bindings.write_to_file(out_dir.join("relgen_core.h"));
        }
        Err(e) => {
            println!("cargo:warning=cbindgen header not generated: {}", e);
        }
    }
}
