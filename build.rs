use std::{env, path::PathBuf};

const HEADER_CANDIDATES: &[&str] = &[
    "/usr/include",
    "/usr/local/include",
    "/opt/homebrew/include",
];

fn find_include_dir() -> Option<PathBuf> {
    if let Ok(dir) = env::var("LIBRAW_INCLUDE_DIR") {
        return Some(PathBuf::from(dir));
    }
    HEADER_CANDIDATES
        .iter()
        .map(PathBuf::from)
        .find(|dir| dir.join("libraw/libraw.h").is_file())
}

fn main() {
    println!("cargo::rustc-check-cfg=cfg(has_libraw)");
    println!("cargo:rerun-if-env-changed=LIBRAW_INCLUDE_DIR");
    println!("cargo:rerun-if-env-changed=LIBRAW_LIB_DIR");

    let Some(include_dir) = find_include_dir() else {
        println!("cargo:warning=Building without LibRaw (libraw/libraw.h not found)");
        return;
    };

    println!("cargo:rustc-cfg=has_libraw");

    if let Ok(lib_dir) = env::var("LIBRAW_LIB_DIR") {
        println!("cargo:rustc-link-search=native={lib_dir}");
    }
    println!("cargo:rustc-link-lib=dylib=raw");

    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    //
    // ---- Generate LibRaw C API bindings ----
    //
    let bindings = bindgen::Builder::default()
        .header_contents("libraw_wrapper.h", "#include <libraw/libraw.h>")
        .clang_arg(format!("-I{}", include_dir.display()))
        // Context lifecycle
        .allowlist_function("libraw_init")
        .allowlist_function("libraw_close")
        .allowlist_function("libraw_open_file")
        // Pipeline stages
        .allowlist_function("libraw_unpack")
        .allowlist_function("libraw_unpack_thumb")
        .allowlist_function("libraw_dcraw_process")
        .allowlist_function("libraw_dcraw_make_mem_image")
        .allowlist_function("libraw_dcraw_clear_mem")
        // Writers
        .allowlist_function("libraw_dcraw_thumb_writer")
        .allowlist_function("libraw_dcraw_ppm_tiff_writer")
        // Parameter structures
        .allowlist_function("libraw_get_iparams")
        .allowlist_function("libraw_get_lensinfo")
        .allowlist_function("libraw_get_imgother")
        .allowlist_function("libraw_get_raw_width")
        .allowlist_function("libraw_get_raw_height")
        // Status codes and library info
        .allowlist_function("libraw_strerror")
        .allowlist_function("libraw_version")
        .allowlist_function("libraw_cameraCount")
        .allowlist_type("libraw_data_t")
        .allowlist_type("libraw_processed_image_t")
        .allowlist_type("LibRaw_.*")
        .raw_line("// Mark extern blocks as unsafe for Rust 2024")
        .generate()
        .expect("Unable to generate LibRaw bindings");

    let out_path = out_dir.join("libraw_bindings.rs");
    bindings
        .write_to_file(&out_path)
        .expect("Couldn't write LibRaw bindings!");

    // Read the generated file and add unsafe to extern blocks
    let contents = std::fs::read_to_string(&out_path).unwrap();
    let fixed = contents.replace("extern \"C\" {", "unsafe extern \"C\" {");
    std::fs::write(&out_path, fixed).unwrap();
}
