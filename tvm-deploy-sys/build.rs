use std::path::{Path, PathBuf};

fn main() {
    generate_bindings();
    link_tvm_runtime();
}

fn generate_bindings() {
    let include_dir = Path::new(&env!("CARGO_MANIFEST_DIR")).join("include");
    println!("cargo::rerun-if-changed={}", include_dir.to_str().unwrap());

    let tvm_home = tvm_home();
    let bindings_h = include_dir.join("bindings.h");

    let bindings = bindgen::Builder::default()
        .clang_arg(format!("-I{}", tvm_home.join("include").to_str().unwrap()))
        .clang_arg(format!(
            "-I{}",
            tvm_home
                .join("3rdparty")
                .join("dlpack")
                .join("include")
                .to_str()
                .unwrap()
        ))
        .generate_cstr(true)
        .use_core()
        .header(bindings_h.as_os_str().to_str().unwrap())
        // dlpack
        .allowlist_type("DLDevice")
        .allowlist_type("DLDataType")
        .allowlist_type("DLTensor")
        .allowlist_type("DLDeviceType")
        .allowlist_type("DLDataTypeCode")
        // c_runtime_api
        .allowlist_type("TVMValue")
        .allowlist_type("TVMArgTypeCode")
        .allowlist_type("TVMModuleHandle")
        .allowlist_type("TVMFunctionHandle")
        .allowlist_type("TVMArrayHandle")
        .allowlist_type("TVMObjectHandle")
        .allowlist_type("TVMStreamHandle")
        .allowlist_type("tvm_index_t")
        .allowlist_function("TVMGetLastError")
        .allowlist_function("TVMModLoadFromFile")
        .allowlist_function("TVMModGetFunction")
        .allowlist_function("TVMModFree")
        .allowlist_function("TVMFuncCall")
        .allowlist_function("TVMFuncFree")
        .allowlist_function("TVMFuncGetGlobal")
        .allowlist_function("TVMArrayAlloc")
        .allowlist_function("TVMArrayFree")
        .allowlist_function("TVMArrayCopyFromBytes")
        .allowlist_function("TVMArrayCopyToBytes")
        .allowlist_function("TVMObjectFree")
        .allowlist_function("TVMSynchronize")
        // The enums are passed around as plain ints by the C API, and newer runtimes add variants.
        .constified_enum_module("DLDeviceType")
        .constified_enum_module("DLDataTypeCode")
        .constified_enum_module("TVMArgTypeCode")
        .parse_callbacks(Box::new(bindgen::CargoCallbacks::new()))
        .generate()
        .expect("Unable to generate bindings");

    let out_path = PathBuf::from(std::env::var("OUT_DIR").unwrap());
    bindings
        .write_to_file(out_path.join("tvm_runtime_bindings.rs"))
        .expect("Couldn't write bindings!");
}

fn link_tvm_runtime() {
    if std::env::var("DOCS_RS").is_ok() {
        // Skip linking to the shared library when building documentation
        return;
    }

    println!("cargo::rerun-if-env-changed=TVM_DEPLOY_TVM_LIB_DIR");
    let libs_dir = match std::env::var("TVM_DEPLOY_TVM_LIB_DIR") {
        Ok(dir) => PathBuf::from(dir),
        Err(_) => tvm_home().join("build"),
    };

    println!("cargo::rustc-link-search=native={}", libs_dir.to_str().unwrap());
    println!("cargo::rustc-link-lib=dylib=tvm_runtime");
}

fn tvm_home() -> PathBuf {
    println!("cargo::rerun-if-env-changed=TVM_HOME");
    let tvm_home = std::env::var("TVM_HOME")
        .expect("TVM_HOME is not set, can't locate the TVM runtime headers and library");
    PathBuf::from(tvm_home)
}
