//! Unsafe bindings for the Apache TVM C runtime API.
//!
//! Provides low level Rust bindings for `libtvm_runtime`, the deployment-only part of TVM that loads
//! compiled model libraries and executes them.
//! For the common use case, it is recommended to use the high-level API provided by the `tvm-deploy` crate, where
//! a more detailed documentation can be found.
//!
//! Only the stable C API is bound (`tvm/runtime/c_runtime_api.h` and `dlpack/dlpack.h`), the C++ API is not used.
//!
//! To build the crate you need a TVM checkout with the runtime library built:
//! ```bash
//! # Clone TVM
//! cd ${TEMP_DIR}
//! git clone --recursive https://github.com/apache/tvm.git
//! cd tvm
//!
//! # Build the runtime only
//! mkdir build && cp cmake/config.cmake build/
//! cd build
//! cmake .. && make runtime -j
//!
//! # Shared library is in build/
//! #   build/libtvm_runtime.so
//!
//! # Build the bindings
//! # We set TVM_HOME to the TVM checkout, headers are read from include/ and 3rdparty/dlpack/include/
//! cd ${TVM_DEPLOY_DIR}
//! TVM_HOME=${TEMP_DIR}/tvm cargo build -p tvm-deploy-sys
//! ```
//!
//! The following environment variables are read by the build script:
//! - `TVM_HOME`: path to the TVM checkout. Required.
//! - `TVM_DEPLOY_TVM_LIB_DIR`: directory containing `libtvm_runtime`. Defaults to `${TVM_HOME}/build`.
//!
//! `libtvm_runtime` is linked dynamically, so it must also be found by the loader when running the binary,
//! for example through `LD_LIBRARY_PATH`.

mod c_link {
    #![allow(dead_code)]
    #![allow(clippy::upper_case_acronyms)]
    #![allow(clippy::missing_safety_doc)]
    #![allow(rustdoc::invalid_html_tags)]
    #![allow(rustdoc::broken_intra_doc_links)]
    #![allow(missing_docs)]
    #![allow(non_snake_case, non_camel_case_types, non_upper_case_globals)]

    include!(concat!(env!("OUT_DIR"), "/tvm_runtime_bindings.rs"));
}
pub use c_link::*;

/// The value returned by all C API functions on success.
pub const TVM_SUCCESS: core::ffi::c_int = 0;
