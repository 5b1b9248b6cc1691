#![cfg_attr(deny_warnings, deny(warnings))]
// some new clippy::lint annotations are supported in latest Rust but not recognized by older versions
#![cfg_attr(deny_warnings, allow(unknown_lints))]
#![cfg_attr(deny_warnings, deny(missing_docs))]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

//! Bindings for deploying Apache TVM compiled models.
//!
//! Provides a high-level Rust API for executing models that were compiled and exported by
//! [Apache TVM](https://tvm.apache.org), using the graph executor of the TVM C runtime (`libtvm_runtime`).
//! Models are compiled and exported in Python, and then loaded and executed in Rust without any Python
//! dependency.
//!
//! Compile a model in Python and export it as a shared library:
//! ```ignore
//! import tvm
//! from tvm import relay
//!
//! mod, params = relay.frontend.from_mxnet(sym, {"data": (1, 3, 112, 112)}, "float32", arg_params, aux_params)
//! with tvm.transform.PassContext(opt_level=3):
//!     lib = relay.build(mod, target="llvm", params=params)
//! lib.export_library("lib/cpu.so")
//! ```
//!
//! Execute the model in Rust:
//! ```rust,ignore
//! use tvm_deploy::graph_executor::{GraphExecutor, GraphModule};
//! use tvm_deploy::module::Module;
//! use tvm_deploy::tensor::{NDArray, TensorData};
//! use tvm_deploy::{DataType, Device};
//!
//! let device = Device::cpu(0);
//! let lib = Module::load_from_file("lib/cpu.so", None)?;
//! let mut graph = GraphModule::from_factory(lib, device)?;
//!
//! let mut input = NDArray::empty(&[1, 3, 112, 112], DataType::float32(), device)?;
//! input.data_mut::<f32>()?.fill(1.0);
//! let mut output = NDArray::empty(&[1, 128], DataType::float32(), device)?;
//!
//! graph.set_input("data", &input)?;
//! graph.run()?;
//! graph.get_output(0, &mut output)?;
//! println!("{:?}", &output.data::<f32>()?[..10]);
//! ```
//!
//! The [`runner`] module wraps these steps into a single load-bind-execute-read cycle, and the
//! [`evaluate`] module measures the execution time of a loaded graph.
//!
//! ## Cargo Features
//! - `runtime`:
//!   Includes the FFI backed types: [`module::Module`], [`function::PackedFunc`], [`tensor::NDArray`],
//!   [`graph_executor::GraphModule`] and [`runtime::TvmRuntime`]. Adds a dependency to the `tvm-deploy-sys` crate,
//!   which requires `TVM_HOME` to be set at build time and links `libtvm_runtime` dynamically.
//!   Without this feature the crate only provides the runtime independent types and traits, which is enough to
//!   implement a [`runtime::Runtime`] on top of another backend.
//! - `ndarray`:
//!   Conversions between tensors and `ndarray` arrays.
//!   Adds a dependency to the `ndarray` crate.
//!   This feature is enabled by default.
//! - `half`:
//!   Adds a dependency to the `half` crate, which provides a fully capable `f16` and `bf16` types.
//!   Without this feature enabled, both of these types are available with a simple conversions to/from `u16` only.
//!
//! By default only the `ndarray` feature is enabled.
//!
//! ## Build
//! With the `runtime` feature, you must build `libtvm_runtime` yourself. See the `tvm-deploy-sys` crate for more info.
//!
//! ## API Stability
//! The bindings target the C runtime API of TVM releases 0.8 up to 0.18, before the runtime moved to the
//! `tvm-ffi` ABI.

pub mod device;
mod error;
pub mod evaluate;
pub mod graph_executor;
pub mod runner;
pub mod runtime;
pub mod scalar;
pub mod tensor;
#[cfg_attr(not(feature = "runtime"), allow(dead_code))]
mod util;

#[cfg(feature = "runtime")]
pub mod function;
#[cfg(feature = "runtime")]
pub mod module;

pub(crate) use error::Result;
pub use error::{Error, RuntimeError};

pub use device::{Device, DeviceType};
pub use scalar::{DataType, DataTypeCode, Scalar};

#[cfg(feature = "runtime")]
pub(crate) use tvm_deploy_sys as sys;

#[cfg(feature = "ndarray")]
pub use ndarray;

#[cfg(feature = "half")]
pub use half;

#[cfg(test)]
mod tests;
