//! The backend that loads compiled models and allocates their tensors.
//!
//! [`Runtime`] is the seam between the [`runner`](crate::runner) and the native runtime: the runner only loads an
//! artifact, allocates tensors and drives a [`GraphExecutor`], so any backend able to do these can run it.
//! [`TvmRuntime`] is the backend of the TVM C runtime, enabled by the `runtime` feature.

use std::path::Path;

use crate::graph_executor::GraphExecutor;
use crate::tensor::TensorData;
use crate::{DataType, Device, Result};

/// A backend that loads compiled model artifacts.
pub trait Runtime {
    /// The tensor type of the backend.
    type Tensor: TensorData;
    /// The executor of a loaded model.
    type Executor: GraphExecutor<Tensor = Self::Tensor>;

    /// Load the model artifact at `lib_path` and create its executor on `device`.
    fn load(&self, lib_path: &Path, device: Device) -> Result<Self::Executor>;

    /// Allocate an uninitialized tensor on `device`.
    fn empty(&self, shape: &[i64], dtype: DataType, device: Device) -> Result<Self::Tensor>;
}

/// The TVM C runtime, loading libraries exported by `export_library`.
#[cfg(feature = "runtime")]
#[derive(Debug, Default, Clone, Copy)]
pub struct TvmRuntime;

#[cfg(feature = "runtime")]
impl Runtime for TvmRuntime {
    type Tensor = crate::tensor::NDArray;
    type Executor = crate::graph_executor::GraphModule;

    fn load(&self, lib_path: &Path, device: Device) -> Result<Self::Executor> {
        let lib = crate::module::Module::load_from_file(lib_path, None)?;
        crate::graph_executor::GraphModule::from_factory(lib, device)
    }

    fn empty(&self, shape: &[i64], dtype: DataType, device: Device) -> Result<Self::Tensor> {
        crate::tensor::NDArray::empty(shape, dtype, device)
    }
}
