//! The graph executor, which runs a compiled model graph.
//!
//! [`GraphExecutor`] is the set of operations needed to run a model: bind an input, execute the graph and read an
//! output. [`GraphModule`] implements it on top of the graph executor module of the TVM runtime, created by the
//! factory function of an exported library.

use crate::tensor::TensorData;
use crate::Result;

#[cfg(feature = "runtime")]
use crate::{
    function::{ArgValue, PackedFunc},
    module::Module,
    sys,
    tensor::NDArray,
    util::IntoRust,
    Device, Error,
};

/// The name of the factory function in libraries exported by TVM.
pub const DEFAULT_FACTORY: &str = "default";

/// An executable model graph.
pub trait GraphExecutor {
    /// The tensor type the executor reads inputs from and writes outputs into.
    type Tensor: TensorData;

    /// Bind a tensor to the named input of the graph.
    ///
    /// The tensor data is copied into the graph, the tensor may be reused or dropped afterwards.
    /// The TVM graph executor silently ignores names that are not inputs of the graph.
    fn set_input(&mut self, name: &str, tensor: &Self::Tensor) -> Result<()>;

    /// Execute the graph with the currently bound inputs.
    fn run(&mut self) -> Result<()>;

    /// Copy the output at `index` into `dest`.
    fn get_output(&mut self, index: usize, dest: &mut Self::Tensor) -> Result<()>;

    /// The number of outputs of the graph.
    fn num_outputs(&mut self) -> Result<usize>;

    /// Wait for all work submitted to the device of the executor to finish.
    fn sync(&mut self) -> Result<()> {
        Ok(())
    }
}

/// The graph executor module of a model loaded by the TVM runtime.
///
/// The `set_input`, `run` and `get_output` entry points are resolved once, when the module is created.
/// `get_num_outputs` is looked up when [`num_outputs`](GraphExecutor::num_outputs) is called.
#[cfg(feature = "runtime")]
pub struct GraphModule {
    set_input: PackedFunc,
    run: PackedFunc,
    get_output: PackedFunc,
    // Dropped after the functions
    module: Module,
    _lib: Module,
    device: Device,
}
#[cfg(feature = "runtime")]
impl GraphModule {
    /// Create the graph executor of a library exported by TVM, by calling its [`DEFAULT_FACTORY`] function with the
    /// given device.
    ///
    /// # Errors
    ///
    /// Returns [`Error::FunctionNotFound`] if the library has no factory function or if the created module lacks one
    /// of the graph executor entry points, and a runtime error if the factory fails.
    pub fn from_factory(lib: Module, device: Device) -> Result<Self> {
        Self::from_named_factory(lib, DEFAULT_FACTORY, device)
    }

    /// Create the graph executor of a library exported by TVM, by calling the named factory function with the given
    /// device.
    ///
    /// # Errors
    ///
    /// Returns [`Error::FunctionNotFound`] if the library has no such factory function or if the created module lacks
    /// one of `set_input`, `run` or `get_output`.
    pub fn from_named_factory(lib: Module, factory: &str, device: Device) -> Result<Self> {
        let module = {
            let factory = lib.require_function(factory)?;
            factory.call(&[ArgValue::Device(device)])?.into_module()?
        };
        log::debug!("created graph executor on {device}");
        Ok(Self {
            set_input: module.require_function("set_input")?,
            run: module.require_function("run")?,
            get_output: module.require_function("get_output")?,
            module,
            _lib: lib,
            device,
        })
    }

    /// The graph executor module.
    pub fn module(&self) -> &Module {
        &self.module
    }

    /// The device on which the graph is executed.
    pub fn device(&self) -> Device {
        self.device
    }
}
#[cfg(feature = "runtime")]
impl GraphExecutor for GraphModule {
    type Tensor = NDArray;

    fn set_input(&mut self, name: &str, tensor: &NDArray) -> Result<()> {
        log::debug!("set_input({name})");
        self.set_input
            .call(&[ArgValue::Str(name), ArgValue::Tensor(tensor)])?;
        Ok(())
    }

    fn run(&mut self) -> Result<()> {
        self.run.call(&[])?;
        Ok(())
    }

    fn get_output(&mut self, index: usize, dest: &mut NDArray) -> Result<()> {
        log::debug!("get_output({index})");
        let index = i64::try_from(index).map_err(|_| Error::InvalidArgument("output index overflow"))?;
        self.get_output
            .call(&[ArgValue::Int(index), ArgValue::TensorMut(dest)])?;
        Ok(())
    }

    fn num_outputs(&mut self) -> Result<usize> {
        let num = self
            .module
            .require_function("get_num_outputs")?
            .call(&[])?
            .into_int()?;
        usize::try_from(num).map_err(|_| Error::InvalidArgument("negative number of outputs"))
    }

    fn sync(&mut self) -> Result<()> {
        unsafe {
            sys::TVMSynchronize(
                self.device.device_type as core::ffi::c_int,
                self.device.device_id,
                core::ptr::null_mut(),
            )
        }
        .rs()
    }
}
#[cfg(feature = "runtime")]
impl core::fmt::Debug for GraphModule {
    fn fmt(&self, fmt: &mut core::fmt::Formatter) -> core::fmt::Result {
        fmt.debug_struct("GraphModule")
            .field("module", &self.module)
            .field("device", &self.device)
            .finish()
    }
}
