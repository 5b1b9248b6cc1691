//! Runtime modules, the loadable unit of compiled code.
//!
//! A model exported by TVM is a shared library containing a module with a factory function, usually named
//! `default`, which creates the graph executor module of the model on a device.

use core::ffi::{c_int, c_void};
use core::ptr::NonNull;
use std::path::Path;

use crate::function::PackedFunc;
use crate::util::{path_to_cstring, str_to_cstring, IntoRust};
use crate::{sys, Error, Result};

/// A runtime module.
///
/// The handle is released when the module is dropped. Functions obtained from a module keep the module alive on the
/// runtime side, so they may outlive the Rust wrapper.
pub struct Module {
    handle: NonNull<c_void>,
}
impl Module {
    /// Load a module from a file.
    ///
    /// # Arguments
    ///
    /// * `path` - The path to the module file, usually a shared library exported by `export_library`.
    /// * `format` - The format of the file. If `None`, the format is inferred from the file extension.
    ///
    /// # Errors
    ///
    /// Returns an error if the path is not a valid UTF-8 string, or if the runtime fails to load the module, for
    /// example if the file does not exist.
    pub fn load_from_file(path: impl AsRef<Path>, format: Option<&str>) -> Result<Self> {
        let path = path.as_ref();
        let file_name = path_to_cstring(path)?;
        let format = str_to_cstring(format.unwrap_or(""))?;
        let mut handle: sys::TVMModuleHandle = core::ptr::null_mut();
        unsafe { sys::TVMModLoadFromFile(file_name.as_ptr(), format.as_ptr(), &mut handle) }
            .rs()?;
        let module = unsafe { Self::from_raw(handle) }
            .ok_or(Error::InvalidArgument("null module handle"))?;
        log::debug!("loaded module from {}", path.display());
        Ok(module)
    }

    /// Wrap a module handle owned by the caller.
    ///
    /// # Safety
    ///
    /// The handle must be a valid module handle returned by the runtime, and must not be freed by anyone else.
    pub(crate) unsafe fn from_raw(handle: sys::TVMModuleHandle) -> Option<Self> {
        NonNull::new(handle).map(|handle| Self { handle })
    }

    /// Get a function of the module.
    ///
    /// # Arguments
    ///
    /// * `name` - The name of the function.
    /// * `query_imports` - Whether to also search the modules imported by this module.
    ///
    /// Returns `None` if the module has no function with the given name.
    pub fn get_function(&self, name: &str, query_imports: bool) -> Result<Option<PackedFunc>> {
        let c_name = str_to_cstring(name)?;
        let mut handle: sys::TVMFunctionHandle = core::ptr::null_mut();
        unsafe {
            sys::TVMModGetFunction(
                self.handle.as_ptr(),
                c_name.as_ptr(),
                query_imports as c_int,
                &mut handle,
            )
        }
        .rs()?;
        let func = unsafe { PackedFunc::from_raw(handle) };
        if func.is_none() {
            log::debug!("function '{name}' not found in module");
        }
        Ok(func)
    }

    /// Get a function of the module, failing if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`Error::FunctionNotFound`] if the module has no function with the given name.
    pub fn require_function(&self, name: &str) -> Result<PackedFunc> {
        self.get_function(name, false)?
            .ok_or_else(|| Error::FunctionNotFound(name.to_string()))
    }
}
impl Drop for Module {
    fn drop(&mut self) {
        if let Err(err) = unsafe { sys::TVMModFree(self.handle.as_ptr()) }.rs() {
            log::error!("failed to free module: {err}");
        }
    }
}
impl core::fmt::Debug for Module {
    fn fmt(&self, fmt: &mut core::fmt::Formatter) -> core::fmt::Result {
        fmt.debug_tuple("Module").field(&self.handle).finish()
    }
}
