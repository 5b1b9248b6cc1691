//! Packed functions, the calling convention of the TVM runtime.
//!
//! Every function exposed by a compiled module, and every function in the global registry of the runtime, is a
//! packed function: it receives its arguments as an array of type-erased values with a type code per value, and
//! returns a single type-erased value.
//! [`ArgValue`] and [`RetValue`] are the Rust side of these values.

use core::ffi::{c_int, c_void, CStr};
use core::ptr::NonNull;
use std::ffi::CString;

use crate::module::Module;
use crate::tensor::NDArray;
use crate::util::{str_to_cstring, IntoRust, IntoSys};
use crate::{sys, DataType, Device, Error, Result};

/// An argument passed to a [`PackedFunc`].
#[derive(Debug)]
pub enum ArgValue<'a> {
    /// A signed integer.
    Int(i64),
    /// A floating point number.
    Float(f64),
    /// A string, copied into a C string for the duration of the call.
    Str(&'a str),
    /// A device.
    Device(Device),
    /// A data type.
    DataType(DataType),
    /// A tensor the function only reads.
    Tensor(&'a NDArray),
    /// A tensor the function may write into, such as the destination of `get_output`.
    TensorMut(&'a mut NDArray),
    /// The null value.
    Null,
}

/// A value returned by a [`PackedFunc`].
#[derive(Debug)]
pub enum RetValue {
    /// The function returned nothing.
    Null,
    /// A signed integer.
    Int(i64),
    /// A floating point number.
    Float(f64),
    /// A string.
    Str(String),
    /// A module, owned by the caller.
    Module(Module),
    /// A packed function, owned by the caller.
    Function(PackedFunc),
    /// An opaque pointer, not owned by the caller.
    Handle(*mut c_void),
}
impl RetValue {
    /// A short name of the value kind, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            RetValue::Null => "null",
            RetValue::Int(_) => "int",
            RetValue::Float(_) => "float",
            RetValue::Str(_) => "str",
            RetValue::Module(_) => "module",
            RetValue::Function(_) => "function",
            RetValue::Handle(_) => "handle",
        }
    }

    /// Get the value as an integer.
    pub fn into_int(self) -> Result<i64> {
        match self {
            RetValue::Int(v) => Ok(v),
            other => Err(Error::UnexpectedReturn {
                expected: "int",
                actual: other.kind(),
            }),
        }
    }

    /// Get the value as a module.
    pub fn into_module(self) -> Result<Module> {
        match self {
            RetValue::Module(module) => Ok(module),
            other => Err(Error::UnexpectedReturn {
                expected: "module",
                actual: other.kind(),
            }),
        }
    }
}

/// A function callable through the TVM runtime.
///
/// The handle is released when the function is dropped.
pub struct PackedFunc {
    handle: NonNull<c_void>,
}
impl PackedFunc {
    /// Wrap a function handle owned by the caller.
    ///
    /// # Safety
    ///
    /// The handle must be a valid function handle returned by the runtime, and must not be freed by anyone else.
    pub(crate) unsafe fn from_raw(handle: sys::TVMFunctionHandle) -> Option<Self> {
        NonNull::new(handle).map(|handle| Self { handle })
    }

    /// Look up a function in the global registry of the runtime.
    ///
    /// Returns `None` if no function is registered under `name`.
    pub fn get_global(name: &str) -> Result<Option<Self>> {
        let name = str_to_cstring(name)?;
        let mut handle: sys::TVMFunctionHandle = core::ptr::null_mut();
        unsafe { sys::TVMFuncGetGlobal(name.as_ptr(), &mut handle) }.rs()?;
        Ok(unsafe { Self::from_raw(handle) })
    }

    /// Call the function.
    ///
    /// # Errors
    ///
    /// Returns an error if the function fails, or if it returns a value kind these bindings can not represent.
    pub fn call(&self, args: &[ArgValue]) -> Result<RetValue> {
        // Keep the C strings alive until the call returns
        let mut strings = Vec::<CString>::new();
        let mut values = Vec::with_capacity(args.len());
        let mut type_codes = Vec::with_capacity(args.len());
        for arg in args {
            let (value, code) = match arg {
                ArgValue::Int(v) => (sys::TVMValue { v_int64: *v }, sys::TVMArgTypeCode::kTVMArgInt),
                ArgValue::Float(v) => (
                    sys::TVMValue { v_float64: *v },
                    sys::TVMArgTypeCode::kTVMArgFloat,
                ),
                ArgValue::Str(s) => {
                    let s = str_to_cstring(s)?;
                    let value = sys::TVMValue { v_str: s.as_ptr() };
                    strings.push(s);
                    (value, sys::TVMArgTypeCode::kTVMStr)
                }
                ArgValue::Device(device) => (
                    sys::TVMValue {
                        v_device: device.sys(),
                    },
                    sys::TVMArgTypeCode::kDLDevice,
                ),
                ArgValue::DataType(dtype) => (
                    sys::TVMValue { v_type: dtype.sys() },
                    sys::TVMArgTypeCode::kTVMDataType,
                ),
                ArgValue::Tensor(tensor) => (
                    sys::TVMValue {
                        v_handle: tensor.as_handle(),
                    },
                    sys::TVMArgTypeCode::kTVMDLTensorHandle,
                ),
                ArgValue::TensorMut(tensor) => (
                    sys::TVMValue {
                        v_handle: tensor.as_handle(),
                    },
                    sys::TVMArgTypeCode::kTVMDLTensorHandle,
                ),
                ArgValue::Null => (
                    sys::TVMValue {
                        v_handle: core::ptr::null_mut(),
                    },
                    sys::TVMArgTypeCode::kTVMNullptr,
                ),
            };
            values.push(value);
            type_codes.push(code as c_int);
        }

        let mut ret_value = sys::TVMValue { v_int64: 0 };
        let mut ret_code: c_int = sys::TVMArgTypeCode::kTVMNullptr as c_int;
        unsafe {
            sys::TVMFuncCall(
                self.handle.as_ptr(),
                values.as_mut_ptr(),
                type_codes.as_mut_ptr(),
                values.len() as c_int,
                &mut ret_value,
                &mut ret_code,
            )
        }
        .rs()?;
        drop(strings);
        unsafe { ret_value_from_raw(ret_value, ret_code) }
    }
}
impl Drop for PackedFunc {
    fn drop(&mut self) {
        if let Err(err) = unsafe { sys::TVMFuncFree(self.handle.as_ptr()) }.rs() {
            log::error!("failed to free packed function: {err}");
        }
    }
}
impl core::fmt::Debug for PackedFunc {
    fn fmt(&self, fmt: &mut core::fmt::Formatter) -> core::fmt::Result {
        fmt.debug_tuple("PackedFunc").field(&self.handle).finish()
    }
}

/// # Safety
///
/// `value` and `code` must be the return value of a successful call, and the call must not be followed by another
/// runtime call on this thread before this function returns.
unsafe fn ret_value_from_raw(value: sys::TVMValue, code: c_int) -> Result<RetValue> {
    use sys::TVMArgTypeCode as code_t;
    Ok(match code as code_t::Type {
        code_t::kTVMNullptr => RetValue::Null,
        code_t::kTVMArgInt => RetValue::Int(value.v_int64),
        code_t::kTVMArgFloat => RetValue::Float(value.v_float64),
        code_t::kTVMStr => {
            // The string is owned by the runtime and only valid until the next call
            let s = CStr::from_ptr(value.v_str);
            RetValue::Str(s.to_string_lossy().into_owned())
        }
        code_t::kTVMModuleHandle => match Module::from_raw(value.v_handle) {
            Some(module) => RetValue::Module(module),
            None => RetValue::Null,
        },
        code_t::kTVMPackedFuncHandle => match PackedFunc::from_raw(value.v_handle) {
            Some(func) => RetValue::Function(func),
            None => RetValue::Null,
        },
        code_t::kTVMOpaqueHandle => RetValue::Handle(value.v_handle),
        code_t::kTVMNDArrayHandle => {
            // Owned by the caller, release it before reporting
            sys::TVMArrayFree(value.v_handle.cast()).rs()?;
            return Err(Error::UnsupportedReturn(code));
        }
        code_t::kTVMObjectHandle => {
            sys::TVMObjectFree(value.v_handle).rs()?;
            return Err(Error::UnsupportedReturn(code));
        }
        _ => return Err(Error::UnsupportedReturn(code)),
    })
}
