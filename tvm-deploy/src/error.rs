//! Error types used in the [`tvm_deploy`](crate) crate.

use std::fmt;

use crate::{DataType, Device};

/// tvm-deploy Error type.
#[derive(Clone, PartialEq, Eq, Debug)]
#[non_exhaustive]
pub enum Error {
    /// A call into the TVM runtime failed.
    Runtime(RuntimeError),
    /// A named function could not be found in a module or in the global registry.
    FunctionNotFound(String),
    /// A packed function returned a value of a different kind than expected.
    UnexpectedReturn {
        /// The kind the caller expected.
        expected: &'static str,
        /// The kind the function returned.
        actual: &'static str,
    },
    /// A packed function returned a value kind that is not supported by these bindings.
    UnsupportedReturn(i32),
    /// The data type of a tensor does not match the requested scalar type.
    TypeMismatch {
        /// The data type that was requested.
        expected: DataType,
        /// The data type of the tensor.
        actual: DataType,
    },
    /// The shape of a tensor, or the length of a buffer, does not match what was expected.
    ShapeMismatch {
        /// The expected shape.
        expected: Vec<i64>,
        /// The actual shape.
        actual: Vec<i64>,
    },
    /// A tensor shape contains a negative dimension.
    InvalidShape(i64),
    /// A linear offset is outside of a tensor buffer.
    IndexOutOfBounds {
        /// The offending offset.
        index: usize,
        /// The number of elements in the buffer.
        len: usize,
    },
    /// The memory of a tensor on this device can not be accessed directly from the host.
    NotHostAccessible(Device),
    /// A device name could not be parsed.
    UnknownDevice(String),
    /// A data type name could not be parsed.
    UnknownDataType(String),
    /// User provided an invalid argument.
    InvalidArgument(&'static str),
    /// Invalid string.
    ///
    /// Error used for example when an invalid UTF-8 path is converted to a C string, or when a &str contains null
    /// bytes when converting to a CStr, etc.
    ToCStr,
}
impl fmt::Display for Error {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Runtime(err) => write!(fmt, "TVM runtime error: {err}"),
            Error::FunctionNotFound(name) => write!(fmt, "function '{name}' not found"),
            Error::UnexpectedReturn { expected, actual } => {
                write!(fmt, "expected a {expected} return value, got {actual}")
            }
            Error::UnsupportedReturn(type_code) => {
                write!(fmt, "unsupported return value type code {type_code}")
            }
            Error::TypeMismatch { expected, actual } => {
                write!(fmt, "data type mismatch: expected {expected}, got {actual}")
            }
            Error::ShapeMismatch { expected, actual } => {
                write!(fmt, "shape mismatch: expected {expected:?}, got {actual:?}")
            }
            Error::InvalidShape(dim) => write!(fmt, "invalid tensor dimension {dim}"),
            Error::IndexOutOfBounds { index, len } => {
                write!(fmt, "index {index} is out of bounds for a tensor of {len} elements")
            }
            Error::NotHostAccessible(device) => {
                write!(fmt, "tensor memory on {device} is not accessible from the host")
            }
            Error::UnknownDevice(name) => write!(fmt, "unknown device '{name}'"),
            Error::UnknownDataType(name) => write!(fmt, "unknown data type '{name}'"),
            Error::InvalidArgument(msg) => write!(fmt, "invalid argument: {msg}"),
            Error::ToCStr => write!(fmt, "string is not a valid UTF-8 C string"),
        }
    }
}
impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Runtime(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RuntimeError> for Error {
    fn from(err: RuntimeError) -> Self {
        Error::Runtime(err)
    }
}

/// An error reported by the TVM runtime.
///
/// The TVM C API signals failures with a non-zero return code and keeps a thread local message describing the last
/// error, which is captured in this struct.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct RuntimeError {
    message: String,
}
impl RuntimeError {
    /// Create a new runtime error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Capture the last error of the TVM runtime on the calling thread.
    #[cfg(feature = "runtime")]
    pub(crate) fn last() -> Self {
        let message = unsafe { crate::sys::TVMGetLastError() };
        if message.is_null() {
            return Self::new("? (no error message)");
        }
        let message = unsafe { std::ffi::CStr::from_ptr(message) };
        Self::new(message.to_string_lossy().trim_end())
    }

    /// The error message.
    pub fn message(&self) -> &str {
        &self.message
    }
}
impl fmt::Display for RuntimeError {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        fmt.write_str(&self.message)
    }
}
impl std::error::Error for RuntimeError {}

pub(crate) type Result<T, E = Error> = std::result::Result<T, E>;
