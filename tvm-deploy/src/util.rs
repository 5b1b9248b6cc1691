//! Conversions between the Rust types and the types of the C API.

use std::ffi::CString;
use std::path::Path;

use crate::{Error, Result};

pub(crate) trait IntoSys {
    type SysType;
    fn sys(self) -> Self::SysType;
}

pub(crate) trait IntoRust {
    type RsType;
    fn rs(self) -> Self::RsType;
}

/// Return codes of the C API.
#[cfg(feature = "runtime")]
impl IntoRust for core::ffi::c_int {
    type RsType = Result<()>;
    fn rs(self) -> Self::RsType {
        if self == crate::sys::TVM_SUCCESS {
            Ok(())
        } else {
            Err(Error::Runtime(crate::RuntimeError::last()))
        }
    }
}

pub(crate) fn str_to_cstring(s: &str) -> Result<CString> {
    CString::new(s).map_err(|_| Error::ToCStr)
}

pub(crate) fn path_to_cstring(path: &Path) -> Result<CString> {
    str_to_cstring(path.to_str().ok_or(Error::ToCStr)?)
}
