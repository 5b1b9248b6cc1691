use core::ffi::{c_int, c_void};
use core::ptr::NonNull;

use crate::tensor::{check_dtype, numel, TensorData};
use crate::util::IntoRust;
use crate::{sys, DataType, Device, Error, Result, Scalar};

/// A tensor allocated by the TVM runtime.
///
/// The tensor owns its memory, which is released by the runtime when the tensor is dropped.
/// Matches `tvm::runtime::NDArray`, accessed through the `TVMArrayHandle` of the C API.
pub struct NDArray {
    handle: NonNull<sys::DLTensor>,
    dtype: DataType,
    device: Device,
}
impl NDArray {
    /// Allocate an uninitialized tensor on a device.
    ///
    /// # Errors
    ///
    /// Returns an error if any of the dimensions is negative, or if the runtime fails to allocate the tensor,
    /// for example if the device is not available.
    pub fn empty(shape: &[i64], dtype: DataType, device: Device) -> Result<Self> {
        numel(shape)?;
        let mut handle: sys::TVMArrayHandle = core::ptr::null_mut();
        unsafe {
            sys::TVMArrayAlloc(
                shape.as_ptr(),
                shape.len() as c_int,
                dtype.code() as c_int,
                dtype.bits() as c_int,
                dtype.lanes() as c_int,
                device.device_type as c_int,
                device.device_id as c_int,
                &mut handle,
            )
        }
        .rs()?;
        let handle = NonNull::new(handle).ok_or(Error::InvalidArgument("null tensor handle"))?;
        let mut tensor = Self {
            handle,
            dtype,
            device,
        };
        // The runtime owns the tensor description, read the data type back from it
        tensor.dtype = tensor
            .raw()
            .dtype
            .rs()
            .ok_or_else(|| Error::UnknownDataType(dtype.to_string()))?;
        log::debug!("allocated {}{shape:?} tensor on {device}", tensor.dtype);
        Ok(tensor)
    }

    fn raw(&self) -> &sys::DLTensor {
        unsafe { self.handle.as_ref() }
    }

    /// The size of the tensor data in bytes.
    pub fn nbytes(&self) -> usize {
        self.numel() * self.dtype.size_in_bytes()
    }

    pub(crate) fn as_handle(&self) -> *mut c_void {
        self.handle.as_ptr().cast()
    }

    fn data_ptr(&self) -> Result<*mut u8> {
        if !self.device.is_host_accessible() {
            return Err(Error::NotHostAccessible(self.device));
        }
        let raw = self.raw();
        if !raw.strides.is_null() {
            return Err(Error::InvalidArgument("tensor is not compact"));
        }
        Ok(unsafe { raw.data.cast::<u8>().add(raw.byte_offset as usize) })
    }

    /// Copy the elements of a host buffer into the tensor, on any device.
    ///
    /// # Errors
    ///
    /// Returns an error if `T` does not match the data type of the tensor, if the length of the buffer does not match
    /// the number of elements, or if the runtime fails to copy the data.
    pub fn copy_from_slice<T: Scalar>(&mut self, src: &[T]) -> Result<()> {
        check_dtype::<T>(self.dtype)?;
        self.check_len(src.len())?;
        unsafe {
            // The runtime only reads from the buffer
            sys::TVMArrayCopyFromBytes(
                self.handle.as_ptr(),
                src.as_ptr().cast_mut().cast(),
                core::mem::size_of_val(src),
            )
        }
        .rs()
    }

    /// Copy the elements of the tensor, on any device, into a new host buffer.
    ///
    /// # Errors
    ///
    /// Returns an error if `T` does not match the data type of the tensor, or if the runtime fails to copy the data.
    pub fn to_vec<T: Scalar>(&self) -> Result<Vec<T>> {
        check_dtype::<T>(self.dtype)?;
        let mut dst = vec![T::default(); self.numel()];
        unsafe {
            sys::TVMArrayCopyToBytes(
                self.handle.as_ptr(),
                dst.as_mut_ptr().cast(),
                core::mem::size_of_val(dst.as_slice()),
            )
        }
        .rs()?;
        Ok(dst)
    }

    fn check_len(&self, len: usize) -> Result<()> {
        if len != self.numel() {
            return Err(Error::ShapeMismatch {
                expected: self.shape().to_vec(),
                actual: vec![len as i64],
            });
        }
        Ok(())
    }
}

impl TensorData for NDArray {
    fn shape(&self) -> &[i64] {
        let raw = self.raw();
        if raw.ndim == 0 {
            return &[];
        }
        unsafe { core::slice::from_raw_parts(raw.shape, raw.ndim as usize) }
    }

    fn dtype(&self) -> DataType {
        self.dtype
    }

    fn device(&self) -> Device {
        self.device
    }

    fn data<T: Scalar>(&self) -> Result<&[T]> {
        check_dtype::<T>(self.dtype)?;
        let ptr = self.data_ptr()?;
        Ok(unsafe { core::slice::from_raw_parts(ptr.cast::<T>(), self.numel()) })
    }

    fn data_mut<T: Scalar>(&mut self) -> Result<&mut [T]> {
        check_dtype::<T>(self.dtype)?;
        let ptr = self.data_ptr()?;
        Ok(unsafe { core::slice::from_raw_parts_mut(ptr.cast::<T>(), self.numel()) })
    }
}

impl Drop for NDArray {
    fn drop(&mut self) {
        if let Err(err) = unsafe { sys::TVMArrayFree(self.handle.as_ptr()) }.rs() {
            log::error!("failed to free tensor: {err}");
        }
    }
}

impl core::fmt::Debug for NDArray {
    fn fmt(&self, fmt: &mut core::fmt::Formatter) -> core::fmt::Result {
        fmt.debug_struct("NDArray")
            .field("shape", &self.shape())
            .field("dtype", &self.dtype)
            .field("device", &self.device)
            .finish()
    }
}
