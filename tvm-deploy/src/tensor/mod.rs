//! Tensors passed to and from a graph.
//!
//! The [`TensorData`] trait is the common interface of all tensors: the shape, data type and device of the tensor,
//! and bounds-checked typed access to its contiguous element buffer, addressed by linear offset.
//!
//! - [`HostTensor`] owns its data in host memory. It is used to prepare inputs and inspect outputs without any
//!   dependency on the runtime.
//! - [`NDArray`] is a tensor allocated by the TVM runtime on some device. Its data is accessible directly only when the
//!   device memory is accessible from the host, otherwise it must be copied with
//!   [`copy_from_slice`](NDArray::copy_from_slice) and [`to_vec`](NDArray::to_vec).
//!   Enabled by the `runtime` feature.

mod host;
pub use host::*;

#[cfg(feature = "ndarray")]
mod array;
#[cfg(feature = "ndarray")]
pub use array::*;

#[cfg(feature = "runtime")]
mod nd_array;
#[cfg(feature = "runtime")]
pub use nd_array::*;

use crate::{DataType, Device, Error, Result, Scalar};

/// A dense tensor with a contiguous, row-major element buffer.
pub trait TensorData {
    /// The dimensions of the tensor.
    fn shape(&self) -> &[i64];

    /// The element type of the tensor.
    fn dtype(&self) -> DataType;

    /// The device on which the tensor data is allocated.
    fn device(&self) -> Device;

    /// The number of elements in the tensor.
    fn numel(&self) -> usize {
        // Every constructor validates the shape with `numel`, so the product fits
        self.shape().iter().map(|d| *d as usize).product()
    }

    /// The element buffer of the tensor.
    ///
    /// # Errors
    ///
    /// Returns an error if `T` does not match the data type of the tensor, or if the tensor memory is not accessible
    /// from the host.
    fn data<T: Scalar>(&self) -> Result<&[T]>;

    /// The mutable element buffer of the tensor.
    ///
    /// # Errors
    ///
    /// Returns an error if `T` does not match the data type of the tensor, or if the tensor memory is not accessible
    /// from the host.
    fn data_mut<T: Scalar>(&mut self) -> Result<&mut [T]>;

    /// Get the element at the given linear offset.
    fn get<T: Scalar>(&self, index: usize) -> Result<T> {
        let data = self.data::<T>()?;
        data.get(index).copied().ok_or(Error::IndexOutOfBounds {
            index,
            len: data.len(),
        })
    }

    /// Set the element at the given linear offset.
    fn set<T: Scalar>(&mut self, index: usize, value: T) -> Result<()> {
        let data = self.data_mut::<T>()?;
        let len = data.len();
        let elm = data
            .get_mut(index)
            .ok_or(Error::IndexOutOfBounds { index, len })?;
        *elm = value;
        Ok(())
    }
}

/// Compute the number of elements of a tensor with the given shape.
///
/// A tensor with no dimensions is a scalar and has a single element.
///
/// # Errors
///
/// Returns an error if any of the dimensions is negative, or if the number of elements overflows `usize`.
pub fn numel(shape: &[i64]) -> Result<usize> {
    shape.iter().try_fold(1_usize, |numel, &d| {
        if d < 0 {
            return Err(Error::InvalidShape(d));
        }
        usize::try_from(d)
            .ok()
            .and_then(|d| numel.checked_mul(d))
            .ok_or(Error::InvalidArgument("number of tensor elements overflows"))
    })
}

pub(crate) fn check_dtype<T: Scalar>(actual: DataType) -> Result<()> {
    if T::DTYPE != actual {
        return Err(Error::TypeMismatch {
            expected: T::DTYPE,
            actual,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numel_of_shape() {
        assert_eq!(numel(&[1, 3, 112, 112]).unwrap(), 37632);
        assert_eq!(numel(&[1, 128]).unwrap(), 128);
        assert_eq!(numel(&[]).unwrap(), 1);
        assert_eq!(numel(&[4, 0, 2]).unwrap(), 0);
        assert_eq!(numel(&[4, -1]), Err(Error::InvalidShape(-1)));
    }

    #[test]
    fn numel_overflow() {
        let overflow = Err(Error::InvalidArgument("number of tensor elements overflows"));
        assert_eq!(numel(&[i64::MAX, 4]), overflow);
        assert_eq!(numel(&[1 << 32, 1 << 32, 1 << 32]), overflow);
        // a zero dimension does not hide an invalid one
        assert_eq!(numel(&[0, -2]), Err(Error::InvalidShape(-2)));
    }

    #[test]
    fn dtype_check() {
        assert!(check_dtype::<f32>(DataType::float32()).is_ok());
        assert_eq!(
            check_dtype::<f32>(DataType::int(32)),
            Err(Error::TypeMismatch {
                expected: DataType::float32(),
                actual: DataType::int(32),
            })
        );
    }
}
