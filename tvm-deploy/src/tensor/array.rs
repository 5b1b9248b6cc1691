use ndarray::{ArrayD, ArrayViewD, ArrayViewMutD, IxDyn};

use crate::tensor::{HostTensor, TensorData};
use crate::{Error, Result, Scalar};

fn array_dim(shape: &[i64]) -> IxDyn {
    IxDyn(&shape.iter().map(|d| *d as usize).collect::<Vec<_>>())
}

fn shape_error(shape: &[i64], len: usize) -> Error {
    Error::ShapeMismatch {
        expected: shape.to_vec(),
        actual: vec![len as i64],
    }
}

/// Get an array view of a tensor.
///
/// # Errors
///
/// Returns an error if `T` does not match the data type of the tensor, or if the tensor memory is not accessible
/// from the host.
pub fn as_array<T: Scalar>(tensor: &impl TensorData) -> Result<ArrayViewD<'_, T>> {
    let shape = tensor.shape();
    let data = tensor.data::<T>()?;
    ArrayViewD::from_shape(array_dim(shape), data).map_err(|_| shape_error(shape, data.len()))
}

/// Get a mutable array view of a tensor.
///
/// # Errors
///
/// Returns an error if `T` does not match the data type of the tensor, or if the tensor memory is not accessible
/// from the host.
pub fn as_array_mut<T: Scalar>(tensor: &mut impl TensorData) -> Result<ArrayViewMutD<'_, T>> {
    let dim = array_dim(tensor.shape());
    let shape = tensor.shape().to_vec();
    let data = tensor.data_mut::<T>()?;
    let len = data.len();
    ArrayViewMutD::from_shape(dim, data).map_err(|_| shape_error(&shape, len))
}

impl<T: Scalar> HostTensor<T> {
    /// Create a tensor from an ndarray, in row-major order.
    pub fn from_array<D: ndarray::Dimension>(array: ndarray::Array<T, D>) -> Self {
        let shape = array.shape().iter().map(|d| *d as i64).collect::<Vec<_>>();
        let data = array.iter().copied().collect();
        match Self::from_vec(&shape, data) {
            Ok(tensor) => tensor,
            Err(_) => unreachable!("array length matches its shape"),
        }
    }

    /// Convert the tensor into an ndarray.
    pub fn into_array(self) -> ArrayD<T> {
        let dim = array_dim(self.shape());
        match ArrayD::from_shape_vec(dim, self.into_vec()) {
            Ok(array) => array,
            Err(_) => unreachable!("tensor length matches its shape"),
        }
    }
}
