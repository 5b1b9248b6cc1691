use crate::tensor::{check_dtype, numel, TensorData};
use crate::{DataType, Device, Error, Result, Scalar};

/// A tensor that owns its data in host memory.
#[derive(Debug, Clone, PartialEq)]
pub struct HostTensor<T: Scalar> {
    data: Vec<T>,
    shape: Vec<i64>,
}
impl<T: Scalar> HostTensor<T> {
    /// Create a tensor with the given shape, with all elements set to `T::default()`.
    ///
    /// # Errors
    ///
    /// Returns an error if any of the dimensions is negative.
    pub fn new(shape: &[i64]) -> Result<Self> {
        Self::full(shape, T::default())
    }

    /// Create a tensor with the given shape, with all elements set to `value`.
    ///
    /// # Errors
    ///
    /// Returns an error if any of the dimensions is negative.
    pub fn full(shape: &[i64], value: T) -> Result<Self> {
        let numel = numel(shape)?;
        Ok(Self {
            data: vec![value; numel],
            shape: shape.to_vec(),
        })
    }

    /// Create a tensor with the given shape from a row-major buffer.
    ///
    /// # Errors
    ///
    /// Returns an error if any of the dimensions is negative, or if the length of the buffer does not match the shape.
    pub fn from_vec(shape: &[i64], data: Vec<T>) -> Result<Self> {
        if numel(shape)? != data.len() {
            return Err(Error::ShapeMismatch {
                expected: shape.to_vec(),
                actual: vec![data.len() as i64],
            });
        }
        Ok(Self {
            data,
            shape: shape.to_vec(),
        })
    }

    /// The number of elements in the tensor.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the tensor has no elements.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Set all elements of the tensor to `value`.
    pub fn fill(&mut self, value: T) {
        self.data.fill(value);
    }

    /// The element buffer of the tensor.
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// The mutable element buffer of the tensor.
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Consume the tensor and return its element buffer.
    pub fn into_vec(self) -> Vec<T> {
        self.data
    }
}

impl<T: Scalar> TensorData for HostTensor<T> {
    fn shape(&self) -> &[i64] {
        &self.shape
    }

    fn dtype(&self) -> DataType {
        T::DTYPE
    }

    fn device(&self) -> Device {
        Device::cpu(0)
    }

    fn data<U: Scalar>(&self) -> Result<&[U]> {
        check_dtype::<U>(T::DTYPE)?;
        // Safety: every scalar type has a distinct data type, so U and T are the same type
        Ok(unsafe { std::slice::from_raw_parts(self.data.as_ptr().cast::<U>(), self.data.len()) })
    }

    fn data_mut<U: Scalar>(&mut self) -> Result<&mut [U]> {
        check_dtype::<U>(T::DTYPE)?;
        // Safety: every scalar type has a distinct data type, so U and T are the same type
        Ok(unsafe {
            std::slice::from_raw_parts_mut(self.data.as_mut_ptr().cast::<U>(), self.data.len())
        })
    }
}
