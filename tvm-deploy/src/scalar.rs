//! Element types of tensors.
//!
//! A [`DataType`] describes the element type of a tensor as TVM sees it (type code, bits and lanes), matching the
//! `DLDataType` struct of DLPack. The [`Scalar`] trait binds a Rust type to its data type, and is used to access the
//! data of a tensor as a typed slice.
//!
//! Half precision floating point types are provided by the `half` feature if enabled, otherwise a simple wrappers
//! around `u16` are provided without any arithmetic operations.

use std::fmt;
use std::str::FromStr;

use crate::Error;

macro_rules! scalar_type {
    ($(#[$outer:meta])* $name:ident, $repr:ty) => {
        #[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
        #[repr(transparent)]
        $(#[$outer])*
        pub struct $name($repr);
        impl $name {
            #[doc = concat!("Creates a new `", stringify!($name), "` from its raw bit representation.")]
            pub fn from_bits(bits: $repr) -> Self {
                Self(bits)
            }
            #[doc = concat!("Get the raw bit representation of the `", stringify!($name), "`.")]
            pub fn to_bits(self) -> $repr {
                self.0
            }
        }
    };
}

cfg_if::cfg_if! { if #[cfg(feature = "half")] {
    pub use half::f16;
    pub use half::bf16;
} else {
    scalar_type!(
        /// A 16-bit floating point type implementing the IEEE 754-2008 standard [`binary16`] a.k.a "half"
        /// format.
        ///
        /// Doesn't provide any arithmetic operations, but can be converted to/from `u16`.
        /// Enable the `half` feature to get a fully functional `f16` type.
        #[allow(non_camel_case_types)]
        f16, u16
    );

    scalar_type!(
        /// A 16-bit floating point type implementing the [`bfloat16`] format.
        ///
        /// Doesn't provide any arithmetic operations, but can be converted to/from `u16`.
        /// Enable the `half` feature to get a fully functional `bf16` type.
        #[allow(non_camel_case_types)]
        bf16, u16
    );
} }

/// The type code of a [`DataType`], matching the `DLDataTypeCode` enum of DLPack.
#[repr(u8)]
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
#[non_exhaustive]
pub enum DataTypeCode {
    /// Signed integer.
    Int = 0,
    /// Unsigned integer.
    UInt = 1,
    /// IEEE floating point.
    Float = 2,
    /// Opaque handle type, reserved for testing purposes.
    OpaqueHandle = 3,
    /// bfloat16.
    Bfloat = 4,
    /// Complex number, the real and imaginary parts are stored as consecutive floats.
    Complex = 5,
    /// Boolean.
    Bool = 6,
}
impl DataTypeCode {
    #[cfg(feature = "runtime")]
    fn from_raw(code: u8) -> Option<Self> {
        Some(match code {
            0 => DataTypeCode::Int,
            1 => DataTypeCode::UInt,
            2 => DataTypeCode::Float,
            3 => DataTypeCode::OpaqueHandle,
            4 => DataTypeCode::Bfloat,
            5 => DataTypeCode::Complex,
            6 => DataTypeCode::Bool,
            _ => return None,
        })
    }

    fn prefix(self) -> &'static str {
        match self {
            DataTypeCode::Int => "int",
            DataTypeCode::UInt => "uint",
            DataTypeCode::Float => "float",
            DataTypeCode::OpaqueHandle => "handle",
            DataTypeCode::Bfloat => "bfloat",
            DataTypeCode::Complex => "complex",
            DataTypeCode::Bool => "bool",
        }
    }
}

/// The element type of a tensor.
///
/// Printed and parsed with the names TVM uses, e.g. `float32`, `int8`, `float32x4` and `bool`.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub struct DataType {
    code: DataTypeCode,
    bits: u8,
    lanes: u16,
}
impl DataType {
    /// Create a new data type.
    pub const fn new(code: DataTypeCode, bits: u8, lanes: u16) -> Self {
        Self { code, bits, lanes }
    }

    /// A signed integer type with the given number of bits.
    pub const fn int(bits: u8) -> Self {
        Self::new(DataTypeCode::Int, bits, 1)
    }

    /// An unsigned integer type with the given number of bits.
    pub const fn uint(bits: u8) -> Self {
        Self::new(DataTypeCode::UInt, bits, 1)
    }

    /// A floating point type with the given number of bits.
    pub const fn float(bits: u8) -> Self {
        Self::new(DataTypeCode::Float, bits, 1)
    }

    /// 32-bit floating point, `f32`.
    pub const fn float32() -> Self {
        Self::float(32)
    }

    /// 16-bit bfloat.
    pub const fn bfloat16() -> Self {
        Self::new(DataTypeCode::Bfloat, 16, 1)
    }

    /// The boolean type of TVM, a single bit unsigned integer.
    pub const fn bool() -> Self {
        Self::uint(1)
    }

    /// The type code.
    pub fn code(&self) -> DataTypeCode {
        self.code
    }

    /// The number of bits of a single lane.
    pub fn bits(&self) -> u8 {
        self.bits
    }

    /// The number of lanes, greater than one for vector types.
    pub fn lanes(&self) -> u16 {
        self.lanes
    }

    /// The number of bytes a single element occupies in memory.
    pub fn size_in_bytes(&self) -> usize {
        (self.bits as usize * self.lanes as usize).div_ceil(8)
    }
}
impl fmt::Display for DataType {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        if *self == DataType::bool() {
            return fmt.write_str("bool");
        }
        fmt.write_str(self.code.prefix())?;
        if self.code == DataTypeCode::OpaqueHandle {
            return Ok(());
        }
        write!(fmt, "{}", self.bits)?;
        if self.lanes > 1 {
            write!(fmt, "x{}", self.lanes)?;
        }
        Ok(())
    }
}
impl FromStr for DataType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unknown = || Error::UnknownDataType(s.to_string());
        match s {
            "bool" => return Ok(DataType::bool()),
            "handle" => return Ok(DataType::new(DataTypeCode::OpaqueHandle, 64, 1)),
            _ => {}
        }
        let (code, rest) = [
            // "uint" before "int"
            DataTypeCode::UInt,
            DataTypeCode::Int,
            DataTypeCode::Float,
            DataTypeCode::Bfloat,
            DataTypeCode::Complex,
        ]
        .into_iter()
        .find_map(|code| s.strip_prefix(code.prefix()).map(|rest| (code, rest)))
        .ok_or_else(unknown)?;
        let (bits, lanes) = match rest.split_once('x') {
            Some((bits, lanes)) => (bits, lanes.parse::<u16>().map_err(|_| unknown())?),
            None => (rest, 1),
        };
        let bits = bits.parse::<u8>().map_err(|_| unknown())?;
        if bits == 0 || lanes == 0 {
            return Err(unknown());
        }
        Ok(DataType::new(code, bits, lanes))
    }
}

#[cfg(feature = "runtime")]
impl crate::util::IntoSys for DataType {
    type SysType = crate::sys::DLDataType;
    fn sys(self) -> Self::SysType {
        crate::sys::DLDataType {
            code: self.code as u8,
            bits: self.bits,
            lanes: self.lanes,
        }
    }
}

#[cfg(feature = "runtime")]
impl crate::util::IntoRust for crate::sys::DLDataType {
    type RsType = Option<DataType>;
    fn rs(self) -> Self::RsType {
        let code = DataTypeCode::from_raw(self.code)?;
        Some(DataType::new(code, self.bits, self.lanes))
    }
}

/// A Rust type that can be used as the element type of a tensor.
///
/// The memory layout of the type must match the layout TVM uses for [`DTYPE`](Scalar::DTYPE).
/// The trait is sealed, it is implemented for the primitive numeric types and for [`f16`] and [`bf16`].
pub trait Scalar: Copy + Default + private::Sealed + 'static {
    /// The data type of tensors holding elements of this type.
    const DTYPE: DataType;
}

mod private {
    pub trait Sealed {}
}

macro_rules! impl_scalar {
    ($($rust_type:ty => $dtype:expr),* $(,)?) => {
        $(
            impl private::Sealed for $rust_type {}
            impl Scalar for $rust_type {
                const DTYPE: DataType = $dtype;
            }
        )*
    };
}
impl_scalar! {
    i8 => DataType::int(8),
    i16 => DataType::int(16),
    i32 => DataType::int(32),
    i64 => DataType::int(64),
    u8 => DataType::uint(8),
    u16 => DataType::uint(16),
    u32 => DataType::uint(32),
    u64 => DataType::uint(64),
    f16 => DataType::float(16),
    bf16 => DataType::bfloat16(),
    f32 => DataType::float(32),
    f64 => DataType::float(64),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display() {
        assert_eq!(DataType::float32().to_string(), "float32");
        assert_eq!(DataType::int(64).to_string(), "int64");
        assert_eq!(DataType::uint(8).to_string(), "uint8");
        assert_eq!(DataType::bfloat16().to_string(), "bfloat16");
        assert_eq!(DataType::bool().to_string(), "bool");
        assert_eq!(
            DataType::new(DataTypeCode::Float, 32, 4).to_string(),
            "float32x4"
        );
        assert_eq!(
            DataType::new(DataTypeCode::OpaqueHandle, 64, 1).to_string(),
            "handle"
        );
    }

    #[test]
    fn parse() {
        for dtype in [
            DataType::float32(),
            DataType::float(16),
            DataType::int(8),
            DataType::uint(32),
            DataType::bfloat16(),
            DataType::bool(),
            DataType::new(DataTypeCode::Int, 8, 16),
        ] {
            assert_eq!(dtype.to_string().parse::<DataType>().unwrap(), dtype);
        }

        for invalid in ["", "float", "f32", "int0", "float32x", "float32x0", "uint256"] {
            assert_eq!(
                invalid.parse::<DataType>(),
                Err(Error::UnknownDataType(invalid.to_string())),
                "{invalid}"
            );
        }
    }

    #[cfg(feature = "runtime")]
    #[test]
    fn dlpack_conversions() {
        use crate::util::{IntoRust, IntoSys};

        for dtype in [
            DataType::float32(),
            DataType::int(64),
            DataType::bool(),
            DataType::bfloat16(),
            DataType::new(DataTypeCode::Float, 16, 8),
        ] {
            let raw = dtype.sys();
            assert_eq!((raw.code, raw.bits, raw.lanes), (dtype.code() as u8, dtype.bits(), dtype.lanes()));
            assert_eq!(raw.rs(), Some(dtype));
        }
        let unknown = crate::sys::DLDataType {
            code: 200,
            bits: 32,
            lanes: 1,
        };
        assert_eq!(unknown.rs(), None);
    }

    #[test]
    fn size_in_bytes() {
        assert_eq!(DataType::float32().size_in_bytes(), 4);
        assert_eq!(DataType::float(64).size_in_bytes(), 8);
        assert_eq!(DataType::bfloat16().size_in_bytes(), 2);
        assert_eq!(DataType::bool().size_in_bytes(), 1);
        assert_eq!(DataType::new(DataTypeCode::Float, 32, 4).size_in_bytes(), 16);
        assert_eq!(DataType::new(DataTypeCode::Int, 4, 1).size_in_bytes(), 1);
    }

    #[test]
    fn scalar_dtypes_match_memory_layout() {
        fn check<S: Scalar>() {
            assert_eq!(S::DTYPE.size_in_bytes(), std::mem::size_of::<S>());
        }
        check::<i8>();
        check::<i16>();
        check::<i32>();
        check::<i64>();
        check::<u8>();
        check::<u16>();
        check::<u32>();
        check::<u64>();
        check::<f16>();
        check::<bf16>();
        check::<f32>();
        check::<f64>();
    }
}
