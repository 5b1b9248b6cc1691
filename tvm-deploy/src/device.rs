//! Devices on which tensors are allocated and graphs are executed.
//!
//! A [`Device`] pairs a [`DeviceType`] with a device index, and matches the `DLDevice` struct of DLPack.

use std::fmt;
use std::str::FromStr;

use crate::Error;

/// The kind of a device, matching the `DLDeviceType` enum of DLPack.
#[repr(i32)]
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
#[non_exhaustive]
pub enum DeviceType {
    /// CPU device.
    Cpu = 1,
    /// CUDA GPU device.
    Cuda = 2,
    /// Pinned CUDA CPU memory allocated by `cudaMallocHost`.
    CudaHost = 3,
    /// OpenCL device.
    OpenCl = 4,
    /// Vulkan buffer.
    Vulkan = 7,
    /// Metal device for Apple GPU.
    Metal = 8,
    /// Verilog simulator buffer.
    Vpi = 9,
    /// ROCm GPU device.
    Rocm = 10,
    /// Pinned ROCm CPU memory allocated by `hipMallocHost`.
    RocmHost = 11,
    /// Reserved extension device type, used for quickly testing extension devices.
    ExtDev = 12,
    /// CUDA managed/unified memory allocated by `cudaMallocManaged`.
    CudaManaged = 13,
    /// Unified shared memory allocated on a oneAPI non-partitioned device.
    OneApi = 14,
    /// GPU support for next generation WebGPU standard.
    WebGpu = 15,
    /// Qualcomm Hexagon DSP.
    Hexagon = 16,
}
impl DeviceType {
    /// The name TVM uses for this device type.
    pub fn name(self) -> &'static str {
        match self {
            DeviceType::Cpu => "cpu",
            DeviceType::Cuda => "cuda",
            DeviceType::CudaHost => "cuda_host",
            DeviceType::OpenCl => "opencl",
            DeviceType::Vulkan => "vulkan",
            DeviceType::Metal => "metal",
            DeviceType::Vpi => "vpi",
            DeviceType::Rocm => "rocm",
            DeviceType::RocmHost => "rocm_host",
            DeviceType::ExtDev => "ext_dev",
            DeviceType::CudaManaged => "cuda_managed",
            DeviceType::OneApi => "oneapi",
            DeviceType::WebGpu => "webgpu",
            DeviceType::Hexagon => "hexagon",
        }
    }

    /// Parse a device type from its name.
    ///
    /// Accepts the names returned by [`name`](DeviceType::name), and the target names TVM maps to a device type
    /// (`llvm`, `c` and `stackvm` run on the CPU, `gpu` and `nvptx` on CUDA, `cl` on OpenCL).
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "cpu" | "llvm" | "c" | "stackvm" => DeviceType::Cpu,
            "cuda" | "gpu" | "nvptx" => DeviceType::Cuda,
            "cuda_host" => DeviceType::CudaHost,
            "opencl" | "cl" => DeviceType::OpenCl,
            "vulkan" => DeviceType::Vulkan,
            "metal" => DeviceType::Metal,
            "vpi" => DeviceType::Vpi,
            "rocm" => DeviceType::Rocm,
            "rocm_host" => DeviceType::RocmHost,
            "ext_dev" => DeviceType::ExtDev,
            "cuda_managed" => DeviceType::CudaManaged,
            "oneapi" => DeviceType::OneApi,
            "webgpu" => DeviceType::WebGpu,
            "hexagon" => DeviceType::Hexagon,
            _ => return None,
        })
    }

    /// Whether memory allocated on this device can be read and written directly by the host.
    pub fn is_host_accessible(self) -> bool {
        matches!(
            self,
            DeviceType::Cpu | DeviceType::CudaHost | DeviceType::RocmHost
        )
    }
}

/// A device on which tensors are allocated and computations are executed.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub struct Device {
    /// The kind of the device.
    pub device_type: DeviceType,
    /// The index of the device, for systems with multiple devices of the same kind.
    pub device_id: i32,
}
impl Device {
    /// Create a new device.
    pub fn new(device_type: DeviceType, device_id: i32) -> Self {
        Self {
            device_type,
            device_id,
        }
    }

    /// A CPU device.
    pub fn cpu(device_id: i32) -> Self {
        Self::new(DeviceType::Cpu, device_id)
    }

    /// A CUDA GPU device.
    pub fn cuda(device_id: i32) -> Self {
        Self::new(DeviceType::Cuda, device_id)
    }

    /// Whether memory allocated on this device can be read and written directly by the host.
    pub fn is_host_accessible(&self) -> bool {
        self.device_type.is_host_accessible()
    }
}
impl Default for Device {
    fn default() -> Self {
        Self::cpu(0)
    }
}
impl fmt::Display for Device {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        write!(fmt, "{}({})", self.device_type.name(), self.device_id)
    }
}

/// Parse a device from a string of the form `name`, `name:id` or `name(id)`, e.g. `cpu`, `cuda:1`.
impl FromStr for Device {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unknown = || Error::UnknownDevice(s.to_string());
        let s_trimmed = s.trim();
        let (name, id) = if let Some((name, id)) = s_trimmed.split_once(':') {
            (name, Some(id))
        } else if let Some(rest) = s_trimmed.strip_suffix(')') {
            let (name, id) = rest.split_once('(').ok_or_else(unknown)?;
            (name, Some(id))
        } else {
            (s_trimmed, None)
        };
        let device_type = DeviceType::from_name(name).ok_or_else(unknown)?;
        let device_id = match id {
            Some(id) => id.parse::<i32>().ok().filter(|id| *id >= 0).ok_or_else(unknown)?,
            None => 0,
        };
        Ok(Self::new(device_type, device_id))
    }
}

#[cfg(feature = "runtime")]
impl crate::util::IntoSys for Device {
    type SysType = crate::sys::DLDevice;
    fn sys(self) -> Self::SysType {
        crate::sys::DLDevice {
            device_type: self.device_type as i32 as crate::sys::DLDeviceType::Type,
            device_id: self.device_id,
        }
    }
}
