use std::fmt;

/// Accelerator a predictor backend should run on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Device {
    #[default]
    Cpu,
    Cuda { device_id: i32 },
    TensorRt { device_id: i32 },
}

/// Numeric precision requested from the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Precision {
    #[default]
    Full,
    Half,
}

/// Execution context handed to the pipeline and to predictor backends.
///
/// The matting core never inspects tensors on a device; it only carries this
/// so that backends are built against the same accelerator and precision the
/// caller asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExecutionContext {
    pub device: Device,
    pub precision: Precision,
}

impl ExecutionContext {
    pub fn cpu() -> Self {
        Self::default()
    }

    pub fn new(device: Device, precision: Precision) -> Self {
        Self { device, precision }
    }

    pub fn is_half(&self) -> bool {
        self.precision == Precision::Half
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Device::Cpu => write!(f, "CPU"),
            Device::Cuda { device_id } => write!(f, "CUDA(device_id={device_id})"),
            Device::TensorRt { device_id } => write!(f, "TensorRT(device_id={device_id})"),
        }
    }
}

impl fmt::Display for Precision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Precision::Full => write!(f, "fp32"),
            Precision::Half => write!(f, "fp16"),
        }
    }
}

impl fmt::Display for ExecutionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} @ {}", self.device, self.precision)
    }
}
