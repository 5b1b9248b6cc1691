//! Single-shot inference of a compiled model.
//!
//! The [`InferenceRunner`] performs a single load, bind, execute and read cycle: it loads the model artifact, creates
//! its graph executor on the device, allocates the input and output tensors, fills the input with a constant value,
//! executes the graph and reads the first few elements of the output.
//!
//! ```rust,ignore
//! use tvm_deploy::runner::{InferenceRunner, RunConfig};
//! use tvm_deploy::runtime::TvmRuntime;
//!
//! let report = InferenceRunner::new(TvmRuntime, RunConfig::default()).run_once()?;
//! println!("{report}");
//! ```

use std::fmt;
use std::path::PathBuf;

use crate::graph_executor::GraphExecutor;
use crate::runtime::Runtime;
use crate::tensor::TensorData;
use crate::{DataType, Device, Result};

/// The default path of the model artifact, relative to the working directory.
pub const DEFAULT_LIB_PATH: &str = "../lib/cpu.so";

/// The parameters of an inference run.
///
/// The default configuration runs the insightface face recognition model: a single `1x3x112x112` image named `data`,
/// set to all ones, producing a `1x128` embedding of which the first 10 values are reported.
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    /// The path of the model artifact.
    pub lib_path: PathBuf,
    /// The device on which the graph is executed and the tensors are allocated.
    pub device: Device,
    /// The name of the graph input.
    pub input_name: String,
    /// The shape of the input tensor.
    pub input_shape: Vec<i64>,
    /// The shape of the output tensor.
    pub output_shape: Vec<i64>,
    /// The value of every input element.
    pub fill_value: f32,
    /// The index of the graph output to read.
    pub output_index: usize,
    /// The number of leading output elements to report.
    pub num_printed: usize,
}
impl Default for RunConfig {
    fn default() -> Self {
        Self {
            lib_path: PathBuf::from(DEFAULT_LIB_PATH),
            device: Device::cpu(0),
            input_name: "data".to_string(),
            input_shape: vec![1, 3, 112, 112],
            output_shape: vec![1, 128],
            fill_value: 1.0,
            output_index: 0,
            num_printed: 10,
        }
    }
}

/// The leading output values of an inference run.
///
/// Displayed as the values separated by single spaces, each printed like a C++ output stream does by default:
/// 6 significant digits, trailing zeros removed, and `nan` / `inf` for non finite values.
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    values: Vec<f32>,
}
impl RunReport {
    /// The reported output values.
    pub fn values(&self) -> &[f32] {
        &self.values
    }
}
impl fmt::Display for RunReport {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        for (i, value) in self.values.iter().enumerate() {
            if i > 0 {
                fmt.write_str(" ")?;
            }
            write!(fmt, "{}", General(*value))?;
        }
        Ok(())
    }
}

/// A float formatted as the `%g` conversion of C, with the default precision of 6 significant digits.
struct General(f32);
impl General {
    const PRECISION: i32 = 6;
}
impl fmt::Display for General {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        let value = self.0;
        if value.is_nan() {
            return fmt.write_str(if value.is_sign_negative() { "-nan" } else { "nan" });
        }
        if value.is_infinite() {
            return fmt.write_str(if value < 0.0 { "-inf" } else { "inf" });
        }
        if value == 0.0 {
            return fmt.write_str(if value.is_sign_negative() { "-0" } else { "0" });
        }

        let value = f64::from(value);
        // The exponent after rounding to the precision decides between fixed and scientific notation
        let scientific = format!("{:.*e}", (Self::PRECISION - 1) as usize, value);
        let Some((mantissa, exp)) = scientific.split_once('e') else {
            return write!(fmt, "{value}");
        };
        let Ok(exp) = exp.parse::<i32>() else {
            return write!(fmt, "{value}");
        };
        if (-4..Self::PRECISION).contains(&exp) {
            let fixed = format!("{:.*}", (Self::PRECISION - 1 - exp) as usize, value);
            fmt.write_str(trim_fraction(&fixed))
        } else {
            let sign = if exp < 0 { '-' } else { '+' };
            write!(fmt, "{}e{sign}{:02}", trim_fraction(mantissa), exp.abs())
        }
    }
}

fn trim_fraction(s: &str) -> &str {
    if !s.contains('.') {
        return s;
    }
    s.trim_end_matches('0').trim_end_matches('.')
}

/// Runs a compiled model once, on a given runtime.
#[derive(Debug)]
pub struct InferenceRunner<R> {
    runtime: R,
    config: RunConfig,
}
impl<R: Runtime> InferenceRunner<R> {
    /// Create a new runner.
    pub fn new(runtime: R, config: RunConfig) -> Self {
        Self { runtime, config }
    }

    /// The configuration of the runner.
    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Load the model and prepare its tensors.
    ///
    /// The returned session holds the executor and an input tensor with every element set to
    /// [`fill_value`](RunConfig::fill_value), ready to be executed with [`Session::infer`].
    ///
    /// # Errors
    ///
    /// Returns an error if the model fails to load, if it lacks one of the graph executor entry points, or if the
    /// tensors can not be allocated.
    pub fn prepare(&self) -> Result<Session<'_, R>> {
        let config = &self.config;
        log::debug!("loading {} on {}", config.lib_path.display(), config.device);
        let executor = self.runtime.load(&config.lib_path, config.device)?;

        let mut input = self
            .runtime
            .empty(&config.input_shape, DataType::float32(), config.device)?;
        let output = self
            .runtime
            .empty(&config.output_shape, DataType::float32(), config.device)?;
        for i in 0..input.numel() {
            input.set(i, config.fill_value)?;
        }

        Ok(Session {
            config,
            executor,
            input,
            output,
        })
    }

    /// Load the model, execute it once and report the leading output values.
    pub fn run_once(&self) -> Result<RunReport> {
        self.prepare()?.infer()
    }
}

/// A loaded model with its input and output tensors.
pub struct Session<'a, R: Runtime> {
    config: &'a RunConfig,
    executor: R::Executor,
    input: R::Tensor,
    output: R::Tensor,
}
impl<R: Runtime> Session<'_, R> {
    /// Bind the input, execute the graph and read the leading output values.
    ///
    /// May be called repeatedly, the input tensor is not modified.
    pub fn infer(&mut self) -> Result<RunReport> {
        let config = self.config;
        self.executor.set_input(&config.input_name, &self.input)?;
        self.executor.run()?;
        self.executor
            .get_output(config.output_index, &mut self.output)?;
        let values = (0..config.num_printed)
            .map(|i| self.output.get::<f32>(i))
            .collect::<Result<Vec<_>>>()?;
        Ok(RunReport { values })
    }

    /// The executor of the loaded model.
    pub fn executor_mut(&mut self) -> &mut R::Executor {
        &mut self.executor
    }

    /// The input tensor.
    pub fn input(&self) -> &R::Tensor {
        &self.input
    }

    /// The output tensor, holding the result of the last [`infer`](Session::infer).
    pub fn output(&self) -> &R::Tensor {
        &self.output
    }
}
