use std::path::{Path, PathBuf};

use tvm_deploy::evaluate::TimeEvaluator;
use tvm_deploy::graph_executor::GraphExecutor;
use tvm_deploy::runner::{InferenceRunner, RunConfig};
use tvm_deploy::runtime::Runtime;
use tvm_deploy::tensor::{HostTensor, TensorData};
use tvm_deploy::{DataType, Device, Error, RuntimeError};

type Result<T> = std::result::Result<T, Error>;

/// A model computing `output[j] = input[j] * (j + 1)`, for the first elements of the input.
struct ScaleRuntime {
    lib_path: PathBuf,
}

struct ScaleExecutor {
    input: Vec<f32>,
    output: Vec<f32>,
    runs: usize,
}

impl Runtime for ScaleRuntime {
    type Tensor = HostTensor<f32>;
    type Executor = ScaleExecutor;

    fn load(&self, lib_path: &Path, device: Device) -> Result<ScaleExecutor> {
        assert_eq!(device, Device::cpu(0));
        if lib_path != self.lib_path {
            return Err(RuntimeError::new(format!("cannot open {}", lib_path.display())).into());
        }
        Ok(ScaleExecutor {
            input: Vec::new(),
            output: Vec::new(),
            runs: 0,
        })
    }

    fn empty(&self, shape: &[i64], dtype: DataType, _device: Device) -> Result<HostTensor<f32>> {
        assert_eq!(dtype, DataType::float32());
        HostTensor::new(shape)
    }
}

impl GraphExecutor for ScaleExecutor {
    type Tensor = HostTensor<f32>;

    fn set_input(&mut self, name: &str, tensor: &HostTensor<f32>) -> Result<()> {
        if name == "data" {
            if tensor.shape() != [1, 3, 112, 112] {
                return Err(Error::ShapeMismatch {
                    expected: vec![1, 3, 112, 112],
                    actual: tensor.shape().to_vec(),
                });
            }
            self.input = tensor.as_slice().to_vec();
        }
        Ok(())
    }

    fn run(&mut self) -> Result<()> {
        self.runs += 1;
        self.output = self
            .input
            .iter()
            .take(128)
            .enumerate()
            .map(|(j, v)| v * (j + 1) as f32)
            .collect();
        Ok(())
    }

    fn get_output(&mut self, index: usize, dest: &mut HostTensor<f32>) -> Result<()> {
        assert_eq!(index, 0);
        if dest.len() != self.output.len() {
            return Err(Error::ShapeMismatch {
                expected: vec![1, self.output.len() as i64],
                actual: dest.shape().to_vec(),
            });
        }
        dest.as_mut_slice().copy_from_slice(&self.output);
        Ok(())
    }

    fn num_outputs(&mut self) -> Result<usize> {
        Ok(1)
    }
}

fn scale_runner(lib_path: &str) -> InferenceRunner<ScaleRuntime> {
    InferenceRunner::new(
        ScaleRuntime {
            lib_path: PathBuf::from("../lib/cpu.so"),
        },
        RunConfig {
            lib_path: PathBuf::from(lib_path),
            ..RunConfig::default()
        },
    )
}

#[test]
fn prints_first_ten_outputs() {
    let report = scale_runner("../lib/cpu.so").run_once().unwrap();
    assert_eq!(
        report.values(),
        [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0]
    );
    assert_eq!(report.to_string(), "1 2 3 4 5 6 7 8 9 10");
}

#[test]
fn missing_artifact_fails_without_report() {
    let err = scale_runner("missing/cpu.so").run_once().unwrap_err();
    assert_eq!(
        err,
        Error::Runtime(RuntimeError::new("cannot open missing/cpu.so"))
    );
}

#[test]
fn output_shape_mismatch() {
    let runner = InferenceRunner::new(
        ScaleRuntime {
            lib_path: PathBuf::from("../lib/cpu.so"),
        },
        RunConfig {
            output_shape: vec![1, 512],
            ..RunConfig::default()
        },
    );
    assert_eq!(
        runner.run_once().unwrap_err(),
        Error::ShapeMismatch {
            expected: vec![1, 128],
            actual: vec![1, 512],
        }
    );
}

#[test]
fn input_shape_mismatch() {
    let runner = InferenceRunner::new(
        ScaleRuntime {
            lib_path: PathBuf::from("../lib/cpu.so"),
        },
        RunConfig {
            input_shape: vec![1, 3, 224, 224],
            ..RunConfig::default()
        },
    );
    let mut session = runner.prepare().unwrap();
    assert_eq!(
        session.infer().unwrap_err(),
        Error::ShapeMismatch {
            expected: vec![1, 3, 112, 112],
            actual: vec![1, 3, 224, 224],
        }
    );
    assert_eq!(session.executor_mut().runs, 0);
    assert!(runner.run_once().is_err());
}

#[test]
fn repeated_inference_is_identical() {
    let runner = scale_runner("../lib/cpu.so");
    let mut session = runner.prepare().unwrap();
    let first = session.infer().unwrap();
    let second = session.infer().unwrap();
    assert_eq!(first, second);
    assert_eq!(session.output().numel(), 128);
    assert_eq!(session.executor_mut().runs, 2);
}

#[test]
fn evaluate_session() {
    let runner = scale_runner("../lib/cpu.so");
    let mut session = runner.prepare().unwrap();
    session.infer().unwrap();

    let evaluator = TimeEvaluator::new(3, 2, 0).unwrap();
    let result = evaluator.evaluate(session.executor_mut()).unwrap();
    assert_eq!(result.results().len(), 3);
    assert!(result.mean_ms() >= 0.0);
    assert!(result.std_ms() >= 0.0);
    assert_eq!(session.executor_mut().runs, 1 + 3 * 2);
}
