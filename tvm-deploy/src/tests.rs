#![allow(dead_code)]

use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::graph_executor::GraphExecutor;
use crate::runtime::Runtime;
use crate::tensor::{HostTensor, TensorData};
use crate::{DataType, Device, Error, Result, RuntimeError};

#[ctor::ctor]
fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub const INPUT_SHAPE: [i64; 4] = [1, 3, 112, 112];
pub const OUTPUT_SHAPE: [i64; 2] = [1, 128];

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Load(PathBuf),
    SetInput { name: String, all_ones: bool },
    Run,
    GetOutput(usize),
    Sync,
}

/// A runtime that records the calls made to it, with an executor computing a deterministic function of its input.
#[derive(Debug, Clone, Default)]
pub struct FakeRuntime {
    artifacts: Vec<PathBuf>,
    missing_function: Option<&'static str>,
    calls: Rc<RefCell<Vec<Call>>>,
}
impl FakeRuntime {
    pub fn with_artifact(path: impl Into<PathBuf>) -> Self {
        Self {
            artifacts: vec![path.into()],
            ..Self::default()
        }
    }

    pub fn without_function(mut self, name: &'static str) -> Self {
        self.missing_function = Some(name);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }
}
impl Runtime for FakeRuntime {
    type Tensor = HostTensor<f32>;
    type Executor = FakeExecutor;

    fn load(&self, lib_path: &Path, _device: Device) -> Result<FakeExecutor> {
        self.calls
            .borrow_mut()
            .push(Call::Load(lib_path.to_path_buf()));
        if !self.artifacts.iter().any(|p| p == lib_path) {
            return Err(Error::Runtime(RuntimeError::new(format!(
                "cannot open {}",
                lib_path.display()
            ))));
        }
        // `get_num_outputs` is looked up on use
        if let Some(name) = self
            .missing_function
            .filter(|name| ["set_input", "run", "get_output"].contains(name))
        {
            return Err(Error::FunctionNotFound(name.to_string()));
        }
        Ok(FakeExecutor {
            calls: Rc::clone(&self.calls),
            missing_function: self.missing_function,
            input: None,
            output: None,
        })
    }

    fn empty(&self, shape: &[i64], dtype: DataType, _device: Device) -> Result<HostTensor<f32>> {
        if dtype != DataType::float32() {
            return Err(Error::InvalidArgument("only float32 tensors are supported"));
        }
        HostTensor::new(shape)
    }
}

#[derive(Debug)]
pub struct FakeExecutor {
    calls: Rc<RefCell<Vec<Call>>>,
    missing_function: Option<&'static str>,
    input: Option<HostTensor<f32>>,
    output: Option<Vec<f32>>,
}
impl GraphExecutor for FakeExecutor {
    type Tensor = HostTensor<f32>;

    fn set_input(&mut self, name: &str, tensor: &HostTensor<f32>) -> Result<()> {
        self.calls.borrow_mut().push(Call::SetInput {
            name: name.to_string(),
            all_ones: tensor.as_slice().iter().all(|v| *v == 1.0),
        });
        // Unknown names are ignored, like the graph executor does
        if name == "data" {
            if tensor.shape() != INPUT_SHAPE {
                return Err(Error::Runtime(RuntimeError::new(format!(
                    "shape mismatch: input is {INPUT_SHAPE:?}, source is {:?}",
                    tensor.shape()
                ))));
            }
            self.input = Some(tensor.clone());
        }
        Ok(())
    }

    fn run(&mut self) -> Result<()> {
        self.calls.borrow_mut().push(Call::Run);
        let input = self
            .input
            .as_ref()
            .ok_or_else(|| Error::Runtime(RuntimeError::new("input data is not set")))?;
        let mean = input.as_slice().iter().sum::<f32>() / input.len() as f32;
        self.output = Some(
            (0..OUTPUT_SHAPE[1])
                .map(|j| mean * (j + 1) as f32 / 128.0)
                .collect(),
        );
        Ok(())
    }

    fn get_output(&mut self, index: usize, dest: &mut HostTensor<f32>) -> Result<()> {
        self.calls.borrow_mut().push(Call::GetOutput(index));
        if index != 0 {
            return Err(Error::Runtime(RuntimeError::new(format!(
                "output index {index} out of range"
            ))));
        }
        let output = self
            .output
            .as_ref()
            .ok_or_else(|| Error::Runtime(RuntimeError::new("graph was not executed")))?;
        if dest.shape() != OUTPUT_SHAPE {
            return Err(Error::Runtime(RuntimeError::new(format!(
                "shape mismatch: output is {OUTPUT_SHAPE:?}, destination is {:?}",
                dest.shape()
            ))));
        }
        dest.as_mut_slice().copy_from_slice(output);
        Ok(())
    }

    fn num_outputs(&mut self) -> Result<usize> {
        if self.missing_function == Some("get_num_outputs") {
            return Err(Error::FunctionNotFound("get_num_outputs".to_string()));
        }
        Ok(1)
    }

    fn sync(&mut self) -> Result<()> {
        self.calls.borrow_mut().push(Call::Sync);
        Ok(())
    }
}
