#![cfg(all(feature = "runtime", tests_with_model))]

//! Tests against a real model exported by TVM, with the insightface input and output shapes.
//!
//! Set `TVM_DEPLOY_TEST_MODEL` to the path of the exported library when building the tests.

use tvm_deploy::evaluate::TimeEvaluator;
use tvm_deploy::graph_executor::{GraphExecutor, GraphModule};
use tvm_deploy::module::Module;
use tvm_deploy::runner::{InferenceRunner, RunConfig};
use tvm_deploy::runtime::TvmRuntime;
use tvm_deploy::tensor::{NDArray, TensorData};
use tvm_deploy::{DataType, Device, Error};

const MODEL_PATH: &str = env!("TVM_DEPLOY_TEST_MODEL");

fn config() -> RunConfig {
    RunConfig {
        lib_path: MODEL_PATH.into(),
        ..RunConfig::default()
    }
}

#[test]
fn run_once() {
    let report = InferenceRunner::new(TvmRuntime, config()).run_once().unwrap();
    assert_eq!(report.values().len(), 10);
    assert!(report.values().iter().all(|v| v.is_finite()));
    assert_eq!(report.to_string().split(' ').count(), 10);
}

#[test]
fn idempotent() {
    let runner = InferenceRunner::new(TvmRuntime, config());
    let first = runner.run_once().unwrap();
    let second = runner.run_once().unwrap();
    assert_eq!(first.to_string(), second.to_string());
}

#[test]
fn missing_artifact() {
    let config = RunConfig {
        lib_path: "no/such/dir/cpu.so".into(),
        ..RunConfig::default()
    };
    let err = InferenceRunner::new(TvmRuntime, config).run_once().unwrap_err();
    assert!(matches!(err, Error::Runtime(_)), "{err}");
}

#[test]
fn graph_module() {
    let device = Device::cpu(0);
    let lib = Module::load_from_file(MODEL_PATH, None).unwrap();
    assert!(lib.get_function("no_such_factory", false).unwrap().is_none());
    assert_eq!(
        GraphModule::from_named_factory(
            Module::load_from_file(MODEL_PATH, None).unwrap(),
            "no_such_factory",
            device
        )
        .unwrap_err(),
        Error::FunctionNotFound("no_such_factory".to_string())
    );

    let mut graph = GraphModule::from_factory(lib, device).unwrap();
    assert_eq!(graph.num_outputs().unwrap(), 1);

    let mut input = NDArray::empty(&[1, 3, 112, 112], DataType::float32(), device).unwrap();
    input.copy_from_slice(&vec![1.0_f32; 37632]).unwrap();
    let mut output = NDArray::empty(&[1, 128], DataType::float32(), device).unwrap();
    graph.set_input("data", &input).unwrap();
    graph.run().unwrap();
    graph.get_output(0, &mut output).unwrap();
    graph.sync().unwrap();
    assert_eq!(output.to_vec::<f32>().unwrap(), output.data::<f32>().unwrap());

    let mut wrong_output = NDArray::empty(&[1, 256], DataType::float32(), device).unwrap();
    assert!(matches!(
        graph.get_output(0, &mut wrong_output),
        Err(Error::Runtime(_))
    ));
}

#[test]
fn evaluate() {
    let runner = InferenceRunner::new(TvmRuntime, config());
    let mut session = runner.prepare().unwrap();
    let evaluator = TimeEvaluator::new(2, 1, 10).unwrap();
    let result = evaluator.evaluate(session.executor_mut()).unwrap();
    assert_eq!(result.results().len(), 2);
    assert!(result.mean_ms() > 0.0);
}
