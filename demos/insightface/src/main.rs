#![deny(warnings)]

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tvm_deploy::evaluate::TimeEvaluator;
use tvm_deploy::runner::{InferenceRunner, RunConfig, DEFAULT_LIB_PATH};
use tvm_deploy::runtime::TvmRuntime;

/// Run the insightface model compiled by TVM on a constant image, and print the first values of its embedding
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the model library exported by TVM
    #[arg(long, default_value = DEFAULT_LIB_PATH)]
    lib: PathBuf,

    /// Measure the mean inference time after the run
    #[arg(long, default_value_t = false)]
    evaluate: bool,

    /// Number of time measurements
    #[arg(long, default_value_t = 3)]
    repeat: usize,

    /// Minimum duration of a single time measurement, in milliseconds
    #[arg(long, default_value_t = 500)]
    min_repeat_ms: u64,

    /// Verbose logs
    #[arg(short, long, default_value_t = false)]
    verbose: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let level = if args.verbose {
        log::LevelFilter::Debug
    } else if args.evaluate {
        log::LevelFilter::Info
    } else {
        log::LevelFilter::Warn
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("fatal: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<(), tvm_deploy::Error> {
    let config = RunConfig {
        lib_path: args.lib.clone(),
        ..RunConfig::default()
    };
    let runner = InferenceRunner::new(TvmRuntime, config);

    let mut session = runner.prepare()?;
    let report = session.infer()?;
    println!("{report}");

    if args.evaluate {
        let evaluator = TimeEvaluator::new(args.repeat, 1, args.min_repeat_ms)?;
        let result = evaluator.evaluate(session.executor_mut())?;
        log::info!("{result}");
    }
    Ok(())
}
