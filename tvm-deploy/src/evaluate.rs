//! Timing of graph execution.
//!
//! A [`TimeEvaluator`] executes a graph repeatedly and measures the mean time of a single execution, in the same
//! manner as the `time_evaluator` of TVM: the graph is executed in batches of `number` runs, and `number` grows until a
//! single batch takes at least `min_repeat_ms` milliseconds.

use std::fmt;
use std::time::Instant;

use crate::graph_executor::GraphExecutor;
use crate::{Error, Result};

/// The growth factor of the batch size when a batch finishes too fast.
const GROWTH_FACTOR: f64 = 1.618;

/// Measures the execution time of a graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeEvaluator {
    repeat: usize,
    number: usize,
    min_repeat_ms: u64,
}
impl TimeEvaluator {
    /// Create a new evaluator.
    ///
    /// # Arguments
    ///
    /// * `repeat` - The number of measurements.
    /// * `number` - The initial number of executions in each measurement.
    /// * `min_repeat_ms` - The minimum duration of a single measurement, in milliseconds. Zero disables the growth of
    ///   `number`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if `repeat` or `number` are zero.
    pub fn new(repeat: usize, number: usize, min_repeat_ms: u64) -> Result<Self> {
        if repeat == 0 {
            return Err(Error::InvalidArgument("repeat must be positive"));
        }
        if number == 0 {
            return Err(Error::InvalidArgument("number must be positive"));
        }
        Ok(Self {
            repeat,
            number,
            min_repeat_ms,
        })
    }

    /// The number of measurements.
    pub fn repeat(&self) -> usize {
        self.repeat
    }

    /// The initial number of executions in each measurement.
    pub fn number(&self) -> usize {
        self.number
    }

    /// The minimum duration of a single measurement, in milliseconds.
    pub fn min_repeat_ms(&self) -> u64 {
        self.min_repeat_ms
    }

    /// Measure the execution time of a graph, with the inputs currently bound to it.
    pub fn evaluate<E: GraphExecutor>(&self, executor: &mut E) -> Result<ProfileResult> {
        self.evaluate_with(|number| {
            for _ in 0..number {
                executor.run()?;
            }
            executor.sync()
        })
    }

    /// Measure the execution time of an arbitrary workload.
    ///
    /// `run_batch` is called with the number of executions to perform, and must return only after all of them have
    /// finished.
    pub fn evaluate_with(&self, mut run_batch: impl FnMut(usize) -> Result<()>) -> Result<ProfileResult> {
        let min_repeat_ms = self.min_repeat_ms as f64;
        let mut number = self.number;
        let mut results = Vec::with_capacity(self.repeat);
        for _ in 0..self.repeat {
            let duration_ms = loop {
                let start = Instant::now();
                run_batch(number)?;
                let elapsed = start.elapsed().as_secs_f64() * 1e3;
                if elapsed >= min_repeat_ms {
                    break elapsed;
                }
                number = grow_number(number, elapsed, min_repeat_ms);
                log::debug!("batch took {elapsed:.3} ms, growing number to {number}");
            };
            results.push(duration_ms / 1e3 / number as f64);
        }
        Ok(ProfileResult { results })
    }
}
impl Default for TimeEvaluator {
    fn default() -> Self {
        Self {
            repeat: 3,
            number: 1,
            min_repeat_ms: 500,
        }
    }
}

fn grow_number(number: usize, duration_ms: f64, min_repeat_ms: f64) -> usize {
    let grown = number as f64 * GROWTH_FACTOR;
    let grown = if duration_ms > 0.0 {
        let per_run_ms = duration_ms / number as f64;
        f64::max(min_repeat_ms / per_run_ms + 1.0, grown)
    } else {
        // Below the clock resolution
        f64::max(number as f64 * 2.0, grown)
    };
    (grown.floor() as usize).max(number + 1)
}

/// The measurements of a [`TimeEvaluator`].
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileResult {
    results: Vec<f64>,
}
impl ProfileResult {
    /// Create a result from measurements in seconds per execution.
    pub fn new(results: Vec<f64>) -> Self {
        Self { results }
    }

    /// The measurements, in seconds per execution.
    pub fn results(&self) -> &[f64] {
        &self.results
    }

    /// The mean execution time in milliseconds.
    pub fn mean_ms(&self) -> f64 {
        if self.results.is_empty() {
            return 0.0;
        }
        self.results.iter().sum::<f64>() / self.results.len() as f64 * 1e3
    }

    /// The standard deviation of the execution time in milliseconds.
    pub fn std_ms(&self) -> f64 {
        if self.results.is_empty() {
            return 0.0;
        }
        let mean = self.mean_ms();
        let variance = self
            .results
            .iter()
            .map(|r| (r * 1e3 - mean).powi(2))
            .sum::<f64>()
            / self.results.len() as f64;
        variance.sqrt()
    }
}
impl fmt::Display for ProfileResult {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        write!(
            fmt,
            "Mean inference time (std dev): {:.2} ms ({:.2} ms)",
            self.mean_ms(),
            self.std_ms()
        )
    }
}
