//! Run outcome record
//!
//! Produced exactly once per run by the scheduler's finalize step.
//! Immutable after creation; carries exactly one output modality.

use std::path::{Path, PathBuf};

/// The output side of a completed run
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutput {
    /// Filled channel arrays (`right` is absent for mono)
    Samples {
        left: Vec<f32>,
        right: Option<Vec<f32>>,
    },
    /// Path of the written output file
    File(PathBuf),
}

/// Immutable outcome of one transfer run
#[derive(Debug, Clone, PartialEq)]
pub struct RunResult {
    success: bool,
    sample_rate: u32,
    output: RunOutput,
}

impl RunResult {
    /// Create a run result (called once, by the finalize step)
    pub fn new(success: bool, sample_rate: u32, output: RunOutput) -> Self {
        Self {
            success,
            sample_rate,
            output,
        }
    }

    /// Whether the run completed without transcode failure
    #[inline]
    pub fn success(&self) -> bool {
        self.success
    }

    /// Sample rate of the produced output in Hz
    ///
    /// Reported even when the run failed, for diagnostics.
    #[inline]
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// The produced output
    #[inline]
    pub fn output(&self) -> &RunOutput {
        &self.output
    }

    /// The output file path, if the run wrote a file
    pub fn output_path(&self) -> Option<&Path> {
        match &self.output {
            RunOutput::File(path) => Some(path.as_path()),
            RunOutput::Samples { .. } => None,
        }
    }

    /// Take ownership of the filled channel arrays, if the run produced
    /// samples
    pub fn into_samples(self) -> Option<(Vec<f32>, Option<Vec<f32>>)> {
        match self.output {
            RunOutput::Samples { left, right } => Some((left, right)),
            RunOutput::File(_) => None,
        }
    }
}
