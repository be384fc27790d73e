//! Fluent pipeline assembly
//!
//! Mirrors the order a caller thinks in: where the audio comes from,
//! where it goes, and how to hear about progress. `build()` creates the
//! session first (construction failures surface before any endpoint
//! exists), then the source, then the sink.
//!
//! When no output is given, destination arrays are allocated to the
//! source length, stereo only if the input is stereo. When the input is
//! a file, sample rate and channel count are inherited from the decoded
//! stream and any explicitly configured values are ignored.

use std::path::{Path, PathBuf};

use log::{debug, warn};

use crate::error::{PipelineError, Result};
use crate::pipeline::frame::ChannelLayout;
use crate::pipeline::progress::{ProgressFn, ProgressTracker, StatusFn};
use crate::pipeline::scheduler::QuantumScheduler;
use crate::pipeline::sink::{ArraySink, FileSink, Sink};
use crate::pipeline::source::{ArraySource, FileSource, Source};
use crate::session::Session;

#[derive(Debug)]
enum InputSpec {
    File(PathBuf),
    Samples {
        left: Vec<f32>,
        right: Option<Vec<f32>>,
    },
}

#[derive(Debug)]
enum OutputSpec {
    File(PathBuf),
    Samples {
        left: Vec<f32>,
        right: Option<Vec<f32>>,
    },
}

/// Builder assembling a transfer pipeline
///
/// # Example
/// ```no_run
/// use pcmflow::PipelineBuilder;
///
/// let samples = vec![0.0f32; 44_100];
/// let result = PipelineBuilder::new()
///     .sample_rate(44_100)
///     .from_samples(samples, None)
///     .to_file("out.wav")
///     .build()
///     .unwrap()
///     .run()
///     .unwrap();
/// assert!(result.success());
/// ```
#[derive(Default)]
pub struct PipelineBuilder {
    sample_rate: Option<u32>,
    stereo: Option<bool>,
    input: Option<InputSpec>,
    output: Option<OutputSpec>,
    progress: Option<ProgressFn>,
    status: Option<StatusFn>,
}

impl std::fmt::Debug for PipelineBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineBuilder")
            .field("sample_rate", &self.sample_rate)
            .field("stereo", &self.stereo)
            .field("input", &self.input)
            .field("output", &self.output)
            .finish()
    }
}

impl PipelineBuilder {
    /// Create an empty builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the sample rate in Hz (ignored when the input is a file)
    pub fn sample_rate(mut self, sample_rate: u32) -> Self {
        self.sample_rate = Some(sample_rate);
        self
    }

    /// Set the channel count (1 or 2; ignored when the input is a file)
    pub fn channels(mut self, channels: u32) -> Self {
        self.stereo = Some(channels == 2);
        self
    }

    /// Attach progress and status reporters
    pub fn report(mut self, progress: ProgressFn, status: StatusFn) -> Self {
        self.progress = Some(progress);
        self.status = Some(status);
        self
    }

    /// Read input from an audio file
    pub fn from_file(mut self, path: impl AsRef<Path>) -> Self {
        self.input = Some(InputSpec::File(path.as_ref().to_path_buf()));
        self
    }

    /// Read input from in-memory channel arrays (`right` absent ⇔ mono)
    pub fn from_samples(mut self, left: Vec<f32>, right: Option<Vec<f32>>) -> Self {
        self.input = Some(InputSpec::Samples { left, right });
        self
    }

    /// Write output to an audio file
    pub fn to_file(mut self, path: impl AsRef<Path>) -> Self {
        self.output = Some(OutputSpec::File(path.as_ref().to_path_buf()));
        self
    }

    /// Write output into caller-allocated channel arrays
    pub fn to_samples(mut self, left: Vec<f32>, right: Option<Vec<f32>>) -> Self {
        self.output = Some(OutputSpec::Samples { left, right });
        self
    }

    /// Assemble the scheduler
    ///
    /// # Errors
    /// * `IncompletePipeline` - no input configured, or no sample rate
    ///   for an array input
    /// * `ChannelLengthMismatch` - stereo arrays of unequal length
    /// * `SessionCreationFailed`, `UnsupportedFormat`,
    ///   `NodeCreationFailed` - from session/codec construction
    pub fn build(self) -> Result<QuantumScheduler> {
        let input = self
            .input
            .ok_or(PipelineError::IncompletePipeline { part: "an input" })?;

        // A file input negotiates the descriptor; arrays use the
        // configured values.
        let (session, source) = match input {
            InputSpec::File(path) => {
                let decoder = crate::session::codec::FileDecoder::open(&path)?;
                let session = Session::new(decoder.sample_rate(), decoder.layout())?;
                let source = Source::File(FileSource::new(&session, decoder));
                debug!(
                    "file input {}: {} Hz, {:?}",
                    path.display(),
                    session.sample_rate(),
                    session.layout()
                );
                (session, source)
            }
            InputSpec::Samples { left, right } => {
                if self.stereo == Some(true) && right.is_none() {
                    // A missing right buffer must never be read; the
                    // run degrades to mono instead.
                    warn!("stereo requested without a right channel, producing mono");
                }

                let sample_rate =
                    self.sample_rate
                        .ok_or(PipelineError::IncompletePipeline {
                            part: "a sample rate for the array input",
                        })?;
                let layout = if right.is_some() {
                    ChannelLayout::Stereo
                } else {
                    ChannelLayout::Mono
                };

                let session = Session::new(sample_rate, layout)?;
                let source = Source::Array(ArraySource::new(&session, left, right)?);
                (session, source)
            }
        };

        let sink = match self.output {
            Some(OutputSpec::File(path)) => {
                let encoder = session.open_file_encoder(&path)?;
                Sink::File(FileSink::new(encoder))
            }
            Some(OutputSpec::Samples { left, right }) => {
                Sink::Array(ArraySink::new(&session, left, right)?)
            }
            None => {
                // Default output: arrays sized from the input.
                let len = source.len_in_samples() as usize;
                Sink::Array(ArraySink::with_len(&session, len, session.layout()))
            }
        };

        let progress = ProgressTracker::with_sinks(self.progress, self.status);
        Ok(QuantumScheduler::new(session, source, sink, progress))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_input_rejected() {
        let err = PipelineBuilder::new().sample_rate(44_100).build().unwrap_err();
        assert_eq!(err.error_code(), "INCOMPLETE_PIPELINE");
    }

    #[test]
    fn test_array_input_requires_sample_rate() {
        let err = PipelineBuilder::new()
            .from_samples(vec![0.0; 100], None)
            .build()
            .unwrap_err();
        assert_eq!(err.error_code(), "INCOMPLETE_PIPELINE");
    }

    #[test]
    fn test_unequal_stereo_arrays_rejected() {
        let err = PipelineBuilder::new()
            .sample_rate(44_100)
            .from_samples(vec![0.0; 100], Some(vec![0.0; 99]))
            .build()
            .unwrap_err();
        assert_eq!(err.error_code(), "CHANNEL_LENGTH_MISMATCH");
    }

    #[test]
    fn test_unequal_stereo_output_arrays_rejected() {
        let err = PipelineBuilder::new()
            .sample_rate(44_100)
            .from_samples(vec![0.0; 100], Some(vec![0.0; 100]))
            .to_samples(vec![0.0; 100], Some(vec![0.0; 60]))
            .build()
            .unwrap_err();
        assert_eq!(err.error_code(), "CHANNEL_LENGTH_MISMATCH");
    }

    #[test]
    fn test_default_output_sized_from_input() {
        let scheduler = PipelineBuilder::new()
            .sample_rate(10_000)
            .from_samples(vec![0.25; 350], None)
            .build()
            .unwrap();

        let result = scheduler.run().unwrap();
        assert!(result.success());

        let (left, right) = result.into_samples().unwrap();
        assert_eq!(left.len(), 350);
        assert!(right.is_none());
        assert!(left.iter().all(|&s| s == 0.25));
    }

    #[test]
    fn test_default_output_is_stereo_for_stereo_input() {
        let scheduler = PipelineBuilder::new()
            .sample_rate(10_000)
            .from_samples(vec![0.1; 200], Some(vec![0.2; 200]))
            .build()
            .unwrap();

        let (left, right) = scheduler.run().unwrap().into_samples().unwrap();
        assert_eq!(left, vec![0.1; 200]);
        assert_eq!(right.unwrap(), vec![0.2; 200]);
    }

    #[test]
    fn test_stereo_flag_without_right_degrades_to_mono() {
        let scheduler = PipelineBuilder::new()
            .sample_rate(10_000)
            .channels(2)
            .from_samples(vec![0.5; 150], None)
            .build()
            .unwrap();

        assert_eq!(scheduler.source().layout(), ChannelLayout::Mono);

        let (left, right) = scheduler.run().unwrap().into_samples().unwrap();
        assert_eq!(left.len(), 150);
        assert!(right.is_none());
    }

    #[test]
    fn test_unsupported_output_extension_fails_at_build() {
        let err = PipelineBuilder::new()
            .sample_rate(44_100)
            .from_samples(vec![0.0; 100], None)
            .to_file("/tmp/out.flac")
            .build()
            .unwrap_err();
        assert_eq!(err.error_code(), "UNSUPPORTED_FORMAT");
    }
}
