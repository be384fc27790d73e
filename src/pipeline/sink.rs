//! Frame sinks
//!
//! A sink consumes one frame per quantum and produces the run's final
//! `RunResult` when finalized. Finalization consumes the sink, so a
//! second finalize is unrepresentable rather than a runtime error; the
//! scheduler still guards the terminal transition against duplicate
//! notifications on its own.

use std::path::PathBuf;

use log::debug;

use crate::error::{PipelineError, Result};
use crate::pipeline::frame::ChannelLayout;
use crate::pipeline::result::{RunOutput, RunResult};
use crate::pipeline::source::Produced;
use crate::session::codec::FileEncoder;
use crate::session::Session;

/// Output endpoint of a transfer pipeline
#[derive(Debug)]
pub enum Sink {
    Array(ArraySink),
    File(FileSink),
}

impl Sink {
    /// Consume the frame produced for the current quantum
    pub fn consume(&mut self, produced: &Produced) -> Result<()> {
        match self {
            Sink::Array(sink) => {
                sink.consume(produced);
                Ok(())
            }
            Sink::File(sink) => sink.consume(produced),
        }
    }

    /// Finalize the output and produce the run outcome
    ///
    /// For a file sink this flushes and closes the container; success
    /// mirrors the transcode status. For an array sink the filled
    /// arrays are handed back. The result always carries the sample
    /// rate and output identity, even on failure.
    pub fn finalize(self) -> RunResult {
        match self {
            Sink::Array(sink) => sink.finalize(),
            Sink::File(sink) => sink.finalize(),
        }
    }

    /// Produce a failure outcome for a run that never reached finalize
    ///
    /// Used when the session is torn down mid-run: the output identity
    /// is still reported so the caller can inspect the partial result,
    /// but no container flush is attempted.
    pub fn into_aborted_result(self) -> RunResult {
        match self {
            Sink::Array(sink) => RunResult::new(
                false,
                sink.sample_rate,
                RunOutput::Samples {
                    left: sink.left,
                    right: sink.right,
                },
            ),
            Sink::File(sink) => {
                let path = sink.encoder.path().to_path_buf();
                RunResult::new(false, sink.sample_rate, RunOutput::File(path))
            }
        }
    }
}

// ============================================================================
// Array Sink
// ============================================================================

/// Sink de-interleaving frames into channel arrays
///
/// Writes through a monotone cursor and stops early, without error,
/// once the destination arrays are full. Upstream overproduction (for
/// example the zero-padded terminal quantum) therefore cannot write
/// past the allocated length.
#[derive(Debug)]
pub struct ArraySink {
    sample_rate: u32,
    left: Vec<f32>,
    right: Option<Vec<f32>>,
    cursor: usize,
}

impl ArraySink {
    /// Create a sink filling the given pre-allocated channel arrays
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::ChannelLengthMismatch`] when `right` is
    /// present but its length differs from `left`. The drain loop walks
    /// both channels with a single cursor, so unequal lengths must be
    /// rejected here.
    pub fn new(session: &Session, left: Vec<f32>, right: Option<Vec<f32>>) -> Result<Self> {
        if let Some(right) = &right {
            if right.len() != left.len() {
                return Err(PipelineError::ChannelLengthMismatch {
                    left: left.len(),
                    right: right.len(),
                });
            }
        }

        Ok(Self {
            sample_rate: session.sample_rate(),
            left,
            right,
            cursor: 0,
        })
    }

    /// Create a sink with arrays sized for `len` samples per channel
    ///
    /// Allocates a right channel only for a stereo layout.
    pub fn with_len(session: &Session, len: usize, layout: ChannelLayout) -> Self {
        let right = layout.is_stereo().then(|| vec![0.0; len]);
        Self {
            sample_rate: session.sample_rate(),
            left: vec![0.0; len],
            right,
            cursor: 0,
        }
    }

    fn consume(&mut self, produced: &Produced) {
        let written =
            produced
                .frame
                .drain_into_channels(&mut self.left, self.right.as_deref_mut(), self.cursor);
        self.cursor += written;
    }

    /// Current write position in samples
    #[inline]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    fn finalize(self) -> RunResult {
        debug!("array sink finalized with {} samples written", self.cursor);
        RunResult::new(
            true,
            self.sample_rate,
            RunOutput::Samples {
                left: self.left,
                right: self.right,
            },
        )
    }
}

// ============================================================================
// File Sink
// ============================================================================

/// Sink forwarding frames to a codec encoder
///
/// Only the valid portion of each frame is written, so the terminal
/// quantum's zero padding never lands in the container and a read-back
/// recovers exactly the input length.
#[derive(Debug)]
pub struct FileSink {
    encoder: FileEncoder,
    sample_rate: u32,
}

impl FileSink {
    /// Wrap a created encoder as a frame sink
    pub fn new(encoder: FileEncoder) -> Self {
        let sample_rate = encoder.sample_rate();
        Self {
            encoder,
            sample_rate,
        }
    }

    fn consume(&mut self, produced: &Produced) -> Result<()> {
        let channels = produced.frame.layout().num_channels();
        let valid_interleaved = produced.valid * channels;
        self.encoder
            .write_interleaved(&produced.frame.samples()[..valid_interleaved])
    }

    fn finalize(self) -> RunResult {
        let sample_rate = self.sample_rate;
        let path: PathBuf = self.encoder.path().to_path_buf();

        let status = self.encoder.finalize();
        if !status.is_success() {
            debug!("encoder finalize failed for {}", path.display());
        }

        // Sample rate and output identity are reported regardless of
        // success so a failed output can still be diagnosed.
        RunResult::new(status.is_success(), sample_rate, RunOutput::File(path))
    }
}

// ============================================================================
// Tests
// ============================================================================
