//! Offline audio session
//!
//! The session plays the role of the platform graph engine: it owns the
//! stream descriptor, the quantum size, the running flag, and the
//! completed-quantum counter that progress accounting is derived from.
//! It creates decoder and encoder nodes through the codec module.
//!
//! One quantum covers 10 ms of audio, so `samples_per_quantum` is
//! `sample_rate / 100`. Sources must read the value from the session
//! rather than recomputing it, so progress accounting can never drift
//! from the actual callback cadence.

pub mod codec;

use std::path::Path;

use log::debug;

use crate::error::{PipelineError, Result};
use crate::pipeline::frame::ChannelLayout;
use crate::session::codec::{FileDecoder, FileEncoder};

/// Negotiated stream parameters, fixed at session creation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamDescriptor {
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Channel configuration (mono or stereo)
    pub layout: ChannelLayout,
}

/// Offline rendering session
///
/// Drives the quantum clock for one transfer run. The session performs
/// no thread creation; the scheduler advances it one quantum at a time
/// from a single logical callback thread.
#[derive(Debug)]
pub struct Session {
    descriptor: StreamDescriptor,
    samples_per_quantum: usize,
    running: bool,
    completed_quanta: u64,
}

impl Session {
    /// Create a session for the given stream descriptor
    ///
    /// # Errors
    /// `SessionCreationFailed` if the sample rate cannot support a 10 ms
    /// quantum (below 100 Hz, including zero).
    pub fn new(sample_rate: u32, layout: ChannelLayout) -> Result<Self> {
        if sample_rate < 100 {
            return Err(PipelineError::SessionCreationFailed {
                reason: format!("sample rate {} Hz cannot support a 10 ms quantum", sample_rate),
            });
        }

        let samples_per_quantum = (sample_rate / 100) as usize;
        debug!(
            "session created: {} Hz, {:?}, {} samples per quantum",
            sample_rate, layout, samples_per_quantum
        );

        Ok(Self {
            descriptor: StreamDescriptor {
                sample_rate,
                layout,
            },
            samples_per_quantum,
            running: false,
            completed_quanta: 0,
        })
    }

    /// The stream descriptor this session was created with
    #[inline]
    pub fn descriptor(&self) -> StreamDescriptor {
        self.descriptor
    }

    /// Sample rate in Hz
    #[inline]
    pub fn sample_rate(&self) -> u32 {
        self.descriptor.sample_rate
    }

    /// Channel layout
    #[inline]
    pub fn layout(&self) -> ChannelLayout {
        self.descriptor.layout
    }

    /// Number of samples per channel in one quantum (10 ms)
    #[inline]
    pub fn samples_per_quantum(&self) -> usize {
        self.samples_per_quantum
    }

    /// Start the session clock
    pub fn start(&mut self) {
        debug!("session started");
        self.running = true;
    }

    /// Stop the session clock
    ///
    /// Stopping is idempotent; the scheduler guards its own terminal
    /// transition separately.
    pub fn stop(&mut self) {
        if self.running {
            debug!("session stopped after {} quanta", self.completed_quanta);
        }
        self.running = false;
    }

    /// Whether the session clock is running
    #[inline]
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Count of quanta completed since the session started
    #[inline]
    pub fn completed_quanta(&self) -> u64 {
        self.completed_quanta
    }

    /// Record one completed quantum
    pub fn advance_quantum(&mut self) {
        self.completed_quanta += 1;
    }

    /// Open a file decoder node for the given path
    ///
    /// The decoded stream reports its own sample rate and channel count,
    /// which a pipeline built from a file input inherits.
    pub fn open_file_decoder(&self, path: &Path) -> Result<FileDecoder> {
        FileDecoder::open(path)
    }

    /// Open a file encoder node writing at this session's descriptor
    pub fn open_file_encoder(&self, path: &Path) -> Result<FileEncoder> {
        FileEncoder::create(path, self.descriptor.sample_rate, self.descriptor.layout)
    }
}

// ============================================================================
// Tests
// ============================================================================
