//! Frame sources
//!
//! A source produces one interleaved `Frame` per quantum on demand and
//! reports when its input is exhausted. Two variants exist: an
//! in-memory channel-array source and a file-backed source fed by a
//! codec decoder. Dispatch is by enum, not trait objects.

use crate::error::{PipelineError, Result};
use crate::pipeline::frame::{ChannelLayout, Frame};
use crate::session::codec::FileDecoder;
use crate::session::Session;

/// A frame produced for one quantum
///
/// `valid` counts the real (non-padding) samples per channel; it equals
/// the frame capacity except possibly on the terminal quantum. The
/// frame buffer itself is always full-sized, with zeros past `valid`.
#[derive(Debug)]
pub struct Produced {
    pub frame: Frame,
    pub valid: usize,
    pub finished: bool,
}

/// Input endpoint of a transfer pipeline
#[derive(Debug)]
pub enum Source {
    Array(ArraySource),
    File(FileSource),
}

impl Source {
    /// Produce the next frame of `required_samples` per channel
    ///
    /// A request for zero samples is a benign no-op: no cursor advance,
    /// no allocation, `None` returned.
    pub fn next_frame(&mut self, required_samples: usize) -> Result<Option<Produced>> {
        if required_samples == 0 {
            return Ok(None);
        }
        match self {
            Source::Array(source) => Ok(Some(source.next_frame(required_samples))),
            Source::File(source) => source.next_frame(required_samples).map(Some),
        }
    }

    /// Total input length in samples per channel
    pub fn len_in_samples(&self) -> u64 {
        match self {
            Source::Array(source) => source.len_in_samples(),
            Source::File(source) => source.len_in_samples(),
        }
    }

    /// Total input length in quanta
    ///
    /// Always `ceil(len_in_samples / samples_per_quantum)`, computed
    /// from the sample-accurate length so progress accounting does not
    /// depend on how many callbacks actually arrive.
    pub fn len_in_quanta(&self) -> u64 {
        match self {
            Source::Array(source) => source.len_in_quanta(),
            Source::File(source) => source.len_in_quanta(),
        }
    }

    /// Channel layout of the produced frames
    pub fn layout(&self) -> ChannelLayout {
        match self {
            Source::Array(source) => source.layout,
            Source::File(source) => source.layout,
        }
    }
}

fn quanta_for(len_in_samples: u64, samples_per_quantum: usize) -> u64 {
    // Integer ceiling division; exact counts never pass through f64.
    let quantum = samples_per_quantum as u64;
    (len_in_samples + quantum - 1) / quantum
}

// ============================================================================
// Array Source
// ============================================================================

/// Source reading from caller-supplied channel arrays
///
/// Copies samples from `left`/`right` into interleaved frame slots
/// through a monotone cursor. The final frame keeps its full requested
/// size; slots past the array end are zero-filled, which is what makes
/// a "shorter last frame" without ever producing a short buffer.
#[derive(Debug)]
pub struct ArraySource {
    layout: ChannelLayout,
    left: Vec<f32>,
    right: Option<Vec<f32>>,
    cursor: usize,
    samples_per_quantum: usize,
}

impl ArraySource {
    /// Create an array source over the given channel data
    ///
    /// The layout is mono when `right` is absent, stereo otherwise.
    /// Quantum size is taken from the session, never recomputed.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::ChannelLengthMismatch`] when `right` is
    /// present but its length differs from `left`. The copy loops walk
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

        let layout = if right.is_some() {
            ChannelLayout::Stereo
        } else {
            ChannelLayout::Mono
        };

        Ok(Self {
            layout,
            left,
            right,
            cursor: 0,
            samples_per_quantum: session.samples_per_quantum(),
        })
    }

    fn next_frame(&mut self, required_samples: usize) -> Produced {
        let mut frame = Frame::silent(required_samples, self.layout);
        let copied = frame.fill_from_channels(&self.left, self.right.as_deref(), self.cursor);
        self.cursor += copied;

        Produced {
            frame,
            valid: copied,
            finished: self.cursor >= self.left.len(),
        }
    }

    /// Current read position in samples
    #[inline]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    fn len_in_samples(&self) -> u64 {
        self.left.len() as u64
    }

    fn len_in_quanta(&self) -> u64 {
        quanta_for(self.len_in_samples(), self.samples_per_quantum)
    }
}

// ============================================================================
// File Source
// ============================================================================

/// Source fed by a codec decoder
#[derive(Debug)]
pub struct FileSource {
    decoder: FileDecoder,
    layout: ChannelLayout,
    len_in_samples: u64,
    samples_per_quantum: usize,
    exhausted: bool,
}

impl FileSource {
    /// Wrap an opened decoder as a frame source
    pub fn new(session: &Session, decoder: FileDecoder) -> Self {
        let layout = decoder.layout();
        let len_in_samples = decoder.len_in_samples();

        Self {
            decoder,
            layout,
            len_in_samples,
            samples_per_quantum: session.samples_per_quantum(),
            exhausted: false,
        }
    }

    fn next_frame(&mut self, required_samples: usize) -> Result<Produced> {
        let mut frame = Frame::silent(required_samples, self.layout);
        let channels = self.layout.num_channels();

        let decoded = self.decoder.read_interleaved(frame.samples_mut())?;
        let valid = decoded / channels;

        if decoded < required_samples * channels {
            self.exhausted = true;
        }

        Ok(Produced {
            frame,
            valid,
            finished: self.exhausted,
        })
    }

    fn len_in_samples(&self) -> u64 {
        self.len_in_samples
    }

    fn len_in_quanta(&self) -> u64 {
        quanta_for(self.len_in_samples, self.samples_per_quantum)
    }
}

// ============================================================================
// Tests
// ============================================================================
