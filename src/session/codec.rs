//! Codec nodes for file-backed endpoints
//!
//! Maps file extensions to container formats via the fixed table
//! `{.wav, .mp3, .wma}` and provides the decoder/encoder nodes the
//! session hands to file sources and sinks. The offline codec backend
//! implements WAV through `hound`; MP3 and WMA are recognized container
//! formats whose node creation reports `NodeCreationFailed`, since no
//! encoder for them ships with the offline backend.
//!
//! Decoded input is converted to f32 regardless of the stored bit
//! depth. Encoded output is written as 32-bit float WAV.

use std::fmt;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};

use crate::error::{PipelineError, Result};
use crate::pipeline::frame::ChannelLayout;

// ============================================================================
// Container Format
// ============================================================================

/// Audio container formats recognized by extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerFormat {
    Wav,
    Mp3,
    Wma,
}

impl ContainerFormat {
    /// Derive the container format from a file extension
    ///
    /// # Errors
    /// `UnsupportedFormat` for any extension outside the fixed table.
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase());

        match extension.as_deref() {
            Some("wav") => Ok(ContainerFormat::Wav),
            Some("mp3") => Ok(ContainerFormat::Mp3),
            Some("wma") => Ok(ContainerFormat::Wma),
            Some(other) => Err(PipelineError::UnsupportedFormat {
                format: format!(".{}", other),
            }),
            None => Err(PipelineError::UnsupportedFormat {
                format: "(no extension)".to_string(),
            }),
        }
    }
}

impl fmt::Display for ContainerFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContainerFormat::Wav => write!(f, "WAV"),
            ContainerFormat::Mp3 => write!(f, "MP3"),
            ContainerFormat::Wma => write!(f, "WMA"),
        }
    }
}

// ============================================================================
// Transcode Status
// ============================================================================

/// Outcome of encoder finalization
///
/// A failed finalize is captured here and surfaced through the
/// RunResult rather than raised, because a partial file already exists
/// on disk and the caller must be able to inspect it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranscodeStatus {
    /// Container was flushed and closed cleanly
    Success,
    /// Finalization failed; the output file may be incomplete
    Failed { reason: String },
}

impl TranscodeStatus {
    /// Whether the transcode completed without failure
    #[inline]
    pub fn is_success(&self) -> bool {
        matches!(self, TranscodeStatus::Success)
    }
}

// ============================================================================
// File Decoder
// ============================================================================

/// Decoder node producing f32 PCM from a container file
pub struct FileDecoder {
    reader: WavReader<BufReader<File>>,
    sample_rate: u32,
    layout: ChannelLayout,
    bits_per_sample: u16,
    sample_format: SampleFormat,
    frames_per_channel: u64,
}

impl fmt::Debug for FileDecoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileDecoder")
            .field("sample_rate", &self.sample_rate)
            .field("layout", &self.layout)
            .field("bits_per_sample", &self.bits_per_sample)
            .field("frames_per_channel", &self.frames_per_channel)
            .finish()
    }
}

impl FileDecoder {
    /// Open a decoder for the given file
    ///
    /// # Errors
    /// * `UnsupportedFormat` - extension outside the container table
    /// * `NodeCreationFailed` - container recognized but not decodable
    ///   by the offline backend, or the file cannot be opened
    /// * `UnsupportedChannelCount` - more than two channels
    pub fn open(path: &Path) -> Result<Self> {
        let format = ContainerFormat::from_path(path)?;

        if format != ContainerFormat::Wav {
            return Err(PipelineError::NodeCreationFailed {
                node: "decoder".to_string(),
                reason: format!("{} decoding is not available in the offline codec", format),
                source: None,
            });
        }

        let reader = WavReader::open(path).map_err(|e| PipelineError::NodeCreationFailed {
            node: "decoder".to_string(),
            reason: format!("failed to open {}", path.display()),
            source: Some(Box::new(e)),
        })?;

        let spec = reader.spec();
        let layout = ChannelLayout::from_count(spec.channels as usize)?;
        let frames_per_channel = reader.duration() as u64;

        Ok(Self {
            reader,
            sample_rate: spec.sample_rate,
            layout,
            bits_per_sample: spec.bits_per_sample,
            sample_format: spec.sample_format,
            frames_per_channel,
        })
    }

    /// Sample rate of the decoded stream in Hz
    #[inline]
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Channel layout of the decoded stream
    #[inline]
    pub fn layout(&self) -> ChannelLayout {
        self.layout
    }

    /// Duration of the decoded stream in seconds
    pub fn duration_secs(&self) -> f64 {
        self.frames_per_channel as f64 / self.sample_rate as f64
    }

    /// Total decoded length in samples per channel
    ///
    /// Taken from the container's own frame count, which is already
    /// sample-accurate; deriving it back from `duration_secs` would
    /// round-trip an exact integer through f64 and can gain a phantom
    /// sample.
    pub fn len_in_samples(&self) -> u64 {
        self.frames_per_channel
    }

    /// Decode up to `out.len()` interleaved samples into `out`
    ///
    /// Returns the number of interleaved samples actually decoded; a
    /// count below `out.len()` means the file is exhausted. Remaining
    /// slots in `out` are untouched.
    pub fn read_interleaved(&mut self, out: &mut [f32]) -> Result<usize> {
        match (self.sample_format, self.bits_per_sample) {
            (SampleFormat::Float, 32) => fill_converted(self.reader.samples::<f32>(), out, |v| v),
            (SampleFormat::Int, 8) => {
                fill_converted(self.reader.samples::<i8>(), out, |v| v as f32 / 128.0)
            }
            (SampleFormat::Int, 16) => {
                fill_converted(self.reader.samples::<i16>(), out, |v| v as f32 / 32768.0)
            }
            (SampleFormat::Int, 24) => {
                // 24-bit is stored as i32 in hound
                fill_converted(self.reader.samples::<i32>(), out, |v| v as f32 / 8388608.0)
            }
            (SampleFormat::Int, 32) => {
                fill_converted(self.reader.samples::<i32>(), out, |v| {
                    v as f32 / 2147483648.0
                })
            }
            (_, bits) => Err(PipelineError::UnsupportedFormat {
                format: format!("{}-bit {:?} WAV", bits, self.sample_format),
            }),
        }
    }
}

/// Pull samples from a hound iterator, convert to f32, and store in `out`
fn fill_converted<S, F>(
    samples: impl Iterator<Item = hound::Result<S>>,
    out: &mut [f32],
    convert: F,
) -> Result<usize>
where
    F: Fn(S) -> f32,
{
    let mut count = 0;
    for (slot, sample) in out.iter_mut().zip(samples) {
        let sample = sample.map_err(|e| PipelineError::InvalidAudio {
            reason: format!("failed to decode sample {}", count),
            source: Some(Box::new(e)),
        })?;
        *slot = convert(sample);
        count += 1;
    }
    Ok(count)
}

// ============================================================================
// File Encoder
// ============================================================================

/// Encoder node writing f32 PCM into a container file
pub struct FileEncoder {
    writer: WavWriter<std::io::BufWriter<File>>,
    path: PathBuf,
    sample_rate: u32,
    layout: ChannelLayout,
}

impl fmt::Debug for FileEncoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileEncoder")
            .field("path", &self.path)
            .field("sample_rate", &self.sample_rate)
            .field("layout", &self.layout)
            .finish()
    }
}

impl FileEncoder {
    /// Create an encoder for the given file, sample rate, and layout
    ///
    /// # Errors
    /// * `UnsupportedFormat` - extension outside the container table
    /// * `NodeCreationFailed` - container recognized but not encodable
    ///   by the offline backend, or the file cannot be created
    pub fn create(path: &Path, sample_rate: u32, layout: ChannelLayout) -> Result<Self> {
        let format = ContainerFormat::from_path(path)?;

        if format != ContainerFormat::Wav {
            return Err(PipelineError::NodeCreationFailed {
                node: "encoder".to_string(),
                reason: format!("{} encoding is not available in the offline codec", format),
                source: None,
            });
        }

        let spec = WavSpec {
            channels: layout.num_channels() as u16,
            sample_rate,
            bits_per_sample: 32,
            sample_format: SampleFormat::Float,
        };

        let writer = WavWriter::create(path, spec).map_err(|e| {
            PipelineError::NodeCreationFailed {
                node: "encoder".to_string(),
                reason: format!("failed to create {}", path.display()),
                source: Some(Box::new(e)),
            }
        })?;

        Ok(Self {
            writer,
            path: path.to_path_buf(),
            sample_rate,
            layout,
        })
    }

    /// Destination path of this encoder
    #[inline]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Sample rate the container is written at
    #[inline]
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Channel layout the container is written at
    #[inline]
    pub fn layout(&self) -> ChannelLayout {
        self.layout
    }

    /// Append interleaved samples to the container
    pub fn write_interleaved(&mut self, samples: &[f32]) -> Result<()> {
        for &sample in samples {
            self.writer.write_sample(sample).map_err(|e| {
                PipelineError::Io(std::io::Error::new(
                    std::io::ErrorKind::Other,
                    e.to_string(),
                ))
            })?;
        }
        Ok(())
    }

    /// Flush and close the container
    ///
    /// Failure is reported in the status, not raised: a partial file is
    /// already on disk and the caller receives its identity regardless.
    pub fn finalize(self) -> TranscodeStatus {
        match self.writer.finalize() {
            Ok(()) => TranscodeStatus::Success,
            Err(e) => TranscodeStatus::Failed {
                reason: e.to_string(),
            },
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
