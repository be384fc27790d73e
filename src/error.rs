//! Error handling for pcmflow
//!
//! Construction-time failures (session, decoder/encoder nodes) are fatal
//! and propagate synchronously. Run-time transcode failures are captured
//! in the `RunResult` instead, because the pipeline has already committed
//! side effects the caller must inspect.

use thiserror::Error;

/// Result type alias for pcmflow operations
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Main error type for pcmflow operations
#[derive(Error, Debug)]
pub enum PipelineError {
    // Construction errors
    #[error("Unsupported container format: {format}")]
    UnsupportedFormat { format: String },

    #[error("Session creation failed: {reason}")]
    SessionCreationFailed { reason: String },

    #[error("Failed to create {node} node: {reason}")]
    NodeCreationFailed {
        node: String,
        reason: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    // Stream descriptor errors
    #[error("Channel length mismatch: left has {left} samples, right has {right}")]
    ChannelLengthMismatch { left: usize, right: usize },

    #[error("Unsupported channel count: {channels} (only mono/stereo supported)")]
    UnsupportedChannelCount { channels: usize },

    // Decode errors
    #[error("Invalid audio stream: {reason}")]
    InvalidAudio {
        reason: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    // Builder errors
    #[error("Pipeline is missing {part}")]
    IncompletePipeline { part: &'static str },

    // I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl PipelineError {
    /// Get the error code for this error type
    pub fn error_code(&self) -> &'static str {
        match self {
            PipelineError::UnsupportedFormat { .. } => "UNSUPPORTED_FORMAT",
            PipelineError::SessionCreationFailed { .. } => "SESSION_CREATION_FAILED",
            PipelineError::NodeCreationFailed { .. } => "NODE_CREATION_FAILED",
            PipelineError::ChannelLengthMismatch { .. } => "CHANNEL_LENGTH_MISMATCH",
            PipelineError::UnsupportedChannelCount { .. } => "UNSUPPORTED_CHANNEL_COUNT",
            PipelineError::InvalidAudio { .. } => "INVALID_AUDIO",
            PipelineError::IncompletePipeline { .. } => "INCOMPLETE_PIPELINE",
            PipelineError::Io(_) => "IO_ERROR",
        }
    }

    /// Check if this error occurs before any source/sink is built
    ///
    /// Construction errors are safe to retry with different settings.
    /// `Io` and `InvalidAudio` are excluded: both can surface mid-run,
    /// after the pipeline has committed side effects.
    pub fn is_construction_error(&self) -> bool {
        !matches!(
            self,
            PipelineError::Io(_) | PipelineError::InvalidAudio { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err = PipelineError::UnsupportedFormat {
            format: ".ogg".to_string(),
        };
        assert_eq!(err.error_code(), "UNSUPPORTED_FORMAT");

        let err = PipelineError::SessionCreationFailed {
            reason: "sample rate is zero".to_string(),
        };
        assert_eq!(err.error_code(), "SESSION_CREATION_FAILED");
    }

    #[test]
    fn test_construction_error_classification() {
        let err = PipelineError::NodeCreationFailed {
            node: "encoder".to_string(),
            reason: "codec unavailable".to_string(),
            source: None,
        };
        assert!(err.is_construction_error());

        let err = PipelineError::Io(std::io::Error::new(
            std::io::ErrorKind::BrokenPipe,
            "pipe closed",
        ));
        assert!(!err.is_construction_error());

        // Raised while decoding samples mid-run, not while wiring nodes.
        let err = PipelineError::InvalidAudio {
            reason: "corrupt sample block".to_string(),
            source: None,
        };
        assert!(!err.is_construction_error());
    }

    #[test]
    fn test_display_includes_detail() {
        let err = PipelineError::ChannelLengthMismatch {
            left: 100,
            right: 99,
        };
        let message = err.to_string();
        assert!(message.contains("100"));
        assert!(message.contains("99"));
    }
}
