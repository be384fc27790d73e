//! pcmflow - Quantum-driven PCM transfer pipeline
//!
//! Moves PCM audio between two endpoints (an audio file or in-memory
//! sample arrays) through a fixed-size quantum callback loop,
//! converting between mono/stereo interleaved buffers and per-channel
//! sample arrays.
//!
//! # Architecture
//!
//! - `pipeline` - the quantum transfer core: frames and interleave
//!   math, source/sink variants, the scheduler state machine, progress
//!   tracking, and the run outcome record
//! - `session` - the offline session collaborator: quantum clock,
//!   stream descriptor, and hound-backed WAV codec nodes
//! - `builder` - fluent assembly of a pipeline from endpoints
//!
//! # Example
//!
//! ```no_run
//! use pcmflow::PipelineBuilder;
//!
//! let saw: Vec<f32> = (0..44_100).map(|i| (i % 100) as f32 / 50.0 - 1.0).collect();
//!
//! let result = PipelineBuilder::new()
//!     .sample_rate(44_100)
//!     .from_samples(saw, None)
//!     .to_file("saw.wav")
//!     .build()
//!     .unwrap()
//!     .run()
//!     .unwrap();
//!
//! assert!(result.success());
//! ```

pub mod builder;
pub mod error;
pub mod pipeline;
pub mod session;

pub use builder::PipelineBuilder;
pub use error::{PipelineError, Result};
pub use pipeline::{
    ChannelLayout, Frame, ProgressTracker, QuantumScheduler, RunOutput, RunResult, SchedulerState,
    Sink, Source,
};
pub use session::codec::{ContainerFormat, TranscodeStatus};
pub use session::{Session, StreamDescriptor};
