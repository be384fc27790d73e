//! Quantum transfer pipeline
//!
//! Core of the crate:
//! - Frame buffers and interleave math
//! - Source and sink endpoint variants
//! - The quantum scheduler state machine
//! - Progress tracking and the run outcome record

pub mod frame;
pub mod progress;
pub mod result;
pub mod scheduler;
pub mod sink;
pub mod source;

pub use frame::{ChannelLayout, Frame};
pub use progress::{ProgressFn, ProgressTracker, StatusFn};
pub use result::{RunOutput, RunResult};
pub use scheduler::{QuantumScheduler, SchedulerState};
pub use sink::{ArraySink, FileSink, Sink};
pub use source::{ArraySource, FileSource, Produced, Source};
