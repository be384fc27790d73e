//! Throttled progress reporting
//!
//! Derives a percentage from quantum counters and forwards it to a
//! caller-supplied closure, emitting only on every tenth completed
//! quantum so the reporting rate is bounded independent of quantum
//! size. A final reset of 0 (and an empty status) is emitted when the
//! run completes, regardless of the last reported value.

/// Callback receiving progress percentages (0.0 ..= 100.0, then a final 0.0)
pub type ProgressFn = Box<dyn FnMut(f64) + Send>;

/// Callback receiving human-readable status lines (empty string on reset)
pub type StatusFn = Box<dyn FnMut(&str) + Send>;

/// Emit progress only on every Nth completed quantum
const THROTTLE_INTERVAL: u64 = 10;

/// Tracks and throttles transfer progress
///
/// Reported percentages are monotone non-decreasing across one run
/// because both counters only grow; the tracker additionally refuses to
/// emit twice for the same throttle boundary.
#[derive(Default)]
pub struct ProgressTracker {
    progress: Option<ProgressFn>,
    status: Option<StatusFn>,
    last_boundary: Option<u64>,
}

impl std::fmt::Debug for ProgressTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressTracker")
            .field("has_progress", &self.progress.is_some())
            .field("has_status", &self.status.is_some())
            .field("last_boundary", &self.last_boundary)
            .finish()
    }
}

impl ProgressTracker {
    /// Create a tracker with no sinks attached (all reports dropped)
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a tracker forwarding to the given sinks
    pub fn with_sinks(progress: Option<ProgressFn>, status: Option<StatusFn>) -> Self {
        Self {
            progress,
            status,
            last_boundary: None,
        }
    }

    /// Report completion of `completed` out of `total` quanta
    ///
    /// Emits `100 * completed / total`, at most once per throttle
    /// boundary (`completed % 10 == 0`). Off-boundary counts and runs
    /// with an unknown total are silently skipped.
    pub fn report(&mut self, completed: u64, total: u64) {
        if total == 0 || completed % THROTTLE_INTERVAL != 0 {
            return;
        }
        if self.last_boundary == Some(completed) {
            return;
        }
        self.last_boundary = Some(completed);

        if let Some(progress) = self.progress.as_mut() {
            progress(100.0 * completed as f64 / total as f64);
        }
    }

    /// Report a status line
    pub fn report_status(&mut self, status: &str) {
        if let Some(sink) = self.status.as_mut() {
            sink(status);
        }
    }

    /// Reset both reporters to their empty state after completion
    ///
    /// Always emits a progress of 0 and an empty status, regardless of
    /// the last reported value.
    pub fn finish(&mut self) {
        if let Some(status) = self.status.as_mut() {
            status("");
        }
        if let Some(progress) = self.progress.as_mut() {
            progress(0.0);
        }
        self.last_boundary = None;
    }
}

// ============================================================================
// Tests
// ============================================================================
