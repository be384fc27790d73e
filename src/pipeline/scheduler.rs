//! Quantum scheduler
//!
//! Drives the transfer pipeline one quantum at a time through an
//! explicit state machine (`Idle → Running → Finalizing → Done`) and
//! sequences exactly-once finalization. The terminal condition can be
//! observed twice for the same run (the source's end-of-input signal
//! and the completed-quanta comparison both fire on the last quantum,
//! and stopped sessions have been seen to deliver further callbacks);
//! a completion flag ensures only the first notification executes the
//! transition and every later one is silently ignored.

use log::debug;

use crate::error::{PipelineError, Result};
use crate::pipeline::progress::ProgressTracker;
use crate::pipeline::result::RunResult;
use crate::pipeline::sink::Sink;
use crate::pipeline::source::Source;
use crate::session::Session;

/// Scheduler lifecycle states
///
/// `Done` is absorbing: no callback arriving afterwards can mutate the
/// resolved outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SchedulerState {
    /// Created, not yet running
    #[default]
    Idle,
    /// Session started, quanta in flight
    Running,
    /// Terminal condition observed, finalize in progress
    Finalizing,
    /// Outcome resolved
    Done,
}

/// Drives the per-quantum transfer cycle and guards finalization
#[derive(Debug)]
pub struct QuantumScheduler {
    session: Session,
    source: Source,
    sink: Option<Sink>,
    progress: ProgressTracker,
    state: SchedulerState,
    completion_begun: bool,
    outcome: Option<RunResult>,
}

impl QuantumScheduler {
    /// Assemble a scheduler over a session, source, and sink
    pub fn new(
        session: Session,
        source: Source,
        sink: Sink,
        progress: ProgressTracker,
    ) -> Self {
        Self {
            session,
            source,
            sink: Some(sink),
            progress,
            state: SchedulerState::Idle,
            completion_begun: false,
            outcome: None,
        }
    }

    /// Current lifecycle state
    #[inline]
    pub fn state(&self) -> SchedulerState {
        self.state
    }

    /// The session driving this scheduler
    #[inline]
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// The input endpoint
    #[inline]
    pub fn source(&self) -> &Source {
        &self.source
    }

    /// Run the transfer to completion and resolve the single outcome
    ///
    /// Consumes the scheduler, so a run can only happen once and the
    /// outcome is moved out exactly once. Blocks the calling thread;
    /// the quantum loop runs on this one logical thread with exactly
    /// one quantum in flight at a time.
    pub fn run(mut self) -> Result<RunResult> {
        self.completion_begun = false;
        self.progress.report_status("transferring audio");
        self.session.start();
        self.state = SchedulerState::Running;
        debug!(
            "run started: {} samples, {} quanta",
            self.source.len_in_samples(),
            self.source.len_in_quanta()
        );

        while self.state != SchedulerState::Done {
            let required = self.session.samples_per_quantum();
            self.tick(required)?;
        }

        self.outcome
            .take()
            .ok_or(PipelineError::IncompletePipeline {
                part: "run outcome",
            })
    }

    /// Process one quantum tick requesting `required_samples` per channel
    ///
    /// Idle and terminal states ignore ticks; a request for zero
    /// samples is a benign no-op. While running, one frame is moved
    /// from source to sink and progress is updated, then the terminal
    /// condition is checked through both detection paths.
    pub fn tick(&mut self, required_samples: usize) -> Result<()> {
        if self.state != SchedulerState::Running {
            debug!("tick ignored in state {:?}", self.state);
            return Ok(());
        }

        // An externally torn-down session is observed as an abrupt stop.
        if !self.session.is_running() {
            self.abort();
            return Ok(());
        }

        if required_samples == 0 {
            return Ok(());
        }

        let Some(produced) = self.source.next_frame(required_samples)? else {
            return Ok(());
        };
        let finished = produced.finished;

        if let Some(sink) = self.sink.as_mut() {
            sink.consume(&produced)?;
        }

        self.session.advance_quantum();
        self.progress
            .report(self.session.completed_quanta(), self.source.len_in_quanta());

        // Both terminal detections may fire for the same quantum; the
        // completion flag makes the second one a no-op.
        if finished {
            self.notify_input_ended();
        }
        if self.session.completed_quanta() >= self.source.len_in_quanta() {
            self.notify_input_ended();
        }

        Ok(())
    }

    /// Handle the source's end-of-input notification
    ///
    /// Executes the `Running → Finalizing → Done` sequence exactly
    /// once: stops the session, finalizes the sink, resets the
    /// reporters, and resolves the outcome. Duplicate notifications
    /// for the same terminal condition are silently ignored.
    pub fn notify_input_ended(&mut self) {
        if self.completion_begun {
            debug!("duplicate end-of-input notification ignored");
            return;
        }
        self.completion_begun = true;
        self.state = SchedulerState::Finalizing;

        self.session.stop();

        if let Some(sink) = self.sink.take() {
            self.outcome = Some(sink.finalize());
        }

        self.progress.finish();
        self.state = SchedulerState::Done;
        debug!(
            "run finalized after {} quanta",
            self.session.completed_quanta()
        );
    }

    /// Tear the run down without finalizing the output
    ///
    /// Used when the session stops before end-of-input is reached. The
    /// outcome resolves with `success = false` but still carries the
    /// output identity, and the pending run cannot deadlock.
    pub fn abort(&mut self) {
        if self.completion_begun {
            return;
        }
        self.completion_begun = true;

        self.session.stop();
        if let Some(sink) = self.sink.take() {
            self.outcome = Some(sink.into_aborted_result());
        }
        self.progress.finish();
        self.state = SchedulerState::Done;
        debug!("run aborted before finalize");
    }

    /// Take the resolved outcome, if the run has completed
    ///
    /// Only useful when the scheduler is driven tick-by-tick instead of
    /// through [`run`](Self::run).
    pub fn take_outcome(&mut self) -> Option<RunResult> {
        self.outcome.take()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::frame::ChannelLayout;
    use crate::pipeline::sink::ArraySink;
    use crate::pipeline::source::ArraySource;
    use std::sync::{Arc, Mutex};

    fn array_scheduler(input: Vec<f32>, output_len: usize) -> QuantumScheduler {
        // 100 samples per quantum
        let session = Session::new(10_000, ChannelLayout::Mono).unwrap();
        let source = Source::Array(ArraySource::new(&session, input, None).unwrap());
        let sink = Sink::Array(ArraySink::with_len(&session, output_len, ChannelLayout::Mono));
        QuantumScheduler::new(session, source, sink, ProgressTracker::new())
    }

    #[test]
    fn test_run_transfers_all_samples() {
        let input: Vec<f32> = (0..300).map(|i| i as f32 / 300.0).collect();
        let scheduler = array_scheduler(input.clone(), 300);

        let result = scheduler.run().unwrap();
        assert!(result.success());

        let (left, _) = result.into_samples().unwrap();
        assert_eq!(left, input);
    }

    #[test]
    fn test_run_with_partial_terminal_quantum() {
        // 250 samples over 100-sample quanta: last quantum is padded.
        let input: Vec<f32> = (0..250).map(|i| i as f32).collect();
        let scheduler = array_scheduler(input.clone(), 250);

        let result = scheduler.run().unwrap();
        let (left, _) = result.into_samples().unwrap();

        // Destination is bounded, so padding never lands in the output.
        assert_eq!(left, input);
    }

    #[test]
    fn test_states_progress_to_done() {
        let mut scheduler = array_scheduler(vec![0.0; 100], 100);
        assert_eq!(scheduler.state(), SchedulerState::Idle);

        // Ticks before run are ignored.
        scheduler.tick(100).unwrap();
        assert_eq!(scheduler.state(), SchedulerState::Idle);

        let result = scheduler.run().unwrap();
        assert!(result.success());
    }

    #[test]
    fn test_duplicate_terminal_notifications_finalize_once() {
        let mut scheduler = array_scheduler(vec![1.0; 100], 100);
        scheduler.session.start();
        scheduler.state = SchedulerState::Running;

        scheduler.tick(100).unwrap();
        assert_eq!(scheduler.state(), SchedulerState::Done);

        // Simulated repeated callbacks after stop.
        scheduler.notify_input_ended();
        scheduler.notify_input_ended();
        scheduler.notify_input_ended();

        // Exactly one outcome was resolved.
        let outcome = scheduler.take_outcome().unwrap();
        assert!(outcome.success());
        assert!(scheduler.take_outcome().is_none());
    }

    #[test]
    fn test_ticks_after_done_are_ignored() {
        let mut scheduler = array_scheduler(vec![1.0; 100], 100);
        scheduler.session.start();
        scheduler.state = SchedulerState::Running;

        scheduler.tick(100).unwrap();
        assert_eq!(scheduler.state(), SchedulerState::Done);

        // Further quantum callbacks must not disturb the outcome.
        scheduler.tick(100).unwrap();
        scheduler.tick(100).unwrap();

        let outcome = scheduler.take_outcome().unwrap();
        let (left, _) = outcome.into_samples().unwrap();
        assert_eq!(left, vec![1.0; 100]);
    }

    #[test]
    fn test_zero_sample_tick_is_benign() {
        let mut scheduler = array_scheduler(vec![1.0; 100], 100);
        scheduler.session.start();
        scheduler.state = SchedulerState::Running;

        scheduler.tick(0).unwrap();
        assert_eq!(scheduler.state(), SchedulerState::Running);
        assert_eq!(scheduler.session().completed_quanta(), 0);
    }

    #[test]
    fn test_abort_resolves_failure_outcome() {
        let mut scheduler = array_scheduler(vec![1.0; 300], 300);
        scheduler.session.start();
        scheduler.state = SchedulerState::Running;

        scheduler.tick(100).unwrap();
        assert_eq!(scheduler.state(), SchedulerState::Running);

        scheduler.abort();
        assert_eq!(scheduler.state(), SchedulerState::Done);

        let outcome = scheduler.take_outcome().unwrap();
        assert!(!outcome.success());
        // Partial output is still handed back for diagnostics.
        let (left, _) = outcome.into_samples().unwrap();
        assert_eq!(left.len(), 300);
    }

    #[test]
    fn test_externally_stopped_session_aborts_without_deadlock() {
        let mut scheduler = array_scheduler(vec![1.0; 300], 300);
        scheduler.session.start();
        scheduler.state = SchedulerState::Running;

        scheduler.tick(100).unwrap();
        scheduler.session.stop();

        // The next tick observes the stop and resolves a failure.
        scheduler.tick(100).unwrap();
        assert_eq!(scheduler.state(), SchedulerState::Done);
        assert!(!scheduler.take_outcome().unwrap().success());
    }

    #[test]
    fn test_progress_reported_and_reset() {
        let values = Arc::new(Mutex::new(Vec::new()));
        let sink_values = Arc::clone(&values);

        let session = Session::new(10_000, ChannelLayout::Mono).unwrap();
        let source = Source::Array(ArraySource::new(&session, vec![0.5; 2_000], None).unwrap());
        let sink = Sink::Array(ArraySink::with_len(&session, 2_000, ChannelLayout::Mono));
        let progress = ProgressTracker::with_sinks(
            Some(Box::new(move |p| sink_values.lock().unwrap().push(p))),
            None,
        );

        let scheduler = QuantumScheduler::new(session, source, sink, progress);
        scheduler.run().unwrap();

        let values = values.lock().unwrap();
        // 20 quanta: boundaries at 10 and 20, then the completion reset.
        assert_eq!(*values, vec![50.0, 100.0, 0.0]);
    }
}
