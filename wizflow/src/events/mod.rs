//! The ordered event channel between a pipeline worker and the
//! foreground.
//!
//! One channel per run. The worker thread is the only producer, so the
//! consumer sees progress, status, and the terminal event exactly in
//! emission order. Emitting never fails the worker: if the foreground
//! has gone away, events are dropped and logged at debug level.

use crate::core::{RunEvent, RunId};
use crossbeam_channel::{Receiver, Sender, TryRecvError};
use std::collections::HashMap;
use tracing::debug;

/// Creates the reporter/consumer pair for one run.
#[must_use]
pub fn run_channel(run_id: RunId) -> (RunReporter, RunEvents) {
    let (tx, rx) = crossbeam_channel::unbounded();
    (RunReporter { run_id, tx }, RunEvents { rx })
}

/// The producing end of a run's event channel.
///
/// Cloneable; the runner hands clones to actions so they can emit
/// extra status lines mid-step. Only the runner itself can emit the
/// terminal events.
#[derive(Debug, Clone)]
pub struct RunReporter {
    run_id: RunId,
    tx: Sender<RunEvent>,
}

impl RunReporter {
    /// Returns the run this reporter belongs to.
    #[must_use]
    pub const fn run_id(&self) -> RunId {
        self.run_id
    }

    /// Emits a progress update (0-100).
    pub fn progress(&self, percent: u8) {
        self.send(RunEvent::progress(self.run_id, percent));
    }

    /// Emits a status line.
    pub fn status(&self, text: impl Into<String>) {
        self.send(RunEvent::status(self.run_id, text));
    }

    pub(crate) fn finished(&self, context: HashMap<String, serde_json::Value>) {
        self.send(RunEvent::finished(self.run_id, context));
    }

    pub(crate) fn failed(&self, message: impl Into<String>) {
        self.send(RunEvent::failed(self.run_id, message));
    }

    fn send(&self, event: RunEvent) {
        if self.tx.send(event).is_err() {
            debug!(run_id = %self.run_id, "run event dropped, receiver disconnected");
        }
    }
}

/// What a non-blocking poll of the event channel found.
#[derive(Debug)]
pub enum EventPoll {
    /// An event was waiting.
    Event(RunEvent),
    /// Nothing waiting; the worker is still alive.
    Empty,
    /// The channel is drained and every producer is gone.
    Disconnected,
}

/// The consuming end of a run's event channel.
#[derive(Debug)]
pub struct RunEvents {
    rx: Receiver<RunEvent>,
}

impl RunEvents {
    /// Polls for one event without blocking.
    #[must_use]
    pub fn poll(&self) -> EventPoll {
        match self.rx.try_recv() {
            Ok(event) => EventPoll::Event(event),
            Err(TryRecvError::Empty) => EventPoll::Empty,
            Err(TryRecvError::Disconnected) => EventPoll::Disconnected,
        }
    }

    /// Blocks for the next event. Returns `None` once the channel is
    /// drained and every producer is gone.
    #[must_use]
    pub fn recv(&self) -> Option<RunEvent> {
        self.rx.recv().ok()
    }

    /// Drains every currently queued event without blocking.
    #[must_use]
    pub fn drain(&self) -> Vec<RunEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.rx.try_recv() {
            events.push(event);
        }
        events
    }
}
