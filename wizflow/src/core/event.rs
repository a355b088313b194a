//! Run events streamed from a pipeline worker to the foreground.

use super::RunId;
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// An event emitted by a pipeline run.
///
/// All events of one run travel over a single channel, so consumers
/// observe them exactly in emission order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunEvent {
    /// The run this event belongs to.
    pub run_id: RunId,

    /// When the event was emitted (ISO 8601).
    pub timestamp: String,

    /// What happened.
    pub payload: RunPayload,
}

/// The payload of a run event.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RunPayload {
    /// Overall progress moved to a new percentage.
    Progress {
        /// Percentage complete (0-100).
        percent: u8,
    },

    /// A human-readable status line changed.
    Status {
        /// The status text.
        text: String,
    },

    /// The run completed; carries the run's final context.
    Finished {
        /// The context as the last action left it.
        context: HashMap<String, serde_json::Value>,
    },

    /// The run failed; no further events follow.
    Failed {
        /// The classified, user-visible failure message.
        message: String,
    },
}

impl RunEvent {
    /// Creates a progress event.
    #[must_use]
    pub fn progress(run_id: RunId, percent: u8) -> Self {
        Self::with_payload(run_id, RunPayload::Progress { percent })
    }

    /// Creates a status event.
    #[must_use]
    pub fn status(run_id: RunId, text: impl Into<String>) -> Self {
        Self::with_payload(run_id, RunPayload::Status { text: text.into() })
    }

    /// Creates a finished event carrying the run's context.
    #[must_use]
    pub fn finished(run_id: RunId, context: HashMap<String, serde_json::Value>) -> Self {
        Self::with_payload(run_id, RunPayload::Finished { context })
    }

    /// Creates a failed event.
    #[must_use]
    pub fn failed(run_id: RunId, message: impl Into<String>) -> Self {
        Self::with_payload(
            run_id,
            RunPayload::Failed {
                message: message.into(),
            },
        )
    }

    /// Returns true for `Finished` and `Failed` events.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(
            self.payload,
            RunPayload::Finished { .. } | RunPayload::Failed { .. }
        )
    }

    fn with_payload(run_id: RunId, payload: RunPayload) -> Self {
        Self {
            run_id,
            timestamp: iso_timestamp(),
            payload,
        }
    }
}

fn iso_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
