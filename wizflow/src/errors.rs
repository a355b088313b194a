//! Error types for wizard flows and pipeline runs.
//!
//! Failures inside a pipeline action split into two classes: expected
//! domain failures that carry a message written for the end user, and
//! everything else, which surfaces as a full diagnostic.

use std::any::Any;
use thiserror::Error;

/// An error raised by a finish action during a pipeline run.
#[derive(Debug, Error)]
pub enum ActionError {
    /// A known domain failure. The message is shown to the user verbatim.
    #[error("{message}")]
    Expected {
        /// User-facing description of what went wrong.
        message: String,
    },

    /// Any other failure. The displayed text names the class and the cause.
    #[error("Unexpected pipeline error: {0:#}")]
    Unexpected(#[from] anyhow::Error),
}

impl ActionError {
    /// Creates an expected error with a user-facing message.
    #[must_use]
    pub fn expected(message: impl Into<String>) -> Self {
        Self::Expected {
            message: message.into(),
        }
    }

    /// Wraps an arbitrary error as an unexpected failure.
    #[must_use]
    pub fn unexpected(err: impl Into<anyhow::Error>) -> Self {
        Self::Unexpected(err.into())
    }

    /// Returns true for the expected variant.
    #[must_use]
    pub const fn is_expected(&self) -> bool {
        matches!(self, Self::Expected { .. })
    }

    /// Classifies a caught panic payload from an action invocation.
    pub(crate) fn from_panic(action: &str, payload: &(dyn Any + Send)) -> Self {
        let detail = payload
            .downcast_ref::<&str>()
            .map(|s| (*s).to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "non-string panic payload".to_string());
        Self::Unexpected(anyhow::anyhow!("action '{action}' panicked: {detail}"))
    }
}

/// Errors reported by the controller, task bridge, and resource layers.
#[derive(Debug, Error)]
pub enum WizardError {
    /// The task bridge has been stopped and no longer accepts work.
    #[error("task bridge is stopped")]
    BridgeStopped,

    /// A run's worker thread ended without reporting success or failure.
    #[error("pipeline run ended without reporting an outcome")]
    RunInterrupted,

    /// A translation key is absent from the active and fallback tables.
    #[error("missing translation key '{key}' for language '{language}'")]
    MissingTranslation {
        /// The dotted lookup key.
        key: String,
        /// The language the lookup ran against.
        language: String,
    },

    /// A resource path matched no search directory.
    #[error("resource '{path}' not found in any search directory")]
    ResourceNotFound {
        /// The relative path that was requested.
        path: String,
    },

    /// A locale catalog file was not a flat string map.
    #[error("invalid locale catalog '{path}': {source}")]
    CatalogParse {
        /// The offending file.
        path: String,
        /// The underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// A validator pattern failed to compile.
    #[error("invalid validation pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
