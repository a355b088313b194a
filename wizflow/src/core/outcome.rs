//! Terminal outcome of a pipeline run.

use std::collections::HashMap;

/// How a pipeline run ended.
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    /// Every action succeeded. Carries the merged wizard context.
    Success(HashMap<String, serde_json::Value>),
    /// An action failed. Carries the user-visible failure message.
    Failure(String),
}

impl RunOutcome {
    /// Returns true if the run succeeded.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Returns true if the run failed.
    #[must_use]
    pub const fn is_failure(&self) -> bool {
        matches!(self, Self::Failure(_))
    }

    /// Returns the merged context for a successful run.
    #[must_use]
    pub const fn context(&self) -> Option<&HashMap<String, serde_json::Value>> {
        match self {
            Self::Success(context) => Some(context),
            Self::Failure(_) => None,
        }
    }

    /// Returns the failure message for a failed run.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Success(_) => None,
            Self::Failure(message) => Some(message),
        }
    }
}
