//! Per-step run info handed to finish actions.

use serde::{Deserialize, Serialize};

/// Position and progress of the step currently executing.
///
/// Mirrors what the loading surface shows: a 1-based step ordinal, the
/// total step count, the action's display name, and the percentage the
/// run had reached when the step began.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunInfo {
    /// 1-based ordinal of the running step.
    pub step: usize,
    /// Total number of steps in the pipeline.
    pub total: usize,
    /// Display name of the running action.
    pub label: String,
    /// Percentage reached when the step began (0-100).
    pub percentage: u8,
}

impl RunInfo {
    /// Creates run info for one step.
    #[must_use]
    pub fn new(step: usize, total: usize, label: impl Into<String>, percentage: u8) -> Self {
        Self {
            step,
            total,
            label: label.into(),
            percentage,
        }
    }

    /// Returns the `Step {i} of {total}:` prefix.
    #[must_use]
    pub fn step_of(&self) -> String {
        format!("Step {} of {}:", self.step, self.total)
    }

    /// Returns the full status line, prefix plus action name.
    #[must_use]
    pub fn full_label(&self) -> String {
        format!("{} {}", self.step_of(), self.label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_of_prefix() {
        let info = RunInfo::new(2, 5, "upload", 20);
        assert_eq!(info.step_of(), "Step 2 of 5:");
    }

    #[test]
    fn test_full_label() {
        let info = RunInfo::new(1, 3, "prepare", 0);
        assert_eq!(info.full_label(), "Step 1 of 3: prepare");
    }
}
