//! Test doubles for exercising wizards without a user interface.

use crate::actions::{ActionContext, ActionResult, SyncAction};
use crate::context::FlowContext;
use crate::controller::WizardFrontend;
use crate::core::{RunId, RunInfo};
use crate::errors::ActionError;
use crate::events::{run_channel, RunEvents};
use crate::flow::{FlowDefinition, StepDefinition, StepKind};
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

/// A scripted [`WizardFrontend`] that records everything shown to it.
///
/// Step values and confirmation answers are queued up front; every
/// message, progress and status update the controller sends is kept
/// for assertions. Unscripted confirmations answer no.
#[derive(Debug, Default)]
pub struct ScriptedFrontend {
    values: HashMap<String, serde_json::Value>,
    confirmations: VecDeque<bool>,
    confirms_requested: usize,
    warnings: Vec<String>,
    successes: Vec<String>,
    errors: Vec<String>,
    progress: Vec<u8>,
    statuses: Vec<String>,
}

impl ScriptedFrontend {
    /// A frontend with no scripted values; every step reads as null
    /// and every confirmation declines.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Scripts the value the widget for `step_key` will hold.
    #[must_use]
    pub fn with_value(mut self, step_key: impl Into<String>, value: serde_json::Value) -> Self {
        self.values.insert(step_key.into(), value);
        self
    }

    /// Queues an answer for the next confirmation dialog.
    #[must_use]
    pub fn with_confirmation(mut self, answer: bool) -> Self {
        self.confirmations.push_back(answer);
        self
    }

    /// Warnings shown so far.
    #[must_use]
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Success messages shown so far.
    #[must_use]
    pub fn successes(&self) -> &[String] {
        &self.successes
    }

    /// Error messages shown so far.
    #[must_use]
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// Progress updates in arrival order.
    #[must_use]
    pub fn progress(&self) -> &[u8] {
        &self.progress
    }

    /// Status lines in arrival order.
    #[must_use]
    pub fn statuses(&self) -> &[String] {
        &self.statuses
    }

    /// How many times the controller asked for confirmation.
    #[must_use]
    pub const fn confirms_requested(&self) -> usize {
        self.confirms_requested
    }
}

impl WizardFrontend for ScriptedFrontend {
    fn step_value(&mut self, step: &StepDefinition) -> serde_json::Value {
        self.values
            .get(step.key())
            .cloned()
            .unwrap_or(serde_json::Value::Null)
    }

    fn confirm_run(&mut self) -> bool {
        self.confirms_requested += 1;
        self.confirmations.pop_front().unwrap_or(false)
    }

    fn show_warning(&mut self, message: &str) {
        self.warnings.push(message.to_string());
    }

    fn show_success(&mut self, message: &str) {
        self.successes.push(message.to_string());
    }

    fn show_error(&mut self, message: &str) {
        self.errors.push(message.to_string());
    }

    fn set_progress(&mut self, percent: u8) {
        self.progress.push(percent);
    }

    fn set_status(&mut self, text: &str) {
        self.statuses.push(text.to_string());
    }
}

/// Builds an [`ActionContext`] over `seed` wired to a fresh event
/// stream, for exercising finish actions directly.
#[must_use]
pub fn action_context(
    seed: HashMap<String, serde_json::Value>,
) -> (ActionContext, RunEvents) {
    let run_id = RunId::new();
    let (reporter, events) = run_channel(run_id);
    let info = RunInfo::new(1, 1, "test_action", 0);
    let context = ActionContext::new(Arc::new(FlowContext::from_map(seed)), info, reporter);
    (context, events)
}

/// A canned sync action that records every invocation.
///
/// Register it through [`crate::actions::FinishAction::from_sync`] and
/// keep a clone of the `Arc` to assert on how often it ran and which
/// step labels it ran under.
#[derive(Debug, Default)]
pub struct RecordingAction {
    calls: Mutex<usize>,
    labels: Mutex<Vec<String>>,
    fail_with: Option<String>,
}

impl RecordingAction {
    /// A recording action that succeeds.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A recording action that fails with the given user-facing
    /// message.
    #[must_use]
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            fail_with: Some(message.into()),
            ..Self::default()
        }
    }

    /// How many times the action ran.
    #[must_use]
    pub fn run_count(&self) -> usize {
        *self.calls.lock()
    }

    /// Display labels of the steps this action ran as, in order.
    #[must_use]
    pub fn seen_labels(&self) -> Vec<String> {
        self.labels.lock().clone()
    }
}

impl SyncAction for RecordingAction {
    fn run(&self, ctx: ActionContext) -> ActionResult {
        *self.calls.lock() += 1;
        self.labels.lock().push(ctx.info().label.clone());
        match &self.fail_with {
            Some(message) => Err(ActionError::expected(message.clone())),
            None => Ok(()),
        }
    }
}

/// Builds a flow of `steps` plain text steps keyed `step_1..step_n`,
/// with no validators and an empty pipeline.
#[must_use]
pub fn linear_flow(name: impl Into<String>, steps: usize) -> FlowDefinition {
    let mut flow = FlowDefinition::new(name);
    for n in 1..=steps {
        flow = flow.with_step(StepDefinition::new(
            format!("step_{n}"),
            format!("Step {n}"),
            StepKind::text(),
        ));
    }
    flow
}
