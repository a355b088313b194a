//! Step sequencing and run orchestration.
//!
//! The [`WizardController`] owns a flow, its collected context and the
//! pipeline runner, and talks to the UI through the [`WizardFrontend`]
//! trait. It is a state machine with three states:
//!
//! - `Editing(index)`: collecting input for one step,
//! - `Confirming`: asking whether to run the pipeline,
//! - `Running`: a pipeline worker is executing.
//!
//! [`forward`] moves through steps, validating and storing each value.
//! Past the last step the frontend is asked to confirm; declining
//! stays on the last step with its value kept, accepting starts the
//! pipeline. While running, the host pumps [`process_events`] (or
//! blocks on [`wait_for_outcome`]) to relay progress to the frontend;
//! when the run ends the wizard rewinds to a fresh first step.
//!
//! [`forward`]: WizardController::forward
//! [`process_events`]: WizardController::process_events
//! [`wait_for_outcome`]: WizardController::wait_for_outcome

mod frontend;

pub use frontend::WizardFrontend;

use crate::config::WizardConfig;
use crate::context::FlowContext;
use crate::core::{RunOutcome, RunPayload};
use crate::errors::WizardError;
use crate::events::EventPoll;
use crate::flow::{FlowDefinition, StepDefinition, Verdict};
use crate::i18n::Catalog;
use crate::resources::ResourceResolver;
use crate::runner::{PipelineRun, PipelineRunner};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Where the wizard currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardState {
    /// Collecting input for the step at this index.
    Editing(usize),
    /// Waiting for the frontend to confirm the pipeline run.
    Confirming,
    /// A pipeline worker is executing.
    Running,
}

impl WizardState {
    /// True while a step is being edited.
    #[must_use]
    pub const fn is_editing(self) -> bool {
        matches!(self, Self::Editing(_))
    }

    /// True while waiting for run confirmation.
    #[must_use]
    pub const fn is_confirming(self) -> bool {
        matches!(self, Self::Confirming)
    }

    /// True while a pipeline runs.
    #[must_use]
    pub const fn is_running(self) -> bool {
        matches!(self, Self::Running)
    }
}

/// Drives one wizard: steps, context, confirmation and pipeline runs.
#[derive(Debug)]
pub struct WizardController {
    flow: FlowDefinition,
    config: WizardConfig,
    catalog: Catalog,
    context: FlowContext,
    state: WizardState,
    runner: PipelineRunner,
    active: Option<PipelineRun>,
}

impl WizardController {
    /// Creates a controller with default configuration and the
    /// built-in message catalog.
    #[must_use]
    pub fn new(flow: FlowDefinition) -> Self {
        Self::assemble(flow, WizardConfig::default(), Catalog::builtin())
    }

    /// Creates a controller for `config`, loading locale catalogs from
    /// the configured resource directories.
    ///
    /// # Errors
    ///
    /// Returns an error when a locale catalog exists but cannot be
    /// read or parsed.
    pub fn with_config(flow: FlowDefinition, config: WizardConfig) -> Result<Self, WizardError> {
        let mut catalog = Catalog::new(config.language());
        let resolver = ResourceResolver::from_config(&config);
        for dir in resolver.locale_dirs() {
            catalog.load_dir(&dir)?;
        }
        Ok(Self::assemble(flow, config, catalog))
    }

    fn assemble(flow: FlowDefinition, config: WizardConfig, catalog: Catalog) -> Self {
        info!(
            flow = flow.name(),
            steps = flow.step_count(),
            actions = flow.action_count(),
            language = catalog.language(),
            "wizard ready"
        );
        Self {
            flow,
            config,
            catalog,
            context: FlowContext::new(),
            state: WizardState::Editing(0),
            runner: PipelineRunner::new(),
            active: None,
        }
    }

    /// Advances the wizard one step.
    ///
    /// While editing, reads the step's value from the frontend,
    /// validates it and stores it in the context; rejected input shows
    /// a warning and stays put. Past the last step the frontend is
    /// asked to confirm the run: declining keeps the wizard on the
    /// last step with every value intact, accepting starts the
    /// pipeline. Ignored while a pipeline runs.
    ///
    /// # Errors
    ///
    /// Returns an error when the pipeline cannot be started; the
    /// wizard then stays in place with its context intact.
    pub fn forward(&mut self, frontend: &mut dyn WizardFrontend) -> Result<(), WizardError> {
        match self.state {
            WizardState::Running => {
                debug!("forward ignored while a pipeline runs");
                Ok(())
            }
            WizardState::Confirming => self.request_confirmation(frontend),
            WizardState::Editing(index) => {
                let Some(step) = self.flow.step(index) else {
                    // A flow without steps goes straight to confirmation.
                    return self.request_confirmation(frontend);
                };
                let value = frontend.step_value(step);
                match step.validate(&value) {
                    Verdict::Rejected(message) => {
                        warn!(step = step.key(), %message, "step input rejected");
                        frontend.show_warning(&message);
                        Ok(())
                    }
                    Verdict::Accepted => {
                        let key = step.key().to_string();
                        debug!(step = %key, "step value stored");
                        self.context.set(key, value);
                        if index + 1 < self.flow.step_count() {
                            self.state = WizardState::Editing(index + 1);
                            Ok(())
                        } else {
                            self.request_confirmation(frontend)
                        }
                    }
                }
            }
        }
    }

    /// Moves back to the previous step. Does nothing on the first step
    /// and while a pipeline runs.
    pub fn back(&mut self) {
        match self.state {
            WizardState::Editing(index) if index > 0 => {
                self.state = WizardState::Editing(index - 1);
            }
            WizardState::Running => debug!("back ignored while a pipeline runs"),
            WizardState::Confirming => {
                self.state = WizardState::Editing(self.resting_index());
            }
            WizardState::Editing(_) => {}
        }
    }

    /// Clears collected values and returns to the first step. Ignored
    /// while a pipeline runs.
    pub fn restart(&mut self) {
        if self.state.is_running() {
            debug!("restart ignored while a pipeline runs");
            return;
        }
        self.context.clear();
        self.state = WizardState::Editing(0);
    }

    /// Pumps pending run events to the frontend without blocking.
    ///
    /// Returns the outcome once the run ends; `None` while it is still
    /// going or when no run is active. After a terminal event the
    /// wizard has already rewound to a fresh first step.
    pub fn process_events(&mut self, frontend: &mut dyn WizardFrontend) -> Option<RunOutcome> {
        loop {
            let poll = self.active.as_ref()?.poll();
            match poll {
                EventPoll::Empty => return None,
                EventPoll::Disconnected => return Some(self.run_interrupted(frontend)),
                EventPoll::Event(event) => {
                    if let Some(outcome) = self.apply_event(event.payload, frontend) {
                        return Some(outcome);
                    }
                }
            }
        }
    }

    /// Blocks until the active run ends, relaying every event to the
    /// frontend. Returns `None` when no run is active.
    pub fn wait_for_outcome(&mut self, frontend: &mut dyn WizardFrontend) -> Option<RunOutcome> {
        loop {
            let received = self.active.as_ref()?.recv();
            match received {
                None => return Some(self.run_interrupted(frontend)),
                Some(event) => {
                    if let Some(outcome) = self.apply_event(event.payload, frontend) {
                        return Some(outcome);
                    }
                }
            }
        }
    }

    /// The current state.
    #[must_use]
    pub const fn state(&self) -> WizardState {
        self.state
    }

    /// Index of the step being edited; `None` while confirming or
    /// running, or when the flow has no steps.
    #[must_use]
    pub fn position(&self) -> Option<usize> {
        match self.state {
            WizardState::Editing(index) if index < self.flow.step_count() => Some(index),
            _ => None,
        }
    }

    /// The step being edited, if any.
    #[must_use]
    pub fn current_step(&self) -> Option<&StepDefinition> {
        self.position().and_then(|index| self.flow.step(index))
    }

    /// True while a pipeline runs.
    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.state.is_running()
    }

    /// The flow this controller drives.
    #[must_use]
    pub const fn flow(&self) -> &FlowDefinition {
        &self.flow
    }

    /// Values collected so far.
    #[must_use]
    pub const fn context(&self) -> &FlowContext {
        &self.context
    }

    /// The active configuration.
    #[must_use]
    pub const fn config(&self) -> &WizardConfig {
        &self.config
    }

    /// The message catalog in use.
    #[must_use]
    pub const fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Mutable catalog access, for applications layering their own
    /// messages over the built-in ones.
    pub fn catalog_mut(&mut self) -> &mut Catalog {
        &mut self.catalog
    }

    fn request_confirmation(&mut self, frontend: &mut dyn WizardFrontend) -> Result<(), WizardError> {
        self.state = WizardState::Confirming;
        if frontend.confirm_run() {
            self.begin_run(frontend)
        } else {
            debug!("pipeline declined, staying on the last step");
            self.state = WizardState::Editing(self.resting_index());
            Ok(())
        }
    }

    fn begin_run(&mut self, frontend: &mut dyn WizardFrontend) -> Result<(), WizardError> {
        if self.flow.action_count() == 0 {
            info!(flow = self.flow.name(), "flow has no pipeline, nothing to run");
            frontend.show_success(&self.text("messages.no_pipeline"));
            self.state = WizardState::Editing(self.resting_index());
            return Ok(());
        }

        let seed = self.context.snapshot();
        let run = self.runner.start_run(self.flow.pipeline().to_vec(), seed)?;
        info!(flow = self.flow.name(), run_id = %run.run_id(), "pipeline started");
        self.active = Some(run);
        self.state = WizardState::Running;
        Ok(())
    }

    fn apply_event(
        &mut self,
        payload: RunPayload,
        frontend: &mut dyn WizardFrontend,
    ) -> Option<RunOutcome> {
        match payload {
            RunPayload::Progress { percent } => {
                frontend.set_progress(percent);
                None
            }
            RunPayload::Status { text } => {
                frontend.set_status(&text);
                None
            }
            RunPayload::Finished { context } => {
                self.context.merge(context);
                let merged = self.context.snapshot();
                frontend.show_success(&self.text("messages.flow_success"));
                self.conclude_run();
                Some(RunOutcome::Success(merged))
            }
            RunPayload::Failed { message } => {
                let shown = format!("{}{}", self.text("messages.flow_error_prefix"), message);
                frontend.show_error(&shown);
                self.conclude_run();
                Some(RunOutcome::Failure(message))
            }
        }
    }

    /// The run's event stream died without a terminal event, which
    /// means the worker was lost. Surfaced to the frontend like any
    /// other failure.
    fn run_interrupted(&mut self, frontend: &mut dyn WizardFrontend) -> RunOutcome {
        let message = WizardError::RunInterrupted.to_string();
        warn!("pipeline run ended without a terminal event");
        let shown = format!("{}{}", self.text("messages.flow_error_prefix"), message);
        frontend.show_error(&shown);
        self.conclude_run();
        RunOutcome::Failure(message)
    }

    /// Joins the finished worker and rewinds to a fresh first step.
    fn conclude_run(&mut self) {
        if let Some(mut run) = self.active.take() {
            run.join();
        }
        self.context.clear();
        self.state = WizardState::Editing(0);
    }

    /// The step shown when a confirmation is declined.
    fn resting_index(&self) -> usize {
        self.flow.step_count().saturating_sub(1)
    }

    /// Framework text with a key-echo fallback so a broken catalog
    /// never hides a dialog.
    fn text(&self, key: &str) -> String {
        self.catalog.t(key).unwrap_or_else(|err| {
            warn!(%err, "framework message missing from catalog");
            key.to_string()
        })
    }
}
