//! Pipeline execution on a dedicated worker thread.
//!
//! [`PipelineRunner::start_run`] snapshots the wizard context, spawns a
//! worker and returns a [`PipelineRun`] handle streaming [`RunEvent`]s
//! back to the caller. The worker walks the finish actions in order,
//! announcing each step before invoking it, and ends every run with
//! exactly one terminal event: `Finished` carrying the final context,
//! or `Failed` carrying the error message.

use crate::actions::{ActionContext, ActionKind, FinishAction};
use crate::bridge::TaskBridge;
use crate::context::FlowContext;
use crate::core::{RunEvent, RunId, RunInfo};
use crate::errors::{ActionError, WizardError};
use crate::events::{run_channel, EventPoll, RunEvents, RunReporter};
use futures::FutureExt;
use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{error, info, warn};

/// Spawns pipeline workers and hands async actions to a shared
/// [`TaskBridge`].
#[derive(Debug)]
pub struct PipelineRunner {
    bridge: Arc<TaskBridge>,
}

impl PipelineRunner {
    /// Creates a runner with its own task bridge.
    #[must_use]
    pub fn new() -> Self {
        Self {
            bridge: Arc::new(TaskBridge::new()),
        }
    }

    /// Creates a runner sharing an existing task bridge.
    #[must_use]
    pub const fn with_bridge(bridge: Arc<TaskBridge>) -> Self {
        Self { bridge }
    }

    /// The bridge this runner schedules async actions on.
    #[must_use]
    pub const fn bridge(&self) -> &Arc<TaskBridge> {
        &self.bridge
    }

    /// Starts a pipeline on a fresh worker thread.
    ///
    /// `seed` becomes the initial action context; actions mutate a
    /// shared copy and the final state comes back in the `Finished`
    /// event. The call returns as soon as the worker is spawned.
    ///
    /// # Errors
    ///
    /// Returns an error if the task bridge has been stopped or the
    /// worker thread cannot be spawned.
    pub fn start_run(
        &self,
        pipeline: Vec<FinishAction>,
        seed: HashMap<String, serde_json::Value>,
    ) -> Result<PipelineRun, WizardError> {
        self.bridge.start()?;

        let run_id = RunId::new();
        let (reporter, events) = run_channel(run_id);
        let bridge = Arc::clone(&self.bridge);
        let worker = thread::Builder::new()
            .name(format!("wizflow-run-{}", run_id.short()))
            .spawn(move || execute_pipeline(&reporter, &bridge, &pipeline, seed))
            .map_err(WizardError::Io)?;

        Ok(PipelineRun {
            run_id,
            events,
            worker: Some(worker),
        })
    }
}

impl Default for PipelineRunner {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle to one in-flight pipeline run.
///
/// Dropping the handle waits for the worker thread to finish; poll the
/// event stream to a terminal event first if you need the run's result.
#[derive(Debug)]
pub struct PipelineRun {
    run_id: RunId,
    events: RunEvents,
    worker: Option<JoinHandle<()>>,
}

impl PipelineRun {
    /// Identifier shared by every event of this run.
    #[must_use]
    pub const fn run_id(&self) -> RunId {
        self.run_id
    }

    /// The event stream of this run.
    #[must_use]
    pub const fn events(&self) -> &RunEvents {
        &self.events
    }

    /// Non-blocking fetch of the next event.
    pub fn poll(&self) -> EventPoll {
        self.events.poll()
    }

    /// Blocking fetch of the next event, `None` once the run is over
    /// and the stream is drained.
    pub fn recv(&self) -> Option<RunEvent> {
        self.events.recv()
    }

    /// True once the worker thread has exited.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.worker.as_ref().map_or(true, JoinHandle::is_finished)
    }

    /// Waits for the worker thread to exit.
    pub fn join(&mut self) {
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                error!(run_id = %self.run_id, "pipeline worker thread panicked");
            }
        }
    }
}

impl Drop for PipelineRun {
    fn drop(&mut self) {
        self.join();
    }
}

fn execute_pipeline(
    reporter: &RunReporter,
    bridge: &TaskBridge,
    pipeline: &[FinishAction],
    seed: HashMap<String, serde_json::Value>,
) {
    let total = pipeline.len();
    let context = Arc::new(FlowContext::from_map(seed));

    info!(run_id = %reporter.run_id(), "Starting pipeline with {total} steps");
    reporter.progress(0);
    reporter.status("Starting pipeline");

    for (idx, action) in pipeline.iter().enumerate() {
        let info = RunInfo::new(idx + 1, total, action.name(), step_percentage(idx, total));
        let line = info.full_label();
        info!(run_id = %reporter.run_id(), "{line}");
        reporter.status(line);
        reporter.progress(info.percentage);

        let ctx = ActionContext::new(Arc::clone(&context), info, reporter.clone());
        if let Err(err) = invoke_action(bridge, action, ctx) {
            warn!(run_id = %reporter.run_id(), action = action.name(), %err, "pipeline action failed");
            reporter.failed(err.to_string());
            return;
        }
    }

    info!(run_id = %reporter.run_id(), "Pipeline completed successfully");
    reporter.status("Pipeline completed successfully");
    reporter.progress(100);
    reporter.finished(context.snapshot());
}

/// Percentage shown while the step at `idx` runs. The bar reflects work
/// already done, so the first step shows 0 and 100 is reserved for
/// completion.
fn step_percentage(idx: usize, total: usize) -> u8 {
    u8::try_from(idx * 100 / total.max(1)).unwrap_or(100)
}

fn invoke_action(
    bridge: &TaskBridge,
    action: &FinishAction,
    ctx: ActionContext,
) -> Result<(), ActionError> {
    match action.kind() {
        ActionKind::Sync(func) => {
            let func = Arc::clone(func);
            match catch_unwind(AssertUnwindSafe(move || func.run(ctx))) {
                Ok(result) => result,
                Err(payload) => Err(ActionError::from_panic(action.name(), payload.as_ref())),
            }
        }
        ActionKind::Async(func) => {
            let func = Arc::clone(func);
            let caught = AssertUnwindSafe(async move { func.run(ctx).await }).catch_unwind();
            match bridge.submit(caught) {
                Ok(Ok(result)) => result,
                Ok(Err(payload)) => Err(ActionError::from_panic(action.name(), payload.as_ref())),
                Err(err) => Err(ActionError::Unexpected(anyhow::Error::new(err))),
            }
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::RunPayload;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::time::Duration;

    fn collect(mut run: PipelineRun) -> Vec<RunEvent> {
        let mut events = Vec::new();
        while let Some(event) = run.recv() {
            events.push(event);
        }
        run.join();
        events
    }

    fn progress_values(events: &[RunEvent]) -> Vec<u8> {
        events
            .iter()
            .filter_map(|e| match &e.payload {
                RunPayload::Progress { percent } => Some(*percent),
                _ => None,
            })
            .collect()
    }

    fn status_lines(events: &[RunEvent]) -> Vec<String> {
        events
            .iter()
            .filter_map(|e| match &e.payload {
                RunPayload::Status { text } => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    fn finished_contexts(events: &[RunEvent]) -> Vec<HashMap<String, serde_json::Value>> {
        events
            .iter()
            .filter_map(|e| match &e.payload {
                RunPayload::Finished { context } => Some(context.clone()),
                _ => None,
            })
            .collect()
    }

    fn failure_messages(events: &[RunEvent]) -> Vec<String> {
        events
            .iter()
            .filter_map(|e| match &e.payload {
                RunPayload::Failed { message } => Some(message.clone()),
                _ => None,
            })
            .collect()
    }

    fn two_step_pipeline() -> Vec<FinishAction> {
        vec![
            FinishAction::sync("step_one", |ctx: ActionContext| {
                ctx.status("step_one running");
                ctx.progress(10);
                ctx.set("value", json!(1));
                Ok(())
            }),
            FinishAction::sync("step_two", |ctx: ActionContext| {
                let value = ctx.get("value").and_then(|v| v.as_i64()).unwrap_or(0);
                ctx.set("value", json!(value + 2));
                Ok(())
            }),
        ]
    }

    #[test]
    fn test_run_reports_progress_status_and_final_context() {
        let runner = PipelineRunner::new();
        let run = runner.start_run(two_step_pipeline(), HashMap::new()).unwrap();
        let events = collect(run);

        let progress = progress_values(&events);
        assert!(progress.contains(&0));
        assert!(progress.contains(&50));
        assert!(progress.contains(&100));
        assert!(progress.contains(&10), "mid-action progress missing");

        let statuses = status_lines(&events);
        assert!(statuses.iter().any(|s| s == "Starting pipeline"));
        assert!(statuses.iter().any(|s| s.starts_with("Step 1 of 2:")));
        assert!(statuses.iter().any(|s| s == "Step 1 of 2: step_one"));
        assert!(statuses.iter().any(|s| s == "step_one running"));
        assert!(statuses.iter().any(|s| s.starts_with("Step 2 of 2:")));
        assert!(statuses.iter().any(|s| s == "Pipeline completed successfully"));

        assert!(failure_messages(&events).is_empty());
        let finished = finished_contexts(&events);
        assert_eq!(finished.len(), 1);
        assert_eq!(finished[0].get("value"), Some(&json!(3)));
    }

    #[test]
    fn test_run_executes_async_actions() {
        let runner = PipelineRunner::new();
        let pipeline = vec![FinishAction::asynchronous(
            "async_step",
            |ctx: ActionContext| async move {
                tokio::time::sleep(Duration::from_millis(5)).await;
                ctx.set("done", json!(true));
                Ok(())
            },
        )];
        let events = collect(runner.start_run(pipeline, HashMap::new()).unwrap());

        assert!(failure_messages(&events).is_empty());
        let finished = finished_contexts(&events);
        assert_eq!(finished.len(), 1);
        assert_eq!(finished[0].get("done"), Some(&json!(true)));
    }

    #[test]
    fn test_expected_failure_reports_its_message_verbatim() {
        let runner = PipelineRunner::new();
        let pipeline = vec![FinishAction::sync("fragile_step", |_ctx| {
            Err(ActionError::expected("User-friendly message"))
        })];
        let events = collect(runner.start_run(pipeline, HashMap::new()).unwrap());

        assert!(finished_contexts(&events).is_empty());
        let failures = failure_messages(&events);
        assert_eq!(failures, vec!["User-friendly message".to_string()]);
    }

    #[test]
    fn test_unexpected_failure_reports_the_underlying_error() {
        let runner = PipelineRunner::new();
        let pipeline = vec![FinishAction::sync("broken_step", |_ctx| {
            Err(ActionError::unexpected(anyhow::anyhow!("boom")))
        })];
        let events = collect(runner.start_run(pipeline, HashMap::new()).unwrap());

        assert!(finished_contexts(&events).is_empty());
        let failures = failure_messages(&events);
        assert_eq!(failures.len(), 1);
        assert!(failures[0].contains("Unexpected pipeline error"));
        assert!(failures[0].contains("boom"));
    }

    #[test]
    fn test_failure_stops_the_pipeline_early() {
        let runner = PipelineRunner::new();
        let pipeline = vec![
            FinishAction::sync("failing", |_ctx| {
                Err(ActionError::expected("stop here"))
            }),
            FinishAction::sync("never_reached", |ctx: ActionContext| {
                ctx.set("reached", json!(true));
                Ok(())
            }),
        ];
        let events = collect(runner.start_run(pipeline, HashMap::new()).unwrap());

        assert_eq!(failure_messages(&events), vec!["stop here".to_string()]);
        let statuses = status_lines(&events);
        assert!(!statuses.iter().any(|s| s.starts_with("Step 2 of 2:")));
    }

    #[test]
    fn test_panicking_action_becomes_a_failure_event() {
        let runner = PipelineRunner::new();
        let pipeline = vec![FinishAction::sync("explosive", |_ctx| {
            panic!("kaboom");
        })];
        let events = collect(runner.start_run(pipeline, HashMap::new()).unwrap());

        let failures = failure_messages(&events);
        assert_eq!(failures.len(), 1);
        assert!(failures[0].contains("explosive"));
        assert!(failures[0].contains("panicked"));
        assert!(failures[0].contains("kaboom"));
    }

    #[test]
    fn test_empty_pipeline_finishes_with_the_seed_context() {
        let runner = PipelineRunner::new();
        let mut seed = HashMap::new();
        seed.insert("name".to_string(), json!("Ada"));
        let events = collect(runner.start_run(Vec::new(), seed).unwrap());

        assert_eq!(progress_values(&events), vec![0, 100]);
        let finished = finished_contexts(&events);
        assert_eq!(finished.len(), 1);
        assert_eq!(finished[0].get("name"), Some(&json!("Ada")));
    }

    #[test]
    fn test_runs_share_one_bridge() {
        let runner = PipelineRunner::new();
        let pipeline = |tag: &str| {
            let key = tag.to_string();
            vec![FinishAction::asynchronous(
                "tagger",
                move |ctx: ActionContext| {
                    let key = key.clone();
                    async move {
                        ctx.set(key, json!(true));
                        Ok(())
                    }
                },
            )]
        };

        let first = runner.start_run(pipeline("first"), HashMap::new()).unwrap();
        let second = runner.start_run(pipeline("second"), HashMap::new()).unwrap();
        assert_ne!(first.run_id(), second.run_id());

        let first = collect(first);
        let second = collect(second);
        assert_eq!(finished_contexts(&first)[0].get("first"), Some(&json!(true)));
        assert_eq!(finished_contexts(&second)[0].get("second"), Some(&json!(true)));
    }
}
