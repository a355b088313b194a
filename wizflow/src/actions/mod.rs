//! Finish actions and their execution context.
//!
//! A pipeline is an ordered list of [`FinishAction`]s. Whether an
//! action is synchronous or asynchronous is declared when it is
//! registered; the runner never inspects the callable, it just
//! dispatches on the declared variant.

use crate::context::FlowContext;
use crate::core::RunInfo;
use crate::errors::ActionError;
use crate::events::RunReporter;
use async_trait::async_trait;
use std::fmt::{self, Debug};
use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;

/// Result alias for finish actions.
pub type ActionResult = Result<(), ActionError>;

/// A synchronous finish action, invoked inline on the worker thread.
pub trait SyncAction: Send + Sync + Debug {
    /// Executes the action.
    fn run(&self, ctx: ActionContext) -> ActionResult;
}

/// An asynchronous finish action, driven on the task bridge thread
/// while the worker thread blocks for its result.
#[async_trait]
pub trait AsyncAction: Send + Sync + Debug {
    /// Executes the action.
    async fn run(&self, ctx: ActionContext) -> ActionResult;
}

/// Everything an action gets to work with.
///
/// Carries the run's context bag, the step's position info, and emit
/// handles so actions can push extra status lines or progress updates
/// mid-step. Cloning is cheap; async actions take it by value into
/// their futures.
#[derive(Debug, Clone)]
pub struct ActionContext {
    data: Arc<FlowContext>,
    info: RunInfo,
    reporter: RunReporter,
}

impl ActionContext {
    pub(crate) fn new(data: Arc<FlowContext>, info: RunInfo, reporter: RunReporter) -> Self {
        Self {
            data,
            info,
            reporter,
        }
    }

    /// Returns the run's context bag.
    #[must_use]
    pub fn data(&self) -> &FlowContext {
        &self.data
    }

    /// Returns the position info for the running step.
    #[must_use]
    pub const fn info(&self) -> &RunInfo {
        &self.info
    }

    /// Shorthand for reading a context value.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<serde_json::Value> {
        self.data.get(key)
    }

    /// Shorthand for writing a context value.
    pub fn set(&self, key: impl Into<String>, value: serde_json::Value) {
        self.data.set(key, value);
    }

    /// Emits an extra status line for the loading surface.
    pub fn status(&self, text: impl Into<String>) {
        self.reporter.status(text);
    }

    /// Emits an extra progress update (0-100).
    pub fn progress(&self, percent: u8) {
        self.reporter.progress(percent);
    }
}

/// A sync action built from a closure.
struct FnSyncAction<F>
where
    F: Fn(ActionContext) -> ActionResult + Send + Sync,
{
    func: F,
}

impl<F> Debug for FnSyncAction<F>
where
    F: Fn(ActionContext) -> ActionResult + Send + Sync,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnSyncAction").finish()
    }
}

impl<F> SyncAction for FnSyncAction<F>
where
    F: Fn(ActionContext) -> ActionResult + Send + Sync,
{
    fn run(&self, ctx: ActionContext) -> ActionResult {
        (self.func)(ctx)
    }
}

/// An async action built from a closure returning a future.
struct FnAsyncAction<F, Fut>
where
    F: Fn(ActionContext) -> Fut + Send + Sync,
    Fut: Future<Output = ActionResult> + Send,
{
    func: F,
    _phantom: PhantomData<fn() -> Fut>,
}

impl<F, Fut> Debug for FnAsyncAction<F, Fut>
where
    F: Fn(ActionContext) -> Fut + Send + Sync,
    Fut: Future<Output = ActionResult> + Send,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnAsyncAction").finish()
    }
}

#[async_trait]
impl<F, Fut> AsyncAction for FnAsyncAction<F, Fut>
where
    F: Fn(ActionContext) -> Fut + Send + Sync,
    Fut: Future<Output = ActionResult> + Send,
{
    async fn run(&self, ctx: ActionContext) -> ActionResult {
        (self.func)(ctx).await
    }
}

/// Whether the action runs inline or through the task bridge.
#[derive(Clone)]
pub(crate) enum ActionKind {
    Sync(Arc<dyn SyncAction>),
    Async(Arc<dyn AsyncAction>),
}

/// A named finish action, sync or async.
///
/// The variant is fixed at registration; the display name shows up in
/// the `Step {i} of {total}: {name}` status lines.
#[derive(Clone)]
pub struct FinishAction {
    name: String,
    kind: ActionKind,
}

impl FinishAction {
    /// Registers a synchronous closure as a finish action.
    pub fn sync<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(ActionContext) -> ActionResult + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            kind: ActionKind::Sync(Arc::new(FnSyncAction { func })),
        }
    }

    /// Registers an asynchronous closure as a finish action.
    pub fn asynchronous<F, Fut>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(ActionContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ActionResult> + Send + 'static,
    {
        Self {
            name: name.into(),
            kind: ActionKind::Async(Arc::new(FnAsyncAction {
                func,
                _phantom: PhantomData,
            })),
        }
    }

    /// Registers an existing [`SyncAction`] implementation.
    #[must_use]
    pub fn from_sync(name: impl Into<String>, action: Arc<dyn SyncAction>) -> Self {
        Self {
            name: name.into(),
            kind: ActionKind::Sync(action),
        }
    }

    /// Registers an existing [`AsyncAction`] implementation.
    #[must_use]
    pub fn from_async(name: impl Into<String>, action: Arc<dyn AsyncAction>) -> Self {
        Self {
            name: name.into(),
            kind: ActionKind::Async(action),
        }
    }

    /// Returns the display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns true if the action runs through the task bridge.
    #[must_use]
    pub const fn is_async(&self) -> bool {
        matches!(self.kind, ActionKind::Async(_))
    }

    pub(crate) const fn kind(&self) -> &ActionKind {
        &self.kind
    }
}

impl Debug for FinishAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.kind {
            ActionKind::Sync(_) => "sync",
            ActionKind::Async(_) => "async",
        };
        f.debug_struct("FinishAction")
            .field("name", &self.name)
            .field("kind", &kind)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::action_context;
    use serde_json::json;
    use std::collections::HashMap;

    #[test]
    fn test_sync_closure_action_runs() {
        let action = FinishAction::sync("bump", |ctx: ActionContext| {
            let value = ctx.get("value").and_then(|v| v.as_i64()).unwrap_or(0);
            ctx.set("value", json!(value + 1));
            Ok(())
        });
        assert_eq!(action.name(), "bump");
        assert!(!action.is_async());

        let (ctx, _events) = action_context(HashMap::new());
        let handle = ctx.clone();
        match action.kind() {
            ActionKind::Sync(inner) => inner.run(ctx).unwrap(),
            ActionKind::Async(_) => panic!("expected a sync action"),
        }
        assert_eq!(handle.get("value"), Some(json!(1)));
    }

    #[test]
    fn test_async_closure_action_runs() {
        let action = FinishAction::asynchronous("mark", |ctx: ActionContext| async move {
            tokio::task::yield_now().await;
            ctx.set("done", json!(true));
            Ok(())
        });
        assert!(action.is_async());

        let (ctx, _events) = action_context(HashMap::new());
        let handle = ctx.clone();
        match action.kind() {
            ActionKind::Async(inner) => tokio_test::block_on(inner.run(ctx)).unwrap(),
            ActionKind::Sync(_) => panic!("expected an async action"),
        }
        assert_eq!(handle.get("done"), Some(json!(true)));
    }

    #[test]
    fn test_action_context_emits_status_and_progress() {
        let (ctx, events) = action_context(HashMap::new());
        ctx.status("halfway there");
        ctx.progress(50);

        let drained = events.drain();
        assert_eq!(drained.len(), 2);
    }

    #[test]
    fn test_debug_hides_the_closure() {
        let action = FinishAction::sync("quiet", |_ctx| Ok(()));
        let rendered = format!("{action:?}");
        assert!(rendered.contains("quiet"));
        assert!(rendered.contains("sync"));
    }
}
