//! The task bridge: one persistent thread driving asynchronous work.
//!
//! Wizard pipelines run on plain worker threads, but some finish
//! actions are async. Rather than spinning a runtime per call, a
//! single bridge thread hosts a cooperative scheduler for the life of
//! the controller. Any thread may [`TaskBridge::submit`] a future; the
//! submitting thread blocks until that future resolves while the
//! bridge thread keeps interleaving everyone else's tasks.

use crate::errors::WizardError;
use futures::future::BoxFuture;
use parking_lot::Mutex;
use std::future::Future;
use std::thread::{self, JoinHandle};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error};

type BridgeTask = BoxFuture<'static, ()>;

struct BridgeHandle {
    intake: mpsc::UnboundedSender<BridgeTask>,
    worker: Option<JoinHandle<()>>,
}

enum BridgeState {
    Idle,
    Running(BridgeHandle),
    Stopped,
}

/// A persistent background thread that drives submitted futures.
///
/// The thread starts lazily on first use and lives until [`stop`] or
/// drop. Stopping is terminal: a stopped bridge refuses further
/// submissions instead of restarting.
///
/// [`stop`]: TaskBridge::stop
pub struct TaskBridge {
    state: Mutex<BridgeState>,
}

impl TaskBridge {
    /// Creates a bridge without starting its thread.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: Mutex::new(BridgeState::Idle),
        }
    }

    /// Starts the bridge thread if it is not already running.
    ///
    /// # Errors
    ///
    /// Returns [`WizardError::BridgeStopped`] after [`stop`], or an IO
    /// error if the thread cannot be spawned.
    ///
    /// [`stop`]: TaskBridge::stop
    pub fn start(&self) -> Result<(), WizardError> {
        self.sender().map(|_| ())
    }

    /// Returns true while the bridge thread is alive.
    #[must_use]
    pub fn is_running(&self) -> bool {
        matches!(*self.state.lock(), BridgeState::Running(_))
    }

    /// Runs a future on the bridge thread, blocking the caller until it
    /// resolves.
    ///
    /// Callable from any thread except the bridge thread itself;
    /// submissions from concurrent callers interleave on the scheduler
    /// without waiting on one another.
    ///
    /// # Errors
    ///
    /// Returns [`WizardError::BridgeStopped`] if the bridge has been
    /// stopped, or stops before the future resolves.
    pub fn submit<T, F>(&self, future: F) -> Result<T, WizardError>
    where
        T: Send + 'static,
        F: Future<Output = T> + Send + 'static,
    {
        let intake = self.sender()?;
        let (done_tx, done_rx) = oneshot::channel();
        let task: BridgeTask = Box::pin(async move {
            let _ = done_tx.send(future.await);
        });
        intake.send(task).map_err(|_| WizardError::BridgeStopped)?;
        done_rx.blocking_recv().map_err(|_| WizardError::BridgeStopped)
    }

    /// Stops the scheduler and joins the bridge thread.
    ///
    /// Queued and in-flight tasks are abandoned; their submitters get
    /// [`WizardError::BridgeStopped`]. Idempotent, and terminal: the
    /// bridge will not restart afterwards.
    pub fn stop(&self) {
        let handle = {
            let mut state = self.state.lock();
            match std::mem::replace(&mut *state, BridgeState::Stopped) {
                BridgeState::Running(handle) => Some(handle),
                BridgeState::Idle | BridgeState::Stopped => None,
            }
        };

        if let Some(mut handle) = handle {
            drop(handle.intake);
            if let Some(worker) = handle.worker.take() {
                if worker.join().is_err() {
                    error!("task bridge thread panicked during shutdown");
                }
            }
        }
    }

    /// Fetches the intake sender, spawning the bridge thread on first
    /// use. The lock is released before any blocking happens.
    fn sender(&self) -> Result<mpsc::UnboundedSender<BridgeTask>, WizardError> {
        let mut state = self.state.lock();
        match &mut *state {
            BridgeState::Running(handle) => Ok(handle.intake.clone()),
            BridgeState::Stopped => Err(WizardError::BridgeStopped),
            BridgeState::Idle => {
                let (intake, rx) = mpsc::unbounded_channel();
                let worker = thread::Builder::new()
                    .name("wizflow-bridge".to_string())
                    .spawn(move || bridge_loop(rx))
                    .map_err(WizardError::Io)?;
                let sender = intake.clone();
                *state = BridgeState::Running(BridgeHandle {
                    intake,
                    worker: Some(worker),
                });
                Ok(sender)
            }
        }
    }
}

impl Default for TaskBridge {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for TaskBridge {
    fn drop(&mut self) {
        self.stop();
    }
}

impl std::fmt::Debug for TaskBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = match *self.state.lock() {
            BridgeState::Idle => "idle",
            BridgeState::Running(_) => "running",
            BridgeState::Stopped => "stopped",
        };
        f.debug_struct("TaskBridge").field("state", &state).finish()
    }
}

fn bridge_loop(mut intake: mpsc::UnboundedReceiver<BridgeTask>) {
    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(err) => {
            error!(%err, "failed to build the task bridge runtime");
            return;
        }
    };

    debug!("task bridge thread started");
    runtime.block_on(async move {
        while let Some(task) = intake.recv().await {
            tokio::spawn(task);
        }
    });
    debug!("task bridge thread stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::{Duration, Instant};

    #[test]
    fn test_submit_returns_the_future_result() {
        let bridge = TaskBridge::new();
        let result = bridge.submit(async { 40 + 2 });
        assert_eq!(result.unwrap(), 42);
    }

    #[test]
    fn test_start_is_idempotent() {
        let bridge = TaskBridge::new();
        bridge.start().unwrap();
        bridge.start().unwrap();
        assert!(bridge.is_running());
    }

    #[test]
    fn test_submitted_future_may_yield_and_sleep() {
        let bridge = TaskBridge::new();
        let result = bridge.submit(async {
            tokio::task::yield_now().await;
            tokio::time::sleep(Duration::from_millis(5)).await;
            true
        });
        assert!(result.unwrap());
    }

    #[test]
    fn test_concurrent_submissions_interleave() {
        let bridge = Arc::new(TaskBridge::new());
        bridge.start().unwrap();

        let start = Instant::now();
        let mut handles = Vec::new();
        for i in 0..4_u32 {
            let bridge = Arc::clone(&bridge);
            handles.push(thread::spawn(move || {
                bridge.submit(async move {
                    tokio::time::sleep(Duration::from_millis(100)).await;
                    i
                })
            }));
        }

        let mut results: Vec<u32> = handles
            .into_iter()
            .map(|h| h.join().unwrap().unwrap())
            .collect();
        results.sort_unstable();
        assert_eq!(results, vec![0, 1, 2, 3]);

        // Four 100ms sleeps sharing one scheduler finish together, not
        // one after another.
        assert!(start.elapsed() < Duration::from_millis(350));
    }

    #[test]
    fn test_submit_after_stop_fails() {
        let bridge = TaskBridge::new();
        bridge.start().unwrap();
        bridge.stop();
        let result = bridge.submit(async { 1 });
        assert!(matches!(result, Err(WizardError::BridgeStopped)));
        assert!(!bridge.is_running());
    }

    #[test]
    fn test_stop_before_start_is_fine() {
        let bridge = TaskBridge::new();
        bridge.stop();
        assert!(matches!(
            bridge.submit(async { 1 }),
            Err(WizardError::BridgeStopped)
        ));
    }

    #[test]
    fn test_stop_is_idempotent() {
        let bridge = TaskBridge::new();
        bridge.start().unwrap();
        bridge.stop();
        bridge.stop();
    }
}
