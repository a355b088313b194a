//! Core domain model types for wizflow.
//!
//! This module contains the types shared across the framework:
//! - Run identity
//! - Per-step run info handed to actions
//! - Run events streamed from the worker thread
//! - The terminal run outcome

mod event;
mod identity;
mod info;
mod outcome;

pub use event::{RunEvent, RunPayload};
pub use identity::RunId;
pub use info::RunInfo;
pub use outcome::RunOutcome;
