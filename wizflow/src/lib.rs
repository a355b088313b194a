//! # Wizflow
//!
//! A wizard framework core: step sequencing in front, a threaded
//! pipeline runner behind.
//!
//! Wizflow drives the classic desktop wizard shape with support for:
//!
//! - **Step sequencing**: Forward/back navigation over declared steps
//! - **Validation**: Per-step verdicts that keep the user on bad input
//! - **Threaded pipeline runs**: Finish actions execute off the UI thread
//! - **Async actions**: A shared bridge thread schedules async work
//! - **Event streaming**: Progress, status and terminal events per run
//! - **Localization**: Layered locale catalogs with English fallback
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use wizflow::prelude::*;
//!
//! // Describe the flow
//! let flow = FlowDefinition::new("onboarding")
//!     .with_step(StepDefinition::new("name", "Your name", StepKind::text()))
//!     .with_action(FinishAction::sync("greet", |ctx| {
//!         ctx.status("Greeting...");
//!         ctx.set("greeting", serde_json::json!("Hello!"));
//!         Ok(())
//!     }));
//!
//! // Drive it from your UI event handlers
//! let mut wizard = WizardController::new(flow);
//! wizard.forward(&mut frontend)?;
//! let outcome = wizard.wait_for_outcome(&mut frontend);
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod actions;
pub mod bridge;
pub mod config;
pub mod context;
pub mod controller;
pub mod core;
pub mod errors;
pub mod events;
pub mod flow;
pub mod i18n;
pub mod resources;
pub mod runner;
pub mod testing;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::actions::{
        ActionContext, ActionResult, AsyncAction, FinishAction, SyncAction,
    };
    pub use crate::bridge::TaskBridge;
    pub use crate::config::WizardConfig;
    pub use crate::context::FlowContext;
    pub use crate::controller::{WizardController, WizardFrontend, WizardState};
    pub use crate::core::{RunEvent, RunId, RunInfo, RunOutcome, RunPayload};
    pub use crate::errors::{ActionError, WizardError};
    pub use crate::events::{EventPoll, RunEvents, RunReporter};
    pub use crate::flow::{
        FlowDefinition, FormInput, StepDefinition, StepKind, Verdict,
    };
    pub use crate::i18n::Catalog;
    pub use crate::resources::ResourceResolver;
    pub use crate::runner::{PipelineRun, PipelineRunner};
}

#[cfg(test)]
mod tests {
    use crate::prelude::*;

    #[test]
    fn test_prelude_builds_a_flow() {
        let flow = FlowDefinition::new("smoke")
            .with_step(StepDefinition::new("key", "Title", StepKind::text()));
        assert_eq!(flow.step_count(), 1);
    }
}
