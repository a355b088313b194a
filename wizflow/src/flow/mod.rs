//! Flow, step, and step-kind definitions.
//!
//! A flow is an ordered list of steps plus an ordered list of finish
//! actions. Steps carry a data-only description of the widget a
//! frontend should render; the framework itself never renders anything.

pub mod validation;

pub use validation::Verdict;

use crate::actions::FinishAction;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// A step value validator: inspects the candidate value and either
/// accepts it or rejects it with a message for the user.
pub type Validator = Arc<dyn Fn(&serde_json::Value) -> Verdict + Send + Sync>;

/// One input field of a form step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormInput {
    /// Key of this field inside the step's value map.
    pub key: String,
    /// Label shown next to the field.
    pub label: String,
    /// Placeholder text.
    #[serde(default)]
    pub placeholder: String,
    /// Maximum input length.
    #[serde(default = "default_max_length")]
    pub max_length: usize,
    /// Whether the field hides its characters.
    #[serde(default)]
    pub secret: bool,
}

fn default_max_length() -> usize {
    255
}

impl FormInput {
    /// Creates a form input with default presentation.
    #[must_use]
    pub fn new(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            placeholder: String::new(),
            max_length: default_max_length(),
            secret: false,
        }
    }

    /// Sets the placeholder text.
    #[must_use]
    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    /// Sets the maximum input length.
    #[must_use]
    pub const fn with_max_length(mut self, max_length: usize) -> Self {
        self.max_length = max_length;
        self
    }

    /// Marks the field as secret (password-style echo).
    #[must_use]
    pub const fn secret(mut self) -> Self {
        self.secret = true;
        self
    }
}

/// What kind of widget a step asks the frontend to render.
///
/// Frontends match on the variant and build their own widget from the
/// carried payload; the framework only transports these descriptions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StepKind {
    /// A single-line text input. The step value is a string.
    Text {
        /// Placeholder text.
        #[serde(default)]
        placeholder: String,
        /// Help text shown under the input.
        #[serde(default)]
        help_text: String,
    },

    /// A multi-field form. The step value is a map keyed by input key.
    Form {
        /// The form's input fields, in render order.
        inputs: Vec<FormInput>,
    },

    /// A file picker. The step value is the selected path as a string.
    File {
        /// Help text shown under the picker.
        #[serde(default)]
        help_text: String,
        /// Title of the file dialog.
        dialog_title: String,
        /// Dialog filter, e.g. `All Files (*)`.
        file_filter: String,
    },
}

impl StepKind {
    /// A plain text input with no placeholder or help text.
    #[must_use]
    pub const fn text() -> Self {
        Self::Text {
            placeholder: String::new(),
            help_text: String::new(),
        }
    }

    /// A form built from the given inputs.
    #[must_use]
    pub const fn form(inputs: Vec<FormInput>) -> Self {
        Self::Form { inputs }
    }

    /// A file picker with the default dialog title and filter.
    #[must_use]
    pub fn file() -> Self {
        Self::File {
            help_text: String::new(),
            dialog_title: "Select a file".to_string(),
            file_filter: "All Files (*)".to_string(),
        }
    }
}

/// One step of a wizard flow.
///
/// Immutable once constructed. The key names the slot the collected
/// value lands in; the optional validator gates advancement.
#[derive(Clone)]
pub struct StepDefinition {
    key: String,
    title: String,
    kind: StepKind,
    validator: Option<Validator>,
}

impl StepDefinition {
    /// Creates a step with no validator.
    #[must_use]
    pub fn new(key: impl Into<String>, title: impl Into<String>, kind: StepKind) -> Self {
        Self {
            key: key.into(),
            title: title.into(),
            kind,
            validator: None,
        }
    }

    /// Attaches a validator to the step.
    #[must_use]
    pub fn with_validator(
        mut self,
        validator: impl Fn(&serde_json::Value) -> Verdict + Send + Sync + 'static,
    ) -> Self {
        self.validator = Some(Arc::new(validator));
        self
    }

    /// Returns the step's context key.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Returns the step's title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the widget description.
    #[must_use]
    pub const fn kind(&self) -> &StepKind {
        &self.kind
    }

    /// Returns true if the step has a validator.
    #[must_use]
    pub const fn has_validator(&self) -> bool {
        self.validator.is_some()
    }

    /// Runs the step's validator against a candidate value.
    ///
    /// Steps without a validator accept everything.
    #[must_use]
    pub fn validate(&self, value: &serde_json::Value) -> Verdict {
        match &self.validator {
            Some(validator) => validator(value),
            None => Verdict::Accepted,
        }
    }
}

impl fmt::Debug for StepDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StepDefinition")
            .field("key", &self.key)
            .field("title", &self.title)
            .field("kind", &self.kind)
            .field("has_validator", &self.validator.is_some())
            .finish()
    }
}

/// A complete wizard flow: named, with ordered steps and an ordered
/// finish pipeline. Both lists may be empty.
#[derive(Debug, Clone, Default)]
pub struct FlowDefinition {
    name: String,
    steps: Vec<StepDefinition>,
    pipeline: Vec<FinishAction>,
}

impl FlowDefinition {
    /// Creates an empty flow.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            steps: Vec::new(),
            pipeline: Vec::new(),
        }
    }

    /// Appends a step.
    #[must_use]
    pub fn with_step(mut self, step: StepDefinition) -> Self {
        self.steps.push(step);
        self
    }

    /// Appends a finish action to the pipeline.
    #[must_use]
    pub fn with_action(mut self, action: FinishAction) -> Self {
        self.pipeline.push(action);
        self
    }

    /// Returns the flow's name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the steps in order.
    #[must_use]
    pub fn steps(&self) -> &[StepDefinition] {
        &self.steps
    }

    /// Returns the step at `index`, if any.
    #[must_use]
    pub fn step(&self, index: usize) -> Option<&StepDefinition> {
        self.steps.get(index)
    }

    /// Returns the number of steps.
    #[must_use]
    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    /// Returns the finish pipeline in order.
    #[must_use]
    pub fn pipeline(&self) -> &[FinishAction] {
        &self.pipeline
    }

    /// Returns the number of finish actions.
    #[must_use]
    pub fn action_count(&self) -> usize {
        self.pipeline.len()
    }
}
