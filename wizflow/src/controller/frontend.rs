use crate::flow::StepDefinition;

/// What the controller needs from a user interface.
///
/// Implementations stay passive: the controller calls in, reads the
/// current input, shows messages and relays run events. No method
/// should re-enter the controller.
pub trait WizardFrontend {
    /// Current value of the input widget for `step`.
    fn step_value(&mut self, step: &StepDefinition) -> serde_json::Value;

    /// Asks whether to run the pipeline now. True means run.
    fn confirm_run(&mut self) -> bool;

    /// Shows a validation warning; the wizard stays on the step.
    fn show_warning(&mut self, message: &str);

    /// Shows a success message.
    fn show_success(&mut self, message: &str);

    /// Shows an error message.
    fn show_error(&mut self, message: &str);

    /// Moves the progress bar while a pipeline runs.
    fn set_progress(&mut self, percent: u8);

    /// Updates the status line while a pipeline runs.
    fn set_status(&mut self, text: &str);
}
