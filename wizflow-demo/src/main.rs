//! Console demo: a one-step greeting wizard with an async pipeline.
//!
//! Set `WIZFLOW_LANG` and point `WIZFLOW_RESOURCES_DIR` at a directory
//! with a `locales/` folder to see the framework messages translated.

use anyhow::Result;
use serde_json::json;
use std::io::{self, Write};
use std::time::Duration;
use tracing::info;
use wizflow::flow::validation;
use wizflow::prelude::*;

struct ConsoleFrontend {
    input: io::Stdin,
    eof: bool,
}

impl ConsoleFrontend {
    fn new() -> Self {
        Self {
            input: io::stdin(),
            eof: false,
        }
    }

    fn read_line(&mut self, prompt: &str) -> String {
        print!("{prompt}");
        let _ = io::stdout().flush();
        let mut line = String::new();
        match self.input.read_line(&mut line) {
            Ok(0) | Err(_) => {
                self.eof = true;
                String::new()
            }
            Ok(_) => line.trim().to_string(),
        }
    }
}

impl WizardFrontend for ConsoleFrontend {
    fn step_value(&mut self, step: &StepDefinition) -> serde_json::Value {
        println!("\n== {} ==", step.title());
        if let StepKind::Text { placeholder, .. } = step.kind() {
            if !placeholder.is_empty() {
                println!("({placeholder})");
            }
        }
        json!(self.read_line("> "))
    }

    fn confirm_run(&mut self) -> bool {
        let answer = self.read_line("Run the pipeline now? [y/N] ");
        answer.eq_ignore_ascii_case("y") || answer.eq_ignore_ascii_case("yes")
    }

    fn show_warning(&mut self, message: &str) {
        println!("[warning] {message}");
    }

    fn show_success(&mut self, message: &str) {
        println!("[success] {message}");
    }

    fn show_error(&mut self, message: &str) {
        println!("[error] {message}");
    }

    fn set_progress(&mut self, percent: u8) {
        println!("[{percent:>3}%]");
    }

    fn set_status(&mut self, text: &str) {
        println!("  {text}");
    }
}

fn simple_flow() -> FlowDefinition {
    FlowDefinition::new("simple_flow")
        .with_step(
            StepDefinition::new(
                "greet_step",
                "Greet User",
                StepKind::Text {
                    placeholder: "Enter your name".to_string(),
                    help_text: String::new(),
                },
            )
            .with_validator(validation::non_empty("Please enter a name")),
        )
        .with_action(FinishAction::asynchronous(
            "greet_user",
            |ctx: ActionContext| async move {
                let name = ctx
                    .get("greet_step")
                    .and_then(|v| v.as_str().map(str::to_string))
                    .unwrap_or_else(|| "stranger".to_string());
                ctx.status(format!("Preparing a greeting for {name}"));
                ctx.progress(30);
                tokio::time::sleep(Duration::from_millis(300)).await;
                ctx.set("greeting", json!(format!("Hello, {name}!")));
                Ok(())
            },
        ))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let mut wizard = WizardController::with_config(simple_flow(), WizardConfig::new())?;
    let mut frontend = ConsoleFrontend::new();

    println!("wizflow demo: {}", wizard.flow().name());
    loop {
        wizard.forward(&mut frontend)?;
        if wizard.is_running() {
            match wizard.wait_for_outcome(&mut frontend) {
                Some(RunOutcome::Success(context)) => {
                    if let Some(greeting) = context.get("greeting").and_then(|v| v.as_str()) {
                        println!("{greeting}");
                    }
                    info!("demo flow finished");
                }
                Some(RunOutcome::Failure(message)) => {
                    info!(%message, "demo flow failed");
                }
                None => {}
            }
            break;
        }
        if frontend.eof {
            println!();
            break;
        }
    }
    Ok(())
}
