//! Headless mode - drive a navigator from a script and print NDJSON
//!
//! Every navigation lifecycle event, display transition and failed step is
//! written to stdout as one JSON object per line. The run ends with a `stack`
//! line describing both stacks.
//!
//! # Example Output
//!
//! ```json
//! {"event":"navigation","kind":"started_navigation","operation":"init","url":"Root","page_variant":null,"view_model_variant":null,"timestamp":1704700001000}
//! {"event":"display","call":"root","url":"Root","modal":null,"timestamp":1704700001002}
//! {"event":"step_failed","step":3,"action":"pop","error":"Invalid operation: Cannot pop the root page of the navigation stack","recoverable":true,"timestamp":1704700001010}
//! {"event":"stack","root_url":"Root","primary":["Root"],"modal":[],"timestamp":1704700001011}
//! ```

pub mod runner;
pub mod script;

pub use runner::run_script;
pub use script::{load_script, parse_script, Script, Step};

use chrono::Utc;
use serde::Serialize;
use std::io::{self, Write};
use tracing::error;

use pagenav_app::{NavEvent, StackSnapshot};
use pagenav_core::Error;

/// Events emitted in headless mode
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum HeadlessEvent {
    /// A navigation lifecycle event
    Navigation {
        kind: String,
        operation: String,
        url: String,
        page_variant: Option<String>,
        view_model_variant: Option<String>,
        timestamp: i64,
    },

    /// A call the navigator made on the display adapter
    Display {
        call: String,
        url: Option<String>,
        modal: Option<bool>,
        timestamp: i64,
    },

    /// A script step returned an error
    StepFailed {
        step: usize,
        action: String,
        error: String,
        recoverable: bool,
        timestamp: i64,
    },

    /// Final state of both stacks
    Stack {
        root_url: Option<String>,
        primary: Vec<String>,
        modal: Vec<String>,
        timestamp: i64,
    },

    /// The run itself failed
    Error {
        message: String,
        fatal: bool,
        timestamp: i64,
    },
}

impl HeadlessEvent {
    /// Emit this event to stdout as JSON
    pub fn emit(&self) {
        let json = match serde_json::to_string(self) {
            Ok(json) => json,
            Err(e) => {
                error!("Failed to serialize headless event: {}", e);
                return;
            }
        };

        // NDJSON: one event per line
        let mut stdout = io::stdout().lock();
        if let Err(e) = writeln!(stdout, "{}", json) {
            error!("Failed to write headless event to stdout: {}", e);
            return;
        }

        if let Err(e) = stdout.flush() {
            error!("Failed to flush headless stdout: {}", e);
        }
    }

    /// Get current timestamp in milliseconds
    fn now() -> i64 {
        Utc::now().timestamp_millis()
    }

    // ─────────────────────────────────────────────────────────
    // Convenience constructors
    // ─────────────────────────────────────────────────────────

    pub fn navigation(event: &NavEvent) -> Self {
        Self::Navigation {
            kind: event.kind.as_str().to_string(),
            operation: event.operation.as_str().to_string(),
            url: event.url.clone(),
            page_variant: event.page_variant.clone(),
            view_model_variant: event.view_model_variant.clone(),
            timestamp: event.timestamp.timestamp_millis(),
        }
    }

    pub fn display(call: &str, url: Option<&str>, modal: Option<bool>) -> Self {
        Self::Display {
            call: call.to_string(),
            url: url.map(str::to_string),
            modal,
            timestamp: Self::now(),
        }
    }

    pub fn step_failed(step: usize, action: &str, error: &Error) -> Self {
        Self::StepFailed {
            step,
            action: action.to_string(),
            error: error.to_string(),
            recoverable: error.is_recoverable(),
            timestamp: Self::now(),
        }
    }

    pub fn stack(snapshot: &StackSnapshot) -> Self {
        Self::Stack {
            root_url: snapshot.root_url.clone(),
            primary: snapshot.primary_urls().into_iter().map(String::from).collect(),
            modal: snapshot.modal_urls().into_iter().map(String::from).collect(),
            timestamp: Self::now(),
        }
    }

    pub fn error(message: String, fatal: bool) -> Self {
        Self::Error {
            message,
            fatal,
            timestamp: Self::now(),
        }
    }

    /// The `event` tag this variant serializes with
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::Navigation { .. } => "navigation",
            Self::Display { .. } => "display",
            Self::StepFailed { .. } => "step_failed",
            Self::Stack { .. } => "stack",
            Self::Error { .. } => "error",
        }
    }
}
