//! Presentation of launch outcomes.

use crate::model::{DisplayDirective, LaunchOutcome};
use crate::output::OutputLine;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::mpsc::UnboundedSender;

/// Receives every structured outcome produced by a launch.
///
/// Called synchronously from the dispatcher; implementations should hand work off
/// rather than block.
pub trait ResultHandler: Send + Sync {
    fn handle_execution_result(
        &self,
        identifier: &str,
        outcome: LaunchOutcome,
        directive: DisplayDirective,
    );
}

/// Renders outcomes to the terminal through the output writer.
pub(crate) struct ConsoleResultHandler {
    base_url: String,
    json: bool,
    out_tx: UnboundedSender<OutputLine>,
    launched: AtomicUsize,
    failed: AtomicUsize,
}

impl ConsoleResultHandler {
    pub fn new(base_url: &str, json: bool, out_tx: UnboundedSender<OutputLine>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            json,
            out_tx,
            launched: AtomicUsize::new(0),
            failed: AtomicUsize::new(0),
        }
    }

    pub fn run_url(&self, identifier: &str, run_id: &str) -> String {
        format!("{}/runs/{}/{}", self.base_url, identifier, run_id)
    }

    pub fn launched(&self) -> usize {
        self.launched.load(Ordering::Relaxed)
    }

    pub fn failed(&self) -> usize {
        self.failed.load(Ordering::Relaxed)
    }

    fn render(
        &self,
        identifier: &str,
        outcome: &LaunchOutcome,
        directive: DisplayDirective,
    ) -> Vec<OutputLine> {
        if self.json {
            let mut obj = serde_json::json!({
                "pipeline": identifier,
                "outcome": outcome,
                "open_in_new_window": directive.open_in_new_window,
            });
            if let LaunchOutcome::Success { run_id } = outcome {
                obj["url"] = serde_json::Value::String(self.run_url(identifier, run_id.as_str()));
            }
            return vec![OutputLine::Stdout(obj.to_string())];
        }

        match outcome {
            LaunchOutcome::Success { run_id } => {
                let url = self.run_url(identifier, run_id.as_str());
                if directive.open_in_new_window {
                    // The bare URL on stdout is the new viewing context; status stays on stderr.
                    vec![
                        OutputLine::Stderr(format!("Launched {identifier}: run {run_id}")),
                        OutputLine::Stdout(url),
                    ]
                } else {
                    vec![OutputLine::Stderr(format!(
                        "Launched {identifier}: run {run_id} ({url})"
                    ))]
                }
            }
            LaunchOutcome::Failure { detail } => {
                let mut lines = vec![OutputLine::Stderr(format!(
                    "Launch of {identifier} failed"
                ))];
                if detail.errors.is_empty() {
                    lines.push(OutputLine::Stderr(format!("  {}", detail.message)));
                } else {
                    lines.extend(
                        detail
                            .errors
                            .iter()
                            .map(|e| OutputLine::Stderr(format!("  - {e}"))),
                    );
                }
                lines
            }
        }
    }
}

impl ResultHandler for ConsoleResultHandler {
    fn handle_execution_result(
        &self,
        identifier: &str,
        outcome: LaunchOutcome,
        directive: DisplayDirective,
    ) {
        match &outcome {
            LaunchOutcome::Success { .. } => self.launched.fetch_add(1, Ordering::Relaxed),
            LaunchOutcome::Failure { .. } => self.failed.fetch_add(1, Ordering::Relaxed),
        };
        for line in self.render(identifier, &outcome, directive) {
            let _ = self.out_tx.send(line);
        }
    }
}
