//! Trigger lifecycle controller.
//!
//! Owns the trigger, turns commands from an input layer into activations, and keeps
//! in-flight launches alive until they resolve.

use crate::launch::LaunchTrigger;
use futures::stream::{FuturesUnordered, StreamExt};
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::time::Duration;

/// Commands emitted by input layers to drive the trigger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum TriggerCommand {
    Activate,
    SetDisabled(bool),
    Quit,
}

/// Drive `trigger` from `cmd_rx` until quit, then wait for in-flight launches.
///
/// Returns the number of activations that actually started a launch attempt.
pub(crate) async fn run_controller(
    mut trigger: LaunchTrigger,
    mut cmd_rx: UnboundedReceiver<TriggerCommand>,
) -> usize {
    let mut in_flight = FuturesUnordered::new();
    let mut activations = 0usize;
    let mut quit_pending = false;
    // Drain watchdog: launches are never cancelled, so report when one is slow to resolve.
    let mut drain_deadline: Option<tokio::time::Instant> = None;
    let mut watchdog = tokio::time::interval(Duration::from_millis(500));

    loop {
        if quit_pending && in_flight.is_empty() {
            break;
        }
        tokio::select! {
            cmd = cmd_rx.recv(), if !quit_pending => {
                match cmd {
                    Some(TriggerCommand::Activate) => match trigger.activate() {
                        Some(handle) => {
                            activations += 1;
                            in_flight.push(handle);
                        }
                        None => {
                            tracing::info!(
                                pipeline = %trigger.state().identifier,
                                "trigger is disabled, ignoring activation"
                            );
                        }
                    },
                    Some(TriggerCommand::SetDisabled(disabled)) => {
                        trigger.set_disabled(disabled);
                        tracing::info!(
                            pipeline = %trigger.state().identifier,
                            disabled,
                            "trigger state changed"
                        );
                    }
                    Some(TriggerCommand::Quit) | None => {
                        quit_pending = true;
                        if !in_flight.is_empty() {
                            tracing::info!(in_flight = in_flight.len(), "waiting for in-flight launches");
                            drain_deadline = Some(tokio::time::Instant::now() + Duration::from_secs(3));
                        }
                    }
                }
            }
            Some(joined) = in_flight.next(), if !in_flight.is_empty() => {
                if let Err(e) = joined {
                    tracing::error!(error = %e, "launch task failed");
                }
            }
            _ = watchdog.tick() => {
                if let Some(deadline) = drain_deadline {
                    if tokio::time::Instant::now() >= deadline && !in_flight.is_empty() {
                        tracing::warn!(in_flight = in_flight.len(), "still waiting for in-flight launches");
                        drain_deadline = None;
                    }
                }
            }
        }
    }

    activations
}
