//! Application-level orchestration.
//!
//! The controller owns the trigger for interactive sessions and the input module feeds it
//! commands read from stdin. CLI layers call into this module instead of touching the
//! trigger directly.

mod controller;
mod input;

pub(crate) use controller::{run_controller, TriggerCommand};
pub(crate) use input::{forward_stdin, HELP};
