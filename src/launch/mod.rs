//! Launch core.
//!
//! The gate decides whether parameters are ready, the dispatcher submits them and routes
//! the outcome, and the trigger is the activatable surface that spawns one dispatch per
//! activation.

mod dispatcher;
mod gate;
mod trigger;

#[cfg(test)]
pub(crate) mod testing;

pub(crate) use dispatcher::LaunchDispatcher;
pub(crate) use gate::{LaunchGate, ParameterSource};
pub(crate) use trigger::LaunchTrigger;
