use super::dispatcher::LaunchDispatcher;
use crate::model::TriggerState;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// The activatable control bound to one pipeline.
///
/// Activations are independent: nothing here de-duplicates, queues or cancels them.
/// Disabling the trigger while a launch is in flight is left to the caller.
pub struct LaunchTrigger {
    state: TriggerState,
    dispatcher: Arc<LaunchDispatcher>,
}

impl LaunchTrigger {
    pub fn new(identifier: impl Into<String>, dispatcher: Arc<LaunchDispatcher>) -> Self {
        Self {
            state: TriggerState {
                identifier: identifier.into(),
                disabled: false,
            },
            dispatcher,
        }
    }

    pub fn state(&self) -> &TriggerState {
        &self.state
    }

    pub fn set_disabled(&mut self, disabled: bool) {
        self.state.disabled = disabled;
    }

    /// Fire a launch in the background. Returns `None` when the trigger is disabled.
    pub fn activate(&self) -> Option<JoinHandle<()>> {
        if self.state.disabled {
            return None;
        }
        let dispatcher = self.dispatcher.clone();
        let identifier = self.state.identifier.clone();
        Some(tokio::spawn(async move {
            dispatcher.launch(&identifier).await;
        }))
    }
}
