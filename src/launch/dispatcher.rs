use super::gate::LaunchGate;
use crate::diagnostics::DiagnosticSink;
use crate::handler::ResultHandler;
use crate::model::{DisplayDirective, LaunchRequest};
use crate::service::{ExecutionService, TransportError};
use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

/// Runs one activation: gate, submit once, then hand the outcome on.
pub struct LaunchDispatcher {
    gate: LaunchGate,
    service: Arc<dyn ExecutionService>,
    handler: Arc<dyn ResultHandler>,
    diagnostics: Arc<dyn DiagnosticSink>,
}

impl LaunchDispatcher {
    pub fn new(
        gate: LaunchGate,
        service: Arc<dyn ExecutionService>,
        handler: Arc<dyn ResultHandler>,
        diagnostics: Arc<dyn DiagnosticSink>,
    ) -> Self {
        Self {
            gate,
            service,
            handler,
            diagnostics,
        }
    }

    /// Launch `identifier` with whatever parameters the gate yields right now.
    ///
    /// Never fails from the caller's point of view: missing parameters end the
    /// activation silently, structured outcomes go to the result handler, and
    /// transport failures go to the diagnostic sink.
    pub async fn launch(&self, identifier: &str) {
        let Some(params) = self.gate.try_acquire_parameters() else {
            tracing::debug!(pipeline = identifier, "parameters not ready, skipping launch");
            return;
        };

        let request = LaunchRequest::new(params);
        // A panicking service must not take the caller down with it.
        let submitted = AssertUnwindSafe(self.service.launch_pipeline_execution(request))
            .catch_unwind()
            .await
            .unwrap_or_else(|payload| Err(TransportError::Panicked(panic_message(payload.as_ref()))));

        match submitted {
            Ok(outcome) => {
                self.handler
                    .handle_execution_result(identifier, outcome, DisplayDirective::NEW_WINDOW);
            }
            Err(e) => self.diagnostics.report_transport_failure(identifier, &e),
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
