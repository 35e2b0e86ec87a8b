//! Developer-facing side channel for launches that failed below the outcome protocol.

use crate::service::TransportError;

pub trait DiagnosticSink: Send + Sync {
    fn report_transport_failure(&self, identifier: &str, error: &TransportError);
}

/// Writes transport failures to the tracing subscriber.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingDiagnostics;

impl DiagnosticSink for TracingDiagnostics {
    fn report_transport_failure(&self, identifier: &str, error: &TransportError) {
        tracing::error!(pipeline = identifier, error = %error, "Error launching run");
    }
}
