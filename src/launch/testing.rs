//! Recording fakes for the launch collaborators, plus an in-memory sink for output and logs.

use super::dispatcher::LaunchDispatcher;
use super::gate::LaunchGate;
use crate::diagnostics::DiagnosticSink;
use crate::handler::ResultHandler;
use crate::model::{DisplayDirective, LaunchOutcome, LaunchRequest, ParameterSet};
use crate::service::{ExecutionService, TransportError};
use async_trait::async_trait;
use std::io;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Semaphore;

enum Behavior {
    Resolve(LaunchOutcome),
    Reject(Box<dyn Fn() -> TransportError + Send + Sync>),
    Panic(String),
}

struct ServiceInner {
    behavior: Behavior,
    hold: Option<Arc<Semaphore>>,
    requests: Mutex<Vec<LaunchRequest>>,
}

#[derive(Clone)]
pub(crate) struct ScriptedService {
    inner: Arc<ServiceInner>,
}

impl ScriptedService {
    fn with(behavior: Behavior, hold: Option<Arc<Semaphore>>) -> Self {
        Self {
            inner: Arc::new(ServiceInner {
                behavior,
                hold,
                requests: Mutex::new(Vec::new()),
            }),
        }
    }

    pub fn resolving(outcome: LaunchOutcome) -> Self {
        Self::with(Behavior::Resolve(outcome), None)
    }

    pub fn rejecting(make: impl Fn() -> TransportError + Send + Sync + 'static) -> Self {
        Self::with(Behavior::Reject(Box::new(make)), None)
    }

    pub fn panicking(message: &str) -> Self {
        Self::with(Behavior::Panic(message.to_string()), None)
    }

    /// Resolves with `outcome` only once a permit is added to the returned semaphore.
    pub fn held(outcome: LaunchOutcome) -> (Self, Arc<Semaphore>) {
        let hold = Arc::new(Semaphore::new(0));
        (Self::with(Behavior::Resolve(outcome), Some(hold.clone())), hold)
    }

    pub fn requests(&self) -> Vec<LaunchRequest> {
        self.inner.requests.lock().unwrap().clone()
    }

    pub async fn wait_for_requests(&self, n: usize) {
        tokio::time::timeout(Duration::from_secs(5), async {
            while self.requests().len() < n {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("requests never arrived");
    }
}

#[async_trait]
impl ExecutionService for ScriptedService {
    async fn launch_pipeline_execution(
        &self,
        request: LaunchRequest,
    ) -> Result<LaunchOutcome, TransportError> {
        self.inner.requests.lock().unwrap().push(request);
        if let Some(hold) = &self.inner.hold {
            hold.acquire().await.unwrap().forget();
        }
        match &self.inner.behavior {
            Behavior::Resolve(outcome) => Ok(outcome.clone()),
            Behavior::Reject(make) => Err(make()),
            Behavior::Panic(message) => panic!("{}", message),
        }
    }
}

pub(crate) type HandlerCall = (String, LaunchOutcome, DisplayDirective);

#[derive(Clone, Default)]
pub(crate) struct RecordingHandler {
    calls: Arc<Mutex<Vec<HandlerCall>>>,
}

impl RecordingHandler {
    pub fn calls(&self) -> Vec<HandlerCall> {
        self.calls.lock().unwrap().clone()
    }
}

impl ResultHandler for RecordingHandler {
    fn handle_execution_result(
        &self,
        identifier: &str,
        outcome: LaunchOutcome,
        directive: DisplayDirective,
    ) {
        self.calls
            .lock()
            .unwrap()
            .push((identifier.to_string(), outcome, directive));
    }
}

#[derive(Clone, Default)]
pub(crate) struct RecordingDiagnostics {
    entries: Arc<Mutex<Vec<(String, String)>>>,
}

impl RecordingDiagnostics {
    pub fn entries(&self) -> Vec<(String, String)> {
        self.entries.lock().unwrap().clone()
    }
}

impl DiagnosticSink for RecordingDiagnostics {
    fn report_transport_failure(&self, identifier: &str, error: &TransportError) {
        self.entries
            .lock()
            .unwrap()
            .push((identifier.to_string(), error.to_string()));
    }
}

pub(crate) fn dispatcher_with<F>(
    source: F,
    service: &ScriptedService,
    handler: &RecordingHandler,
    diagnostics: &RecordingDiagnostics,
) -> LaunchDispatcher
where
    F: Fn() -> Option<ParameterSet> + Send + Sync + 'static,
{
    LaunchDispatcher::new(
        LaunchGate::new(Arc::new(source)),
        Arc::new(service.clone()),
        Arc::new(handler.clone()),
        Arc::new(diagnostics.clone()),
    )
}

/// Cloneable in-memory `Write` sink; also usable as a tracing `MakeWriter`.
#[derive(Clone, Default)]
pub(crate) struct SharedBuffer {
    buf: Arc<Mutex<Vec<u8>>>,
}

impl SharedBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.buf.lock().unwrap()).into_owned()
    }
}

impl io::Write for SharedBuffer {
    fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
        self.buf.lock().unwrap().extend_from_slice(bytes);
        Ok(bytes.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for SharedBuffer {
    type Writer = SharedBuffer;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}
