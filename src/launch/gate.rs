use crate::model::ParameterSet;
use std::sync::Arc;

/// Produces the parameters for a launch, or nothing when they are not ready yet.
pub trait ParameterSource: Send + Sync {
    fn get_variables(&self) -> Option<ParameterSet>;
}

impl<F> ParameterSource for F
where
    F: Fn() -> Option<ParameterSet> + Send + Sync,
{
    fn get_variables(&self) -> Option<ParameterSet> {
        self()
    }
}

/// Decides whether a launch may proceed.
#[derive(Clone)]
pub struct LaunchGate {
    source: Arc<dyn ParameterSource>,
}

impl LaunchGate {
    pub fn new(source: Arc<dyn ParameterSource>) -> Self {
        Self { source }
    }

    /// Ask the source once. `None` means "not ready", which is not an error.
    pub fn try_acquire_parameters(&self) -> Option<ParameterSet> {
        self.source.get_variables()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn absent_source_yields_none() {
        let gate = LaunchGate::new(Arc::new(|| None::<ParameterSet>));
        assert!(gate.try_acquire_parameters().is_none());
    }

    #[test]
    fn each_call_asks_the_source_exactly_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let gate = LaunchGate::new(Arc::new(move || {
            let n = counter.fetch_add(1, Ordering::SeqCst);
            // Ready only from the second call on.
            (n > 0).then(|| ParameterSet::new(json!({ "attempt": n })))
        }));

        assert!(gate.try_acquire_parameters().is_none());
        assert_eq!(
            gate.try_acquire_parameters(),
            Some(ParameterSet::new(json!({ "attempt": 1 })))
        );
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
