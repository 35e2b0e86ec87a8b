use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Opaque bundle of values needed to start a run.
///
/// The launch core only ever checks whether one is present; the shape is owned by
/// whoever produces it and whoever submits it.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterSet(serde_json::Value);

impl ParameterSet {
    pub fn new(value: serde_json::Value) -> Self {
        Self(value)
    }

    pub fn as_value(&self) -> &serde_json::Value {
        &self.0
    }
}

/// A single submission attempt built from one `ParameterSet`.
#[derive(Debug, Clone, PartialEq)]
pub struct LaunchRequest {
    params: ParameterSet,
    pub created_at_utc: String,
}

impl LaunchRequest {
    pub fn new(params: ParameterSet) -> Self {
        Self {
            params,
            created_at_utc: time::OffsetDateTime::now_utc()
                .format(&time::format_description::well_known::Rfc3339)
                .unwrap_or_else(|_| "now".into()),
        }
    }

    pub fn params(&self) -> &ParameterSet {
        &self.params
    }

    /// GraphQL variables for the launch mutation.
    pub fn variables(&self) -> &serde_json::Value {
        self.params.as_value()
    }
}

/// Identifier of a run returned by a successful launch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RunReference(String);

impl RunReference {
    pub fn new(run_id: impl Into<String>) -> Self {
        Self(run_id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RunReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailureDetail {
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

impl FailureDetail {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            errors: Vec::new(),
        }
    }
}

/// Structured result of a launch, as reported by the execution service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LaunchOutcome {
    Success { run_id: RunReference },
    Failure { detail: FailureDetail },
}

impl LaunchOutcome {
    pub fn success(run_id: impl Into<String>) -> Self {
        LaunchOutcome::Success {
            run_id: RunReference::new(run_id),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        LaunchOutcome::Failure {
            detail: FailureDetail::message(message),
        }
    }
}

/// How the result handler should present an outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayDirective {
    pub open_in_new_window: bool,
}

impl DisplayDirective {
    pub const NEW_WINDOW: DisplayDirective = DisplayDirective {
        open_in_new_window: true,
    };
}

/// Caller-owned state of a trigger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerState {
    pub identifier: String,
    pub disabled: bool,
}

/// Resolved settings for one CLI session.
#[derive(Debug, Clone)]
pub struct LaunchConfig {
    pub base_url: String,
    pub pipeline: String,
    pub variables_path: PathBuf,
    pub mode: String,
    pub solid_subset: Option<Vec<String>>,
    pub tags: Vec<crate::variables::ExecutionTag>,
    pub request_timeout: Duration,
    pub user_agent: String,
    pub json: bool,
    pub interactive: bool,
    pub start_disabled: bool,
}
