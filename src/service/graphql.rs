use super::{ExecutionService, TransportError};
use crate::model::{FailureDetail, LaunchOutcome, LaunchRequest};
use async_trait::async_trait;
use serde_json::Value;
use std::fmt;
use std::time::Duration;

pub(crate) const LAUNCH_PIPELINE_EXECUTION_MUTATION: &str = r#"
mutation LaunchPipelineExecution($executionParams: ExecutionParams!) {
  launchPipelineExecution(executionParams: $executionParams) {
    __typename
    ... on LaunchPipelineRunSuccess {
      run {
        runId
        pipeline {
          name
        }
      }
    }
    ... on PipelineNotFoundError {
      message
    }
    ... on PipelineConfigValidationInvalid {
      errors {
        message
      }
    }
    ... on PythonError {
      message
      stack
    }
  }
}
"#;

/// Submits launches to a GraphQL endpoint over HTTP.
pub(crate) struct GraphqlExecutionService {
    http: reqwest::Client,
    endpoint: String,
}

impl GraphqlExecutionService {
    pub fn new(base_url: &str, timeout: Duration, user_agent: &str) -> Result<Self, TransportError> {
        let http = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()?;
        Ok(Self {
            http,
            endpoint: format!("{}/graphql", base_url.trim_end_matches('/')),
        })
    }
}

#[async_trait]
impl ExecutionService for GraphqlExecutionService {
    async fn launch_pipeline_execution(
        &self,
        request: LaunchRequest,
    ) -> Result<LaunchOutcome, TransportError> {
        let body = serde_json::json!({
            "operationName": "LaunchPipelineExecution",
            "query": LAUNCH_PIPELINE_EXECUTION_MUTATION,
            "variables": request.variables(),
        });

        tracing::debug!(endpoint = %self.endpoint, created_at = %request.created_at_utc, "submitting launch");
        let resp = self.http.post(&self.endpoint).json(&body).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(status_error(status.as_u16(), resp.text().await));
        }

        let payload: Value = resp
            .json()
            .await
            .map_err(|e| TransportError::Decode(e.to_string()))?;
        decode_launch_response(&payload)
    }
}

/// Non-success HTTP status; a body that cannot be read is named in the error text.
fn status_error<E: fmt::Display>(status: u16, body: Result<String, E>) -> TransportError {
    let body = body.unwrap_or_else(|e| format!("<body unreadable: {e}>"));
    TransportError::Status { status, body }
}

/// Map a GraphQL response body to a structured outcome.
pub(crate) fn decode_launch_response(payload: &Value) -> Result<LaunchOutcome, TransportError> {
    let result = payload
        .get("data")
        .and_then(|d| d.get("launchPipelineExecution"))
        .filter(|v| !v.is_null());

    let Some(result) = result else {
        let errors = graphql_error_messages(payload);
        if errors.is_empty() {
            return Err(TransportError::Decode(
                "response has no launchPipelineExecution field".into(),
            ));
        }
        return Err(TransportError::GraphQl(errors));
    };

    let typename = result
        .get("__typename")
        .and_then(Value::as_str)
        .ok_or_else(|| TransportError::Decode("launch result has no __typename".into()))?;

    match typename {
        "LaunchPipelineRunSuccess" => {
            let run_id = result
                .get("run")
                .and_then(|r| r.get("runId"))
                .and_then(Value::as_str)
                .ok_or_else(|| TransportError::Decode("run success without runId".into()))?;
            Ok(LaunchOutcome::success(run_id))
        }
        "PipelineConfigValidationInvalid" => {
            let errors: Vec<String> = result
                .get("errors")
                .and_then(Value::as_array)
                .map(|errs| {
                    errs.iter()
                        .filter_map(|e| e.get("message").and_then(Value::as_str))
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default();
            let message = if errors.is_empty() {
                "Pipeline configuration is invalid".to_string()
            } else {
                errors.join("\n")
            };
            Ok(LaunchOutcome::Failure {
                detail: FailureDetail { message, errors },
            })
        }
        other => {
            let message = result
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| format!("Unexpected response type: {other}"));
            Ok(LaunchOutcome::failure(message))
        }
    }
}

fn graphql_error_messages(payload: &Value) -> Vec<String> {
    payload
        .get("errors")
        .and_then(Value::as_array)
        .map(|errs| {
            errs.iter()
                .map(|e| {
                    e.get("message")
                        .and_then(Value::as_str)
                        .map(str::to_string)
                        .unwrap_or_else(|| e.to_string())
                })
                .collect()
        })
        .unwrap_or_default()
}
