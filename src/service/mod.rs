//! Execution service boundary.
//!
//! A service turns a `LaunchRequest` into either a structured `LaunchOutcome` or a
//! `TransportError` when the call itself could not complete.

mod graphql;

use crate::model::{LaunchOutcome, LaunchRequest};
use async_trait::async_trait;
use thiserror::Error;

pub(crate) use graphql::GraphqlExecutionService;

/// Failures of the submission call itself, outside the structured outcome protocol.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("unexpected HTTP status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("could not decode response: {0}")]
    Decode(String),
    #[error("GraphQL errors: {}", .0.join("; "))]
    GraphQl(Vec<String>),
    #[error("submission panicked: {0}")]
    Panicked(String),
}

#[async_trait]
pub trait ExecutionService: Send + Sync {
    async fn launch_pipeline_execution(
        &self,
        request: LaunchRequest,
    ) -> Result<LaunchOutcome, TransportError>;
}
