//! Error types for nomboard-dash
//!
//! Failures that reach the client use one envelope:
//! `{success: false, error, details, stack?}`. `stack` holds the error chain
//! and is only emitted in development mode.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use nomboard_common::Environment;
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// Request-level failure
#[derive(Debug, Error)]
pub enum ApiError {
    /// Report queries failed (500)
    #[error("Failed to load data")]
    DataLoad(#[source] anyhow::Error),

    /// Schema introspection failed (500)
    #[error("Failed to fetch debug info")]
    DebugInfo(#[source] anyhow::Error),
}

impl ApiError {
    pub fn data_load(err: impl Into<anyhow::Error>) -> Self {
        ApiError::DataLoad(err.into())
    }

    pub fn debug_info(err: impl Into<anyhow::Error>) -> Self {
        ApiError::DebugInfo(err.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::DataLoad(_) | ApiError::DebugInfo(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn cause(&self) -> &anyhow::Error {
        match self {
            ApiError::DataLoad(e) | ApiError::DebugInfo(e) => e,
        }
    }

    /// Attach the deployment mode deciding whether the chain is exposed
    pub fn respond(self, environment: Environment) -> ApiFailure {
        ApiFailure {
            error: self,
            expose_trace: environment.is_development(),
        }
    }
}

/// Failure ready to be rendered
#[derive(Debug)]
pub struct ApiFailure {
    error: ApiError,
    expose_trace: bool,
}

#[derive(Serialize)]
struct FailureBody {
    success: bool,
    error: String,
    details: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    stack: Option<String>,
}

impl IntoResponse for ApiFailure {
    fn into_response(self) -> Response {
        let cause = self.error.cause();
        error!("{}: {:#}", self.error, cause);

        let body = FailureBody {
            success: false,
            error: self.error.to_string(),
            details: format!("{:#}", cause),
            stack: self.expose_trace.then(|| format!("{:?}", cause)),
        };

        (self.error.status(), Json(body)).into_response()
    }
}
