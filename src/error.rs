//! Error taxonomy for the analyzer.
//!
//! The split matters more than the variants: generator failures
//! (`Unavailable` / `Timeout` / `Malformed`) are recovered locally by the
//! heuristic fallbacks and never reach the HTTP layer, while caller mistakes
//! (`InvalidParameters`) and missing source data (`NoData`) surface as client
//! errors. Anything else is an internal error and maps to a 500.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnalystError {
    /// Text generation is not configured, or the provider could not be
    /// reached. Recovered via fallback; never surfaced to callers.
    #[error("text generation unavailable")]
    Unavailable,

    /// The provider did not answer within the per-call deadline. Treated
    /// exactly like `Unavailable`.
    #[error("text generation timed out")]
    Timeout,

    /// The provider answered with content we could not parse into the
    /// expected shape. Recovered via fallback; logged for observability.
    #[error("malformed generator response: {0}")]
    Malformed(String),

    /// A caller-supplied request violates a contract (e.g. rebalance
    /// percentages that do not sum to 1). Surfaced as a client error.
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),

    /// The feature source returned an empty/zero-valued dataset where a
    /// result cannot be computed at all (e.g. empty-portfolio treasury
    /// analysis).
    #[error("no data available: {0}")]
    NoData(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AnalystError {
    /// True for failures the orchestrator swallows by switching to the
    /// matching heuristic fallback.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::Unavailable | Self::Timeout | Self::Malformed(_)
        )
    }
}

impl IntoResponse for AnalystError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::InvalidParameters(msg) => {
                (StatusCode::UNPROCESSABLE_ENTITY, msg.clone())
            }
            Self::NoData(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg.clone()),
            // Recoverable variants should have been handled upstream; if one
            // leaks this far we still refuse to return a partial result.
            _ => {
                tracing::error!(error = %self, "internal error surfaced at API boundary");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generator_failures_are_recoverable() {
        assert!(AnalystError::Unavailable.is_recoverable());
        assert!(AnalystError::Timeout.is_recoverable());
        assert!(AnalystError::Malformed("x".into()).is_recoverable());
    }

    #[test]
    fn caller_errors_are_not_recoverable() {
        assert!(!AnalystError::InvalidParameters("bad".into()).is_recoverable());
        assert!(!AnalystError::NoData("empty".into()).is_recoverable());
    }
}
