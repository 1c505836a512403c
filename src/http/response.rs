//! Response shaping.
//!
//! API-level outcomes (validation failures, unknown ids) are always HTTP 200;
//! the body says what happened. Only transport-level failures use other
//! status codes: an undecodable body is 400 and a failing store on GET/POST
//! is 500.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use crate::http::payload::PayloadError;
use crate::store::StoreError;

pub const REQUIRED_FIELDS_MISSING: &str = "required field(s) missing";
pub const MISSING_ID: &str = "missing _id";
pub const NO_UPDATE_FIELDS: &str = "no update field(s) sent";
pub const COULD_NOT_UPDATE: &str = "could not update";
pub const COULD_NOT_DELETE: &str = "could not delete";
pub const SUCCESSFULLY_UPDATED: &str = "successfully updated";
pub const SUCCESSFULLY_DELETED: &str = "successfully deleted";

/// Body of a mutation or validation reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Reply {
    Error {
        error: &'static str,
        #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
        id: Option<String>,
    },
    Success {
        result: &'static str,
        #[serde(rename = "_id")]
        id: String,
    },
}

impl Reply {
    pub fn error(error: &'static str) -> Self {
        Self::Error { error, id: None }
    }

    pub fn error_for(error: &'static str, id: String) -> Self {
        Self::Error { error, id: Some(id) }
    }

    pub fn success(result: &'static str, id: String) -> Self {
        Self::Success { result, id }
    }
}

impl IntoResponse for Reply {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

/// Failures that escape the 200-with-error contract.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("store unavailable: {0}")]
    Store(#[from] StoreError),

    #[error("invalid request body: {0}")]
    InvalidBody(#[from] PayloadError),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::InvalidBody(_) => StatusCode::BAD_REQUEST,
        }
    }

    fn public_message(&self) -> &'static str {
        match self {
            Self::Store(_) => "store unavailable",
            Self::InvalidBody(_) => "invalid request body",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        } else {
            tracing::debug!(error = %self, "Request rejected");
        }
        (status, Json(serde_json::json!({ "error": self.public_message() }))).into_response()
    }
}
