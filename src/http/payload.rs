//! Request body decoding.
//!
//! Bodies arrive either as JSON objects or as URL-encoded forms (what an
//! HTML form submits). Both decode into one field map; accessors then apply
//! the API's truthiness rules: an empty string counts as "not sent".

use axum::body::Bytes;
use axum::extract::{FromRequest, Request};
use axum::http::header::CONTENT_TYPE;
use axum::response::{IntoResponse, Response};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::http::response::ApiError;
use crate::store::IssueUpdate;

/// Errors decoding a request body.
#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("JSON body must be an object")]
    NotAnObject,
}

/// Decoded request body fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Payload(Map<String, Value>);

impl Payload {
    /// Decode `body` according to its content type.
    pub fn parse(content_type: Option<&str>, body: &[u8]) -> Result<Self, PayloadError> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }

        let is_json = content_type
            .map(|ct| ct.trim().to_ascii_lowercase())
            .is_some_and(|ct| ct.starts_with("application/json"));

        if is_json {
            match serde_json::from_slice(body)? {
                Value::Object(map) => Ok(Self(map)),
                _ => Err(PayloadError::NotAnObject),
            }
        } else {
            let map = url::form_urlencoded::parse(body)
                .map(|(k, v)| (k.into_owned(), Value::String(v.into_owned())))
                .collect();
            Ok(Self(map))
        }
    }

    /// A text field, if sent and non-empty. Numbers are accepted as text.
    pub fn text(&self, key: &str) -> Option<String> {
        match self.0.get(key)? {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    /// A boolean field, from a JSON boolean or the strings `true`/`false`.
    pub fn flag(&self, key: &str) -> Option<bool> {
        match self.0.get(key)? {
            Value::Bool(b) => Some(*b),
            Value::String(s) => match s.as_str() {
                "true" => Some(true),
                "false" => Some(false),
                _ => None,
            },
            _ => None,
        }
    }

    /// The `_id` field, exactly as the client sent it.
    pub fn id(&self) -> Option<String> {
        self.text("_id")
    }

    /// The mutable issue fields present in this body.
    pub fn issue_update(&self) -> IssueUpdate {
        IssueUpdate {
            issue_title: self.text("issue_title"),
            issue_text: self.text("issue_text"),
            created_by: self.text("created_by"),
            assigned_to: self.text("assigned_to"),
            status_text: self.text("status_text"),
            open: self.flag("open"),
        }
    }
}

impl<S> FromRequest<S> for Payload
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);

        let body = Bytes::from_request(req, state)
            .await
            .map_err(IntoResponse::into_response)?;

        Self::parse(content_type.as_deref(), &body)
            .map_err(|e| ApiError::from(e).into_response())
    }
}
