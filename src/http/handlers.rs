//! Handlers for `/api/issues/{project}`.
//!
//! Validation happens here, before the store is touched. PUT and DELETE fold
//! every store failure into their "could not ..." replies; GET and POST
//! surface store failures as 500.

use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::http::payload::Payload;
use crate::http::request::request_id;
use crate::http::response::{
    ApiError, Reply, COULD_NOT_DELETE, COULD_NOT_UPDATE, MISSING_ID, NO_UPDATE_FIELDS,
    REQUIRED_FIELDS_MISSING, SUCCESSFULLY_DELETED, SUCCESSFULLY_UPDATED,
};
use crate::http::server::AppState;
use crate::store::{Issue, IssueFilter, NewIssue};

/// GET: list a project's issues, narrowed by query parameters.
pub async fn list_issues(
    State(state): State<AppState>,
    Path(project): Path<String>,
    Query(query): Query<Vec<(String, String)>>,
) -> Result<Json<Vec<Issue>>, ApiError> {
    let filter = IssueFilter::from_pairs(query.iter().map(|(k, v)| (k.as_str(), v.as_str())));
    let issues = state
        .with_store("find", move |store| store.find_by_project(&project, &filter))
        .await?;
    Ok(Json(issues))
}

/// POST: create an issue.
pub async fn create_issue(
    State(state): State<AppState>,
    Path(project): Path<String>,
    headers: HeaderMap,
    payload: Payload,
) -> Result<Response, ApiError> {
    let (Some(issue_title), Some(issue_text), Some(created_by)) = (
        payload.text("issue_title"),
        payload.text("issue_text"),
        payload.text("created_by"),
    ) else {
        tracing::debug!(request_id = %request_id(&headers), "Create rejected: required fields missing");
        return Ok(Reply::error(REQUIRED_FIELDS_MISSING).into_response());
    };

    let new_issue = NewIssue {
        issue_title,
        issue_text,
        created_by,
        assigned_to: payload.text("assigned_to").unwrap_or_default(),
        status_text: payload.text("status_text").unwrap_or_default(),
    };

    let log_project = project.clone();
    let issue = state
        .with_store("create", move |store| store.create(&project, new_issue))
        .await?;

    tracing::info!(
        request_id = %request_id(&headers),
        project = %log_project,
        id = %issue.id,
        "Issue created"
    );
    Ok(Json(issue).into_response())
}

/// PUT: partially update an issue by `_id`.
pub async fn update_issue(
    State(state): State<AppState>,
    Path(_project): Path<String>,
    headers: HeaderMap,
    payload: Payload,
) -> Reply {
    let Some(id) = payload.id() else {
        return Reply::error(MISSING_ID);
    };

    let update = payload.issue_update();
    if update.is_empty() {
        return Reply::error_for(NO_UPDATE_FIELDS, id);
    }

    let key = id.clone();
    match state
        .with_store("update", move |store| store.update_by_id(&key, update))
        .await
    {
        Ok(_) => {
            tracing::info!(request_id = %request_id(&headers), id = %id, "Issue updated");
            Reply::success(SUCCESSFULLY_UPDATED, id)
        }
        Err(e) => {
            tracing::warn!(request_id = %request_id(&headers), id = %id, error = %e, "Update failed");
            Reply::error_for(COULD_NOT_UPDATE, id)
        }
    }
}

/// DELETE: remove an issue by `_id`.
pub async fn delete_issue(
    State(state): State<AppState>,
    Path(_project): Path<String>,
    headers: HeaderMap,
    payload: Payload,
) -> Reply {
    let Some(id) = payload.id() else {
        return Reply::error(MISSING_ID);
    };

    let key = id.clone();
    match state
        .with_store("delete", move |store| store.delete_by_id(&key))
        .await
    {
        Ok(_) => {
            tracing::info!(request_id = %request_id(&headers), id = %id, "Issue deleted");
            Reply::success(SUCCESSFULLY_DELETED, id)
        }
        Err(e) => {
            tracing::warn!(request_id = %request_id(&headers), id = %id, error = %e, "Delete failed");
            Reply::error_for(COULD_NOT_DELETE, id)
        }
    }
}

#[derive(Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub version: &'static str,
}

/// GET /health
pub async fn health() -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}
