use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid base URL '{0}'")]
    InvalidBaseUrl(String),

    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// `{base}/api/issues/{project}`, with `project` escaped as one path segment.
pub fn issues_url(base: &str, project: &str) -> Result<Url, ClientError> {
    let invalid = || ClientError::InvalidBaseUrl(base.to_string());
    let mut url = Url::parse(base).map_err(|_| invalid())?;
    url.path_segments_mut()
        .map_err(|_| invalid())?
        .pop_if_empty()
        .extend(["api", "issues", project]);
    Ok(url)
}

/// Fields for a new issue.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IssueDraft {
    pub issue_title: String,
    pub issue_text: String,
    pub created_by: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_text: Option<String>,
}

/// Thin client over `/api/issues/{project}`.
///
/// Replies are returned as raw JSON: the API reports validation failures in
/// the body of a 200 response, so callers inspect `error`/`result` themselves.
#[derive(Clone)]
pub struct IssueClient {
    client: Client,
    base_url: String,
}

impl IssueClient {
    pub fn new(base_url: &str) -> Self {
        Self::with_client(base_url, Client::new())
    }

    /// Use a preconfigured `reqwest` client (proxies, timeouts).
    pub fn with_client(base_url: &str, client: Client) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn issues_url(&self, project: &str) -> Result<Url, ClientError> {
        issues_url(&self.base_url, project)
    }

    /// Create an issue in `project`.
    pub async fn create(&self, project: &str, draft: &IssueDraft) -> Result<Value, ClientError> {
        let reply = self
            .client
            .post(self.issues_url(project)?)
            .json(draft)
            .send()
            .await?
            .json()
            .await?;
        Ok(reply)
    }

    /// List issues in `project` matching every `(field, value)` pair.
    pub async fn list(&self, project: &str, filter: &[(&str, &str)]) -> Result<Vec<Value>, ClientError> {
        let reply = self
            .client
            .get(self.issues_url(project)?)
            .query(filter)
            .send()
            .await?
            .json()
            .await?;
        Ok(reply)
    }

    /// Send a PUT with an arbitrary JSON body (normally `_id` plus fields).
    pub async fn update(&self, project: &str, body: &Value) -> Result<Value, ClientError> {
        let reply = self
            .client
            .put(self.issues_url(project)?)
            .json(body)
            .send()
            .await?
            .json()
            .await?;
        Ok(reply)
    }

    /// Delete the issue with `id`.
    pub async fn delete(&self, project: &str, id: &str) -> Result<Value, ClientError> {
        let reply = self
            .client
            .delete(self.issues_url(project)?)
            .json(&serde_json::json!({ "_id": id }))
            .send()
            .await?
            .json()
            .await?;
        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issues_url_escapes_project() {
        let url = issues_url("http://127.0.0.1:3000", "apitest").unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:3000/api/issues/apitest");

        let url = issues_url("http://127.0.0.1:3000/", "team a/b?x#y").unwrap();
        assert_eq!(url.path(), "/api/issues/team%20a%2Fb%3Fx%23y");
        assert_eq!(url.query(), None);
        assert_eq!(url.fragment(), None);
    }

    #[test]
    fn test_issues_url_keeps_base_path() {
        let url = issues_url("http://tracker.local/prefix/", "apitest").unwrap();
        assert_eq!(url.as_str(), "http://tracker.local/prefix/api/issues/apitest");
    }

    #[test]
    fn test_issues_url_rejects_bad_base() {
        assert!(matches!(
            issues_url("not a url", "apitest"),
            Err(ClientError::InvalidBaseUrl(_))
        ));
    }
}
