//! Issue document types.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Store-generated identifier of an issue.
///
/// Rendered on the wire as 32 lowercase hex digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct IssueId(Uuid);

impl IssueId {
    /// Generate a fresh random identifier.
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for IssueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

impl FromStr for IssueId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::try_parse(s.trim()).map(Self)
    }
}

impl TryFrom<String> for IssueId {
    type Error = uuid::Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<IssueId> for String {
    fn from(id: IssueId) -> Self {
        id.to_string()
    }
}

/// Millisecond-precision timestamps, serialized like `2024-01-01T12:00:00.000Z`.
pub mod timestamp {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format(value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }

    /// Format a timestamp the way it appears in responses.
    pub fn format(value: &DateTime<Utc>) -> String {
        value.to_rfc3339_opts(SecondsFormat::Millis, true)
    }
}

/// Current time truncated to the precision the store keeps.
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

/// An issue as clients see it. The owning project is not part of the record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    #[serde(rename = "_id")]
    pub id: IssueId,
    pub issue_title: String,
    pub issue_text: String,
    #[serde(with = "timestamp")]
    pub created_on: DateTime<Utc>,
    #[serde(with = "timestamp")]
    pub updated_on: DateTime<Utc>,
    pub created_by: String,
    pub assigned_to: String,
    pub open: bool,
    pub status_text: String,
}

impl Issue {
    /// Apply a partial update and advance `updated_on`.
    ///
    /// `updated_on` always moves forward by at least one millisecond so that
    /// consecutive updates inside the same millisecond remain distinguishable.
    pub fn apply(&mut self, update: IssueUpdate) {
        let IssueUpdate {
            issue_title,
            issue_text,
            created_by,
            assigned_to,
            status_text,
            open,
        } = update;

        if let Some(v) = issue_title {
            self.issue_title = v;
        }
        if let Some(v) = issue_text {
            self.issue_text = v;
        }
        if let Some(v) = created_by {
            self.created_by = v;
        }
        if let Some(v) = assigned_to {
            self.assigned_to = v;
        }
        if let Some(v) = status_text {
            self.status_text = v;
        }
        if let Some(v) = open {
            self.open = v;
        }

        let floor = self.updated_on + Duration::milliseconds(1);
        self.updated_on = now().max(floor);
    }
}

/// A stored document: the visible record plus the project that owns it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueDocument {
    pub project: String,
    /// Insertion order within the store. Assigned by the store on insert.
    #[serde(default)]
    pub seq: u64,
    #[serde(flatten)]
    pub issue: Issue,
}

/// Fields supplied when creating an issue.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewIssue {
    pub issue_title: String,
    pub issue_text: String,
    pub created_by: String,
    pub assigned_to: String,
    pub status_text: String,
}

impl NewIssue {
    /// Build the stored document for this issue under `project`.
    pub fn into_document(self, project: &str) -> IssueDocument {
        let created_on = now();
        IssueDocument {
            project: project.to_string(),
            seq: 0,
            issue: Issue {
                id: IssueId::generate(),
                issue_title: self.issue_title,
                issue_text: self.issue_text,
                created_on,
                updated_on: created_on,
                created_by: self.created_by,
                assigned_to: self.assigned_to,
                open: true,
                status_text: self.status_text,
            },
        }
    }
}

/// A partial update. `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IssueUpdate {
    pub issue_title: Option<String>,
    pub issue_text: Option<String>,
    pub created_by: Option<String>,
    pub assigned_to: Option<String>,
    pub status_text: Option<String>,
    pub open: Option<bool>,
}

impl IssueUpdate {
    /// True when no field would change.
    pub fn is_empty(&self) -> bool {
        self.issue_title.is_none()
            && self.issue_text.is_none()
            && self.created_by.is_none()
            && self.assigned_to.is_none()
            && self.status_text.is_none()
            && self.open.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> NewIssue {
        NewIssue {
            issue_title: "Title".into(),
            issue_text: "Text".into(),
            created_by: "Alice".into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_new_document_defaults() {
        let doc = sample().into_document("apitest");
        assert_eq!(doc.project, "apitest");
        assert!(doc.issue.open);
        assert_eq!(doc.issue.assigned_to, "");
        assert_eq!(doc.issue.status_text, "");
        assert_eq!(doc.issue.created_on, doc.issue.updated_on);
    }

    #[test]
    fn test_issue_id_parsing() {
        let id = IssueId::generate();
        let rendered = id.to_string();
        assert_eq!(rendered.len(), 32);
        assert!(rendered.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(rendered.parse::<IssueId>().unwrap(), id);
        assert!("invalid".parse::<IssueId>().is_err());
        assert!("".parse::<IssueId>().is_err());
    }

    #[test]
    fn test_wire_format() {
        let doc = sample().into_document("apitest");
        let json = serde_json::to_value(&doc.issue).unwrap();
        assert!(json.get("project").is_none());
        assert_eq!(json["_id"], doc.issue.id.to_string());
        let created = json["created_on"].as_str().unwrap();
        assert!(created.ends_with('Z'));
        assert_eq!(created.len(), "2024-01-01T12:00:00.000Z".len());
    }

    #[test]
    fn test_document_keeps_project() {
        let doc = sample().into_document("apitest");
        let json = serde_json::to_string(&doc).unwrap();
        let decoded: IssueDocument = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded.project, "apitest");
        assert_eq!(decoded.issue, doc.issue);
    }

    #[test]
    fn test_apply_advances_updated_on() {
        let mut issue = sample().into_document("apitest").issue;
        let created = issue.created_on;

        issue.apply(IssueUpdate {
            open: Some(false),
            status_text: Some("closed".into()),
            ..Default::default()
        });
        assert!(!issue.open);
        assert_eq!(issue.status_text, "closed");
        assert_eq!(issue.issue_title, "Title");
        assert_eq!(issue.created_on, created);
        assert!(issue.updated_on > created);

        let first = issue.updated_on;
        issue.apply(IssueUpdate {
            issue_title: Some("Again".into()),
            ..Default::default()
        });
        assert!(issue.updated_on > first);
    }

    #[test]
    fn test_update_is_empty() {
        assert!(IssueUpdate::default().is_empty());
        let update = IssueUpdate {
            open: Some(false),
            ..Default::default()
        };
        assert!(!update.is_empty());
    }
}
