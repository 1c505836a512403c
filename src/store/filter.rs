//! Equality filters built from query parameters.
//!
//! Every value arrives as a string. Before comparison it is coerced to the
//! type of the field it names; a value that cannot be coerced, or a key that
//! is not a visible issue field, yields a criterion that matches nothing.

use chrono::{DateTime, TimeZone, Utc};

use crate::store::types::{Issue, IssueId};

/// Text fields compared by exact string equality.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextField {
    IssueTitle,
    IssueText,
    CreatedBy,
    AssignedTo,
    StatusText,
}

impl TextField {
    fn from_key(key: &str) -> Option<Self> {
        match key {
            "issue_title" => Some(Self::IssueTitle),
            "issue_text" => Some(Self::IssueText),
            "created_by" => Some(Self::CreatedBy),
            "assigned_to" => Some(Self::AssignedTo),
            "status_text" => Some(Self::StatusText),
            _ => None,
        }
    }

    fn get<'a>(&self, issue: &'a Issue) -> &'a str {
        match self {
            Self::IssueTitle => &issue.issue_title,
            Self::IssueText => &issue.issue_text,
            Self::CreatedBy => &issue.created_by,
            Self::AssignedTo => &issue.assigned_to,
            Self::StatusText => &issue.status_text,
        }
    }
}

/// A single coerced equality check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Criterion {
    Id(IssueId),
    Open(bool),
    CreatedOn(DateTime<Utc>),
    UpdatedOn(DateTime<Utc>),
    Text(TextField, String),
    /// Unknown key or a value of the wrong type.
    Never,
}

impl Criterion {
    /// Coerce one query parameter.
    pub fn parse(key: &str, value: &str) -> Self {
        match key {
            "_id" => value.parse().map(Self::Id).unwrap_or(Self::Never),
            "open" => match value {
                "true" => Self::Open(true),
                "false" => Self::Open(false),
                _ => Self::Never,
            },
            "created_on" => parse_timestamp(value).map(Self::CreatedOn).unwrap_or(Self::Never),
            "updated_on" => parse_timestamp(value).map(Self::UpdatedOn).unwrap_or(Self::Never),
            other => match TextField::from_key(other) {
                Some(field) => Self::Text(field, value.to_string()),
                None => Self::Never,
            },
        }
    }

    pub fn matches(&self, issue: &Issue) -> bool {
        match self {
            Self::Id(id) => issue.id == *id,
            Self::Open(open) => issue.open == *open,
            Self::CreatedOn(ts) => issue.created_on == *ts,
            Self::UpdatedOn(ts) => issue.updated_on == *ts,
            Self::Text(field, value) => field.get(issue) == value,
            Self::Never => false,
        }
    }
}

/// RFC 3339, or integer epoch milliseconds.
fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    value
        .parse::<i64>()
        .ok()
        .and_then(|ms| Utc.timestamp_millis_opt(ms).single())
}

/// Conjunction of criteria. An empty filter matches every issue.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IssueFilter {
    criteria: Vec<Criterion>,
}

impl IssueFilter {
    /// Build a filter from raw query pairs.
    pub fn from_pairs<'a, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        Self {
            criteria: pairs
                .into_iter()
                .map(|(k, v)| Criterion::parse(k, v))
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.criteria.is_empty()
    }

    pub fn matches(&self, issue: &Issue) -> bool {
        self.criteria.iter().all(|c| c.matches(issue))
    }
}
