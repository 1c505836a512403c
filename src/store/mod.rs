//! Issue record store.
//!
//! # Data Flow
//! ```text
//! handler
//!     → IssueStore (trait object shared via Arc)
//!     → DocumentStore (concurrent map of IssueDocument)
//!     → JSON document file (optional, rewritten before each mutation commits)
//! ```
//!
//! Records are keyed by `IssueId` and partitioned by project. Lookups by id
//! ignore the project; listings are always scoped to one.

pub mod document;
pub mod filter;
pub mod types;

use thiserror::Error;

pub use document::DocumentStore;
pub use filter::IssueFilter;
pub use types::{Issue, IssueDocument, IssueId, IssueUpdate, NewIssue};

/// Errors raised by store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The id is malformed or does not resolve to a record.
    #[error("issue not found: {0}")]
    NotFound(String),

    /// Reading or writing the document file failed.
    #[error("store I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The document file could not be encoded or decoded.
    #[error("store serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The blocking task running the operation panicked or was cancelled.
    #[error("store task failed: {0}")]
    Task(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Operations the request handlers need from a backing store.
///
/// A mutation that returns `Err` has not changed the collection.
pub trait IssueStore: Send + Sync {
    /// Persist a new issue under `project`.
    fn create(&self, project: &str, issue: NewIssue) -> StoreResult<Issue>;

    /// All issues in `project` matching `filter`, in insertion order.
    fn find_by_project(&self, project: &str, filter: &IssueFilter) -> StoreResult<Vec<Issue>>;

    /// Apply `update` to the issue with the given id.
    fn update_by_id(&self, id: &str, update: IssueUpdate) -> StoreResult<Issue>;

    /// Remove the issue with the given id, returning it.
    fn delete_by_id(&self, id: &str) -> StoreResult<Issue>;

    /// Flush any buffered state. Called once at shutdown.
    fn close(&self) -> StoreResult<()> {
        Ok(())
    }
}
