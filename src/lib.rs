//! Issue tracker service library.
//!
//! A small JSON API for creating, listing, updating and deleting issues
//! scoped to named projects, backed by a document store.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod store;

pub use config::TrackerConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use store::{DocumentStore, IssueStore};
