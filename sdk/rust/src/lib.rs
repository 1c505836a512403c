//! Rust client for the issue tracker API.

pub mod client;

pub use client::{issues_url, ClientError, IssueClient, IssueDraft};
