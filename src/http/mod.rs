//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware stack)
//!     → request.rs (request id, span)
//!     → payload.rs (JSON or form body → field map)
//!     → handlers.rs (validation, store calls)
//!     → response.rs (reply shapes, error mapping)
//! ```

pub mod handlers;
pub mod middleware;
pub mod payload;
pub mod request;
pub mod response;
pub mod server;

pub use payload::Payload;
pub use request::X_REQUEST_ID;
pub use response::{ApiError, Reply};
pub use server::{AppState, HttpServer};
