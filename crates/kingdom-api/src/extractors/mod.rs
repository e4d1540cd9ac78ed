//! Axum extractors for request handling
//!
//! Custom extractors for authentication, path and query parsing, optional
//! JSON bodies, and multipart uploads.

mod auth;
mod json;
mod path;
mod query;
mod upload;

pub use auth::AuthUser;
pub use json::OptionalJson;
pub use path::{ApiPath, LordIdPath, SnapshotIdPath, UploadIdPath};
pub use query::ApiQuery;
pub use upload::UploadForm;
