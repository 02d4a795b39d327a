//! API layer for HTTP request handling and data models.
//!
//! - **[`handlers`]**: Axum route handlers for every endpoint
//! - **[`models`]**: Request/response data structures
//!
//! Endpoints:
//!
//! - `POST /upload`: multipart upload of a CSV file (field `file`)
//! - `GET /files`: names of all uploaded files
//! - `GET /columns?file=<name>`: header columns of an uploaded file
//! - `POST /partition`: run the partitioning script over an uploaded file
//!
//! Failures caused by client input or the filesystem are reported with an HTTP error status and
//! a plain-text body. Upload and script failures are reported with status 200 and
//! `success: false`, which is what the bundled front-end expects.

pub mod handlers;
pub mod models;
