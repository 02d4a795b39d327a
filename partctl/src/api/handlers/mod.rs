//! HTTP request handlers.
//!
//! - [`files`]: upload, listing and CSV header lookup
//! - [`partition`]: partitioning script dispatch

use crate::errors::Error;

pub mod files;
pub mod partition;

/// Method fallback for routes that exist but do not accept the request method
pub async fn method_not_allowed() -> Error {
    Error::MethodNotAllowed
}
