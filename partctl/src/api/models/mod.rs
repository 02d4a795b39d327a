//! Request and response bodies.

pub mod files;
pub mod partition;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Outcome of an upload or a partitioning run.
///
/// Failure is signalled by `success: false`, not by the HTTP status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct StatusResponse {
    pub success: bool,
    pub message: String,
    /// Combined output of the partitioning script; omitted when empty
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log: Option<String>,
}

impl StatusResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            log: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            log: None,
        }
    }

    pub fn with_log(mut self, log: String) -> Self {
        self.log = (!log.is_empty()).then_some(log);
        self
    }
}
