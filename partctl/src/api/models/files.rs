use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Response for `GET /files`. An empty directory yields `[]`, never `null`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct FileListResponse {
    pub files: Vec<String>,
}

/// Query parameters for `GET /columns`
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ColumnsQuery {
    /// Name of a previously uploaded file
    pub file: Option<String>,
}

/// Response for `GET /columns`
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ColumnsResponse {
    /// Fields of the file's first record, in order
    pub columns: Vec<String>,
}
