//! OpenAPI document for the HTTP API, served at `/openapi.json` and rendered at `/docs`.

use utoipa::OpenApi;

use crate::api::handlers::{files, partition};
use crate::api::models::{
    StatusResponse,
    files::{ColumnsResponse, FileListResponse},
    partition::PartitionRequest,
};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "partctl API",
        description = "Upload CSV files, inspect their columns and run the partitioning script over them."
    ),
    paths(files::upload_file, files::list_files, files::get_columns, partition::partition_file),
    components(schemas(StatusResponse, FileListResponse, ColumnsResponse, PartitionRequest)),
    tags(
        (name = "files", description = "Uploaded CSV files"),
        (name = "partition", description = "Partitioning script dispatch")
    )
)]
pub struct ApiDoc;
