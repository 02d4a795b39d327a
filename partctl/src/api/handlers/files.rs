use crate::AppState;
use crate::api::models::StatusResponse;
use crate::api::models::files::{ColumnsQuery, ColumnsResponse, FileListResponse};
use crate::csv_header::{HeaderError, read_header};
use crate::errors::{Error, Result};
use crate::storage::{StorageError, UploadStore};
use axum::{
    Json,
    extract::{Multipart, Query, State, multipart::MultipartRejection},
};
use thiserror::Error as ThisError;
use tokio::io::AsyncWriteExt;

/// Reasons an upload fails. The display text is what the client sees.
#[derive(ThisError, Debug)]
enum UploadFailure {
    #[error("Unable to upload file.")]
    Malformed(String),

    #[error("Unable to upload file.")]
    MissingFile,

    #[error("Invalid file name.")]
    InvalidName(String),

    #[error("Unable to create the file for writing.")]
    Create(#[source] std::io::Error),

    #[error("Unable to save the file.")]
    Save(String),
}

impl UploadFailure {
    /// Underlying cause, for the server log only
    fn detail(&self) -> Option<&str> {
        match self {
            UploadFailure::Malformed(detail) | UploadFailure::InvalidName(detail) | UploadFailure::Save(detail) => Some(detail),
            UploadFailure::MissingFile | UploadFailure::Create(_) => None,
        }
    }
}

#[utoipa::path(
    post,
    path = "/upload",
    tag = "files",
    summary = "Upload file",
    description = "Store a file under its client-supplied name, replacing any file with the same name. \
                   Failures are reported in the body with `success: false`.",
    request_body(
        content_type = "multipart/form-data",
        description = "Multipart form with the file in field `file`"
    ),
    responses(
        (status = 200, description = "Upload outcome", body = StatusResponse),
        (status = 405, description = "Invalid request method")
    )
)]
#[tracing::instrument(skip_all)]
pub async fn upload_file(State(state): State<AppState>, multipart: std::result::Result<Multipart, MultipartRejection>) -> Json<StatusResponse> {
    let result = match multipart {
        Ok(mut multipart) => receive_upload(&state.uploads, &mut multipart).await,
        Err(rejection) => Err(UploadFailure::Malformed(rejection.body_text())),
    };

    match result {
        Ok(filename) => Json(StatusResponse::ok(format!("File uploaded successfully: {filename}"))),
        Err(failure) => {
            tracing::warn!(error = %failure, detail = failure.detail(), source = ?std::error::Error::source(&failure), "File upload failed");
            Json(StatusResponse::failed(failure.to_string()))
        }
    }
}

/// Stream the `file` field into the uploads directory and return the stored name.
async fn receive_upload(store: &UploadStore, multipart: &mut Multipart) -> std::result::Result<String, UploadFailure> {
    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| UploadFailure::Malformed(e.body_text()))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field.file_name().map(str::to_string).ok_or(UploadFailure::MissingFile)?;

        let mut out = store.create(&filename).await.map_err(|e| match e {
            StorageError::InvalidFileName { name } => UploadFailure::InvalidName(name),
            StorageError::Io(e) => UploadFailure::Create(e),
        })?;

        tracing::info!(filename = %filename, "Starting file upload");

        let mut total_size = 0u64;
        while let Some(chunk) = field.chunk().await.map_err(|e| UploadFailure::Save(e.body_text()))? {
            total_size += chunk.len() as u64;
            out.write_all(&chunk).await.map_err(|e| UploadFailure::Save(e.to_string()))?;
        }
        out.flush().await.map_err(|e| UploadFailure::Save(e.to_string()))?;

        tracing::info!(filename = %filename, total_bytes = total_size, "File uploaded");

        return Ok(filename);
    }

    Err(UploadFailure::MissingFile)
}

#[utoipa::path(
    get,
    path = "/files",
    tag = "files",
    summary = "List files",
    description = "Names of all uploaded files, in directory order.",
    responses(
        (status = 200, description = "Uploaded file names", body = FileListResponse),
        (status = 500, description = "Unable to read uploaded files directory.")
    )
)]
#[tracing::instrument(skip_all)]
pub async fn list_files(State(state): State<AppState>) -> Result<Json<FileListResponse>> {
    let files = state.uploads.list_files().await.map_err(|e| {
        tracing::error!(error = %e, dir = %state.uploads.base_path().display(), "Failed to list uploads directory");
        Error::Internal {
            operation: "Unable to read uploaded files directory.".to_string(),
        }
    })?;

    tracing::debug!(count = files.len(), "Listed uploaded files");

    Ok(Json(FileListResponse { files }))
}

#[utoipa::path(
    get,
    path = "/columns",
    tag = "files",
    summary = "Get columns",
    description = "Column names taken from the first record of an uploaded CSV file.",
    params(ColumnsQuery),
    responses(
        (status = 200, description = "Header columns", body = ColumnsResponse),
        (status = 400, description = "File name missing or invalid"),
        (status = 500, description = "File could not be opened or its header could not be parsed")
    )
)]
#[tracing::instrument(skip_all)]
pub async fn get_columns(State(state): State<AppState>, Query(query): Query<ColumnsQuery>) -> Result<Json<ColumnsResponse>> {
    let file = query.file.filter(|f| !f.is_empty()).ok_or_else(|| Error::BadRequest {
        message: "File name is required.".to_string(),
    })?;

    let path = state.uploads.resolve_path(&file).map_err(|_| Error::BadRequest {
        message: "Invalid file name.".to_string(),
    })?;

    let columns = tokio::task::spawn_blocking(move || read_header(&path))
        .await
        .map_err(|e| Error::Other(e.into()))?
        .map_err(|e| {
            tracing::warn!(error = %e, file = %file, "Failed to read CSV header");
            let operation = match e {
                HeaderError::Open { .. } => "Unable to open the file.",
                HeaderError::Parse(_) | HeaderError::Empty => "Unable to read file columns.",
            };
            Error::Internal {
                operation: operation.to_string(),
            }
        })?;

    Ok(Json(ColumnsResponse { columns }))
}
