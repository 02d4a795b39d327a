use crate::AppState;
use crate::api::models::StatusResponse;
use crate::api::models::partition::PartitionRequest;
use crate::errors::{Error, Result};
use axum::{Json, body::Bytes, extract::State};

#[utoipa::path(
    post,
    path = "/partition",
    tag = "partition",
    summary = "Partition file",
    description = "Run the partitioning script over an uploaded file with the given columns and return its combined \
                   output. The request is held open until the script exits. A script failure is reported with \
                   `success: false`, not with an HTTP error status.",
    request_body = PartitionRequest,
    responses(
        (status = 200, description = "Script outcome and output", body = StatusResponse),
        (status = 400, description = "Invalid request body or file name"),
        (status = 405, description = "Invalid request method")
    )
)]
#[tracing::instrument(skip_all)]
pub async fn partition_file(State(state): State<AppState>, body: Bytes) -> Result<Json<StatusResponse>> {
    let request = decode_request(&body)?;

    let path = state.uploads.resolve_path_or_dir(&request.file).map_err(|_| Error::BadRequest {
        message: "Invalid file name.".to_string(),
    })?;

    tracing::info!(file = %request.file, columns = ?request.columns, "Starting partitioning");

    let response = match state.runner.run(path, request.columns).await {
        Ok(output) if output.success() => {
            tracing::info!(file = %request.file, "Partitioning completed");
            StatusResponse::ok("Partitioning completed.").with_log(output.log)
        }
        Ok(output) => {
            let status = output.describe_status();
            tracing::warn!(file = %request.file, %status, "Partitioning script failed");
            StatusResponse::failed(format!("Error executing script: {status}")).with_log(output.log)
        }
        Err(e) => {
            tracing::error!(file = %request.file, error = %e, "Failed to run partitioning script");
            StatusResponse::failed(format!("Error executing script: {e}"))
        }
    };

    Ok(Json(response))
}

/// Decode the first JSON value in the body. Anything after it is ignored.
fn decode_request(body: &[u8]) -> Result<PartitionRequest> {
    let invalid = || Error::BadRequest {
        message: "Invalid request body.".to_string(),
    };

    serde_json::Deserializer::from_slice(body)
        .into_iter::<PartitionRequest>()
        .next()
        .ok_or_else(invalid)?
        .map_err(|e| {
            tracing::debug!(error = %e, "Rejected partition request body");
            invalid()
        })
}

#[cfg(test)]
mod tests {
    use crate::test_utils::{TestEnv, upload};
    use axum::http::StatusCode;
    use serde_json::{Value, json};

    #[tokio::test]
    async fn test_partition_success_returns_log() {
        let env = TestEnv::with_script("echo done\n");
        let server = env.server().await;
        upload(&server, "data.csv", "a,b,c\n1,2,3\n").await;

        let response = server
            .post("/partition")
            .json(&json!({"file": "data.csv", "columns": ["a", "b"]}))
            .await;

        response.assert_status(StatusCode::OK);
        response.assert_json(&json!({"success": true, "message": "Partitioning completed.", "log": "done\n"}));
    }

    #[tokio::test]
    async fn test_partition_passes_resolved_path_and_columns() {
        let env = TestEnv::with_script("printf '%s\\n' \"$@\"\n");
        let server = env.server().await;
        upload(&server, "data.csv", "region,age group\n").await;

        let response = server
            .post("/partition")
            .json(&json!({"file": "data.csv", "columns": ["region", "age group"]}))
            .await;

        let expected_path = env.uploads_dir().join("data.csv");
        let body: Value = response.json();
        assert_eq!(body["success"], json!(true));
        assert_eq!(
            body["log"].as_str().unwrap(),
            format!("{}\nregion\nage group\n", expected_path.display())
        );
    }

    #[tokio::test]
    async fn test_partition_missing_file_reported_by_script() {
        let env = TestEnv::with_script("if [ ! -f \"$1\" ]; then echo \"no such file: $1\" >&2; exit 1; fi\necho ok\n");
        let server = env.server().await;

        let response = server
            .post("/partition")
            .json(&json!({"file": "ghost.csv", "columns": ["a"]}))
            .await;

        response.assert_status(StatusCode::OK);
        let body: Value = response.json();
        assert_eq!(body["success"], json!(false));
        assert_eq!(body["message"], json!("Error executing script: exit status 1"));
        assert!(body["log"].as_str().unwrap().contains("no such file"));
    }

    #[tokio::test]
    async fn test_partition_launch_failure() {
        let mut env = TestEnv::new();
        env.config.partition.interpreter = "/nonexistent/interpreter-for-tests".to_string();
        let server = env.server().await;

        let response = server.post("/partition").json(&json!({"file": "data.csv", "columns": []})).await;

        response.assert_status(StatusCode::OK);
        let body: Value = response.json();
        assert_eq!(body["success"], json!(false));
        assert!(body["message"].as_str().unwrap().starts_with("Error executing script: "));
        assert!(body.get("log").is_none());
    }

    #[tokio::test]
    async fn test_partition_without_file_hands_script_the_uploads_dir() {
        let env = TestEnv::with_script("printf '%s\\n' \"$@\"\n");
        let server = env.server().await;

        for body in [json!({"columns": ["a"]}), json!({"file": "", "columns": ["a"]})] {
            let response = server.post("/partition").json(&body).await;

            response.assert_status(StatusCode::OK);
            response.assert_json(&json!({
                "success": true,
                "message": "Partitioning completed.",
                "log": format!("{}\na\n", env.uploads_dir().display()),
            }));
        }
    }

    #[tokio::test]
    async fn test_partition_accepts_trailing_bytes_after_body() {
        let env = TestEnv::new();
        let server = env.server().await;

        let response = server.post("/partition").text(r#"{"file": "data.csv", "columns": []} trailing"#).await;

        response.assert_status(StatusCode::OK);
        response.assert_json(&json!({"success": true, "message": "Partitioning completed.", "log": "done\n"}));
    }

    #[tokio::test]
    async fn test_partition_empty_body() {
        let env = TestEnv::new();
        let server = env.server().await;

        let response = server.post("/partition").text("").await;

        response.assert_status(StatusCode::BAD_REQUEST);
        response.assert_text("Invalid request body.");
    }

    #[tokio::test]
    async fn test_partition_invalid_json() {
        let env = TestEnv::new();
        let server = env.server().await;

        let response = server.post("/partition").text("{not json").await;

        response.assert_status(StatusCode::BAD_REQUEST);
        response.assert_text("Invalid request body.");
    }

    #[tokio::test]
    async fn test_partition_wrong_column_type() {
        let env = TestEnv::new();
        let server = env.server().await;

        let response = server.post("/partition").json(&json!({"file": "data.csv", "columns": "a"})).await;

        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_partition_rejects_path_traversal() {
        let env = TestEnv::with_script("echo should not run\n");
        let server = env.server().await;

        let response = server
            .post("/partition")
            .json(&json!({"file": "../../etc/passwd", "columns": []}))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        response.assert_text("Invalid file name.");
    }

    #[tokio::test]
    async fn test_partition_requires_post() {
        let env = TestEnv::new();
        let server = env.server().await;

        let response = server.get("/partition").await;

        response.assert_status(StatusCode::METHOD_NOT_ALLOWED);
    }
}
