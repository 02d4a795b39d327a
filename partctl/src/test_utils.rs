//! Test utilities: an isolated directory layout and a test server built on it.

use crate::config::{Config, PartitionConfig};
use axum_test::multipart::{MultipartForm, Part};
use axum_test::{TestResponse, TestServer};
use std::path::{Path, PathBuf};

pub const TEST_INDEX_HTML: &str = "<!DOCTYPE html>\n<html><body><h1>partctl test index</h1></body></html>\n";

/// Write a POSIX shell script to `dir` and return its path. Run it with `sh`.
pub fn write_script(dir: &Path, body: &str) -> PathBuf {
    let path = dir.join("partition_stub.sh");
    std::fs::write(&path, body).expect("Failed to write stub script");
    path
}

/// Temporary uploads and static directories plus a stub partitioning script.
///
/// Everything is removed when the value is dropped, so keep it alive for the whole test.
pub struct TestEnv {
    root: tempfile::TempDir,
    pub config: Config,
}

impl TestEnv {
    pub fn new() -> Self {
        Self::with_script("echo done\n")
    }

    pub fn with_script(body: &str) -> Self {
        let root = tempfile::tempdir().expect("Failed to create temp dir");
        let uploads_dir = root.path().join("uploads");
        let static_dir = root.path().join("static");
        std::fs::create_dir(&uploads_dir).expect("Failed to create uploads dir");
        std::fs::create_dir(&static_dir).expect("Failed to create static dir");
        std::fs::write(static_dir.join("index.html"), TEST_INDEX_HTML).expect("Failed to write index.html");
        std::fs::write(static_dir.join("script.js"), "console.log('test');\n").expect("Failed to write script.js");

        let script = write_script(root.path(), body);

        let config = Config {
            host: "127.0.0.1".to_string(),
            port: 0,
            uploads_dir,
            static_dir,
            partition: PartitionConfig {
                interpreter: "sh".to_string(),
                script,
            },
            ..Default::default()
        };

        Self { root, config }
    }

    pub fn root(&self) -> &Path {
        self.root.path()
    }

    pub fn uploads_dir(&self) -> &Path {
        &self.config.uploads_dir
    }

    pub async fn server(&self) -> TestServer {
        crate::Application::new(self.config.clone())
            .await
            .expect("Failed to create application")
            .into_test_server()
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}

/// Upload `content` as a multipart `file` field named `filename`
pub async fn upload(server: &TestServer, filename: &str, content: &str) -> TestResponse {
    let part = Part::bytes(content.as_bytes().to_vec()).file_name(filename).mime_type("text/csv");
    server.post("/upload").multipart(MultipartForm::new().add_part("file", part)).await
}
