//! # partctl: CSV upload and partitioning service
//!
//! `partctl` is a small HTTP server in front of a directory of uploaded CSV files and an external
//! partitioning script. Clients upload a CSV file, list what has been uploaded, ask for a file's
//! header columns, and then ask for the file to be partitioned by a chosen set of columns. The
//! partitioning itself is done entirely by the script: `partctl` runs it as a subprocess with
//! the file path and column names as arguments and relays its output.
//!
//! ## Architecture
//!
//! The HTTP layer is built on [Axum](https://github.com/tokio-rs/axum). There is no database and
//! no in-memory state shared between requests: the uploads directory is the only persistent
//! state, accessed through [`storage::UploadStore`].
//!
//! - [`api`]: route handlers and request/response models
//! - [`storage`]: listing, resolving and writing files in the uploads directory
//! - [`csv_header`]: parsing the first record of a CSV file
//! - [`partition`]: running the partitioning script and capturing its combined output
//! - [`config`]: YAML + environment configuration
//! - [`telemetry`]: tracing setup
//!
//! ## Quick Start
//!
//! ```no_run
//! use clap::Parser;
//! use partctl::{Application, Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let args = partctl::config::Args::parse();
//!     let config = Config::load(&args)?;
//!
//!     partctl::telemetry::init_telemetry(config.enable_otel_export)?;
//!
//!     let app = Application::new(config).await?;
//!     app.serve(async {
//!         tokio::signal::ctrl_c().await.expect("Failed to listen for Ctrl+C");
//!     })
//!     .await?;
//!
//!     Ok(())
//! }
//! ```
pub mod api;
pub mod config;
pub mod csv_header;
pub mod errors;
mod openapi;
pub mod partition;
pub mod storage;
pub mod telemetry;

#[cfg(test)]
pub mod test_utils;

use crate::{api::handlers, openapi::ApiDoc, partition::PartitionRunner, storage::UploadStore};
use anyhow::Context;
use axum::extract::DefaultBodyLimit;
use axum::{
    Json, Router,
    routing::{get, post},
};
use axum_prometheus::PrometheusMetricLayer;
use bon::Builder;
pub use config::Config;
use tokio::net::TcpListener;
use tower_http::{
    services::{ServeDir, ServeFile},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{Level, debug, info, instrument};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

/// Application state shared across all request handlers.
///
/// ```ignore
/// let state = AppState::builder()
///     .config(config)
///     .uploads(UploadStore::new("uploads"))
///     .runner(PartitionRunner::new("python3", "main.py"))
///     .build();
/// ```
#[derive(Clone, Builder)]
pub struct AppState {
    pub config: Config,
    pub uploads: UploadStore,
    pub runner: PartitionRunner,
}

/// Build the application router with all routes and middleware.
///
/// - `POST /upload`, `GET /files`, `GET /columns`, `POST /partition`: the API
/// - `/static/*`: files from the static directory
/// - everything else: the index page
#[instrument(skip_all)]
pub fn build_router(state: &AppState) -> Router {
    let config = &state.config;

    // Uploads are stored without a size limit
    let upload_route = post(handlers::files::upload_file)
        .layer(DefaultBodyLimit::disable())
        .fallback(handlers::method_not_allowed);

    let mut router = Router::new()
        .route("/upload", upload_route)
        .route("/files", get(handlers::files::list_files).fallback(handlers::method_not_allowed))
        .route("/columns", get(handlers::files::get_columns).fallback(handlers::method_not_allowed))
        .route(
            "/partition",
            post(handlers::partition::partition_file).fallback(handlers::method_not_allowed),
        )
        .route("/healthz", get(|| async { "OK" }));

    if config.enable_docs {
        router = router
            .route("/openapi.json", get(|| async { Json(ApiDoc::openapi()) }))
            .merge(Scalar::with_url("/docs", ApiDoc::openapi()));
    }

    let mut router = router
        .nest_service("/static", ServeDir::new(&config.static_dir))
        .fallback_service(ServeFile::new(config.index_path()))
        .with_state(state.clone());

    if config.enable_metrics {
        let (prometheus_layer, metric_handle) = PrometheusMetricLayer::pair();
        router = router
            .route("/internal/metrics", get(|| async move { metric_handle.render() }))
            .layer(prometheus_layer);
    }

    router.layer(
        TraceLayer::new_for_http()
            .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
            .on_request(DefaultOnRequest::new().level(Level::INFO))
            .on_response(DefaultOnResponse::new().level(Level::INFO)),
    )
}

/// The HTTP server and everything it needs.
///
/// 1. **Create**: [`Application::new`] prepares the uploads directory and builds the router
/// 2. **Serve**: [`Application::serve`] binds to the configured address and handles requests
///    until the shutdown future resolves
pub struct Application {
    router: Router,
    config: Config,
}

impl Application {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        debug!("Starting partctl with configuration: {:#?}", config);

        let uploads = UploadStore::new(&config.uploads_dir);
        uploads
            .ensure_dir()
            .await
            .with_context(|| format!("Failed to create uploads directory {}", config.uploads_dir.display()))?;

        let state = AppState::builder()
            .config(config.clone())
            .uploads(uploads)
            .runner(PartitionRunner::from_config(&config.partition))
            .build();

        let router = build_router(&state);

        Ok(Self { router, config })
    }

    /// Convert application into a test server (for tests)
    #[cfg(test)]
    pub fn into_test_server(self) -> axum_test::TestServer {
        axum_test::TestServer::new(self.router).expect("Failed to create test server")
    }

    /// Start serving the application
    pub async fn serve<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let bind_addr = self.config.bind_address();
        let listener = TcpListener::bind(&bind_addr).await?;
        info!(
            "Server is listening on http://{}, uploads stored in {}",
            bind_addr,
            self.config.uploads_dir.display()
        );

        axum::serve(listener, self.router).with_graceful_shutdown(shutdown).await?;

        info!("Shutting down telemetry...");
        telemetry::shutdown_telemetry();

        Ok(())
    }
}
