//! Application configuration management.
//!
//! Configuration is loaded from a YAML file with environment variable overrides. The configuration
//! file path defaults to `config.yaml` but can be specified via `-f` flag or `PARTCTL_CONFIG`
//! environment variable. A missing file is not an error: every field has a default, and the
//! defaults reproduce a server listening on port 8080 that stores uploads under `./uploads`.
//!
//! ## Loading Priority
//!
//! 1. **YAML config file** - Base configuration (default: `config.yaml`)
//! 2. **Environment variables** - Variables prefixed with `PARTCTL_` override YAML values
//!
//! For nested config values, use double underscores in environment variables. For example,
//! `PARTCTL_PARTITION__SCRIPT=/opt/partition/main.py` sets the `partition.script` field.
//!
//! ## Example
//!
//! ```yaml
//! host: 127.0.0.1
//! port: 8080
//! uploads_dir: /var/lib/partctl/uploads
//! static_dir: ./static
//! partition:
//!   interpreter: python3
//!   script: main.py
//! enable_metrics: true
//! ```

use clap::Parser;
use figment::{
    Figment,
    providers::{Env, Format, Yaml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::errors::Error;

/// Simple CLI args - just for specifying config file
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to configuration file
    #[arg(short = 'f', long, env = "PARTCTL_CONFIG", default_value = "config.yaml")]
    pub config: String,

    /// Validate configuration and exit without starting the server.
    #[arg(long)]
    pub validate: bool,
}

/// Main application configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// HTTP server host to bind to (e.g., "0.0.0.0" for all interfaces)
    pub host: String,
    /// HTTP server port to bind to
    pub port: u16,
    /// Flat directory holding every uploaded file, keyed by file name
    pub uploads_dir: PathBuf,
    /// Directory served under `/static`; its `index.html` is the landing page
    pub static_dir: PathBuf,
    /// External partitioning script invocation
    pub partition: PartitionConfig,
    /// Enable Prometheus metrics endpoint at `/internal/metrics`
    pub enable_metrics: bool,
    /// Enable OpenTelemetry OTLP export for distributed tracing
    pub enable_otel_export: bool,
    /// Serve the OpenAPI document at `/openapi.json` and its viewer at `/docs`
    pub enable_docs: bool,
}

/// How the partitioning script is launched.
///
/// The command line is `<interpreter> <script> <file path> <column>...`.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct PartitionConfig {
    /// Program used to run the script
    pub interpreter: String,
    /// Path of the script, passed as the interpreter's first argument
    pub script: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            uploads_dir: PathBuf::from("uploads"),
            static_dir: PathBuf::from("static"),
            partition: PartitionConfig::default(),
            enable_metrics: false,
            enable_otel_export: false,
            enable_docs: true,
        }
    }
}

impl Default for PartitionConfig {
    fn default() -> Self {
        Self {
            interpreter: "python3".to_string(),
            script: PathBuf::from("main.py"),
        }
    }
}

impl Config {
    #[allow(clippy::result_large_err)]
    pub fn load(args: &Args) -> Result<Self, figment::Error> {
        let config: Self = Self::figment(args).extract()?;
        config.validate().map_err(|e| figment::Error::from(e.to_string()))?;
        Ok(config)
    }

    /// Validate the configuration for consistency and required fields
    pub fn validate(&self) -> Result<(), Error> {
        if self.uploads_dir.as_os_str().is_empty() {
            return Err(Error::Internal {
                operation: "Config validation: uploads_dir cannot be empty".to_string(),
            });
        }

        if self.static_dir.as_os_str().is_empty() {
            return Err(Error::Internal {
                operation: "Config validation: static_dir cannot be empty".to_string(),
            });
        }

        if self.partition.interpreter.trim().is_empty() {
            return Err(Error::Internal {
                operation: "Config validation: partition.interpreter cannot be empty. \
                            Set it to the program that runs the partitioning script (e.g. python3)."
                    .to_string(),
            });
        }

        if self.partition.script.as_os_str().is_empty() {
            return Err(Error::Internal {
                operation: "Config validation: partition.script cannot be empty".to_string(),
            });
        }

        Ok(())
    }

    pub fn figment(args: &Args) -> Figment {
        Figment::new()
            .merge(Yaml::file(&args.config))
            // PARTCTL_CONFIG names the file itself and is consumed by clap
            .merge(Env::prefixed("PARTCTL_").ignore(&["config"]).split("__"))
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Path of the landing page served for `/` and unknown routes
    pub fn index_path(&self) -> PathBuf {
        self.static_dir.join("index.html")
    }
}
