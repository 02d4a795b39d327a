//! Runs the external partitioning script.
//!
//! The script is invoked as `<interpreter> <script> <file path> <column>...`. Arguments go
//! straight to the process, never through a shell. Standard output and standard error are
//! attached to the same pipe, so the captured log keeps the order in which the script wrote
//! to either stream. There is no timeout: a request waits for the script to finish.

use std::ffi::OsString;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};
use tracing::{debug, instrument};

use crate::config::PartitionConfig;

/// Captured result of one script run.
#[derive(Debug, Clone)]
pub struct ScriptOutput {
    pub status: ExitStatus,
    /// Combined stdout and stderr, decoded as UTF-8 (invalid sequences replaced)
    pub log: String,
}

impl ScriptOutput {
    pub fn success(&self) -> bool {
        self.status.success()
    }

    /// Short description of how the script ended, e.g. `exit status 2`
    pub fn describe_status(&self) -> String {
        if let Some(code) = self.status.code() {
            return format!("exit status {code}");
        }

        #[cfg(unix)]
        {
            use std::os::unix::process::ExitStatusExt;
            if let Some(signal) = self.status.signal() {
                return format!("terminated by signal {signal}");
            }
        }

        self.status.to_string()
    }
}

#[derive(Debug, Clone)]
pub struct PartitionRunner {
    interpreter: String,
    script: PathBuf,
}

impl PartitionRunner {
    pub fn new(interpreter: impl Into<String>, script: impl Into<PathBuf>) -> Self {
        Self {
            interpreter: interpreter.into(),
            script: script.into(),
        }
    }

    pub fn from_config(config: &PartitionConfig) -> Self {
        Self::new(config.interpreter.clone(), config.script.clone())
    }

    /// Arguments passed to the interpreter, in order
    pub fn command_args(&self, file_path: &Path, columns: &[String]) -> Vec<OsString> {
        let mut args = Vec::with_capacity(columns.len() + 2);
        args.push(self.script.clone().into_os_string());
        args.push(file_path.as_os_str().to_owned());
        args.extend(columns.iter().map(OsString::from));
        args
    }

    /// Run the script to completion on the blocking pool.
    ///
    /// Returns `Err` only when the process could not be started or its output could not be
    /// read. A script that runs and exits non-zero is an `Ok` with a failed status.
    #[instrument(skip(self, columns), fields(interpreter = %self.interpreter, script = %self.script.display(), columns = columns.len()))]
    pub async fn run(&self, file_path: PathBuf, columns: Vec<String>) -> io::Result<ScriptOutput> {
        let runner = self.clone();
        tokio::task::spawn_blocking(move || runner.run_blocking(&file_path, &columns))
            .await
            .map_err(io::Error::other)?
    }

    fn run_blocking(&self, file_path: &Path, columns: &[String]) -> io::Result<ScriptOutput> {
        let (mut reader, writer) = io::pipe()?;

        let mut command = Command::new(&self.interpreter);
        command
            .args(self.command_args(file_path, columns))
            .stdin(Stdio::null())
            .stdout(writer.try_clone()?)
            .stderr(writer);

        let mut child = command.spawn()?;
        // The command still owns our write ends; they must be closed or the read never hits EOF.
        drop(command);

        let mut output = Vec::new();
        if let Err(e) = reader.read_to_end(&mut output) {
            let _ = child.kill();
            let _ = child.wait();
            return Err(e);
        }

        let status = child.wait()?;
        debug!(%status, bytes = output.len(), "Partitioning script exited");

        Ok(ScriptOutput {
            status,
            log: String::from_utf8_lossy(&output).into_owned(),
        })
    }
}
