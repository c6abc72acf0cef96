//! Supervisor configuration.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Settings for launching generated applications.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupervisorConfig {
    /// Port every launched application is pinned to
    pub port: u16,
    /// Host shown in the reported address
    pub host: String,
    /// File the running artifact is written to before each launch
    pub artifact_path: PathBuf,
    /// Interpreter executable
    pub interpreter: String,
    /// Arguments placed before the artifact path
    pub interpreter_args: Vec<String>,
    /// Delay between spawn and the first liveness poll
    pub grace_period: Duration,
    /// How long a cooperative terminate may take before a forced kill
    pub terminate_timeout: Duration,
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        Self {
            port: 7861,
            host: "localhost".to_string(),
            artifact_path: PathBuf::from("temp_generated_app.py"),
            interpreter: default_interpreter().to_string(),
            interpreter_args: Vec::new(),
            grace_period: Duration::from_secs(2),
            terminate_timeout: Duration::from_secs(10),
        }
    }
}

impl SupervisorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn artifact_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.artifact_path = path.into();
        self
    }

    pub fn interpreter(mut self, interpreter: impl Into<String>) -> Self {
        self.interpreter = interpreter.into();
        self
    }

    pub fn interpreter_args(mut self, args: Vec<String>) -> Self {
        self.interpreter_args = args;
        self
    }

    pub fn grace_period(mut self, period: Duration) -> Self {
        self.grace_period = period;
        self
    }

    pub fn terminate_timeout(mut self, timeout: Duration) -> Self {
        self.terminate_timeout = timeout;
        self
    }

    /// Address where the launched application is served.
    pub fn address(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }

    /// Full command line, for logging.
    pub fn command_line(&self) -> String {
        let mut parts = vec![self.interpreter.clone()];
        parts.extend(self.interpreter_args.iter().cloned());
        parts.push(self.artifact_path.to_string_lossy().to_string());
        parts.join(" ")
    }

    /// Build the child command with piped output.
    pub(crate) fn command(&self) -> tokio::process::Command {
        let mut command = tokio::process::Command::new(&self.interpreter);
        command
            .args(&self.interpreter_args)
            .arg(self.artifact_path.as_os_str())
            .env("PYTHONUNBUFFERED", "1")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        // On Windows, use CREATE_NO_WINDOW to prevent a console window from showing
        #[cfg(windows)]
        {
            const CREATE_NO_WINDOW: u32 = 0x08000000;
            command.creation_flags(CREATE_NO_WINDOW);
        }

        command
    }
}

fn default_interpreter() -> &'static str {
    if cfg!(windows) {
        "python"
    } else {
        "python3"
    }
}
