//! The process supervisor and its status reports.

use std::fmt;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use smol_syntax::SyntaxValidator;
use tokio::process::Child;
use tracing::{debug, info, warn};

use crate::capture::OutputCapture;
use crate::config::SupervisorConfig;
use crate::error::{SupervisorError, SupervisorResult};
use crate::rewrite::rewrite_launch_port;
use crate::terminate::{platform_terminator, Terminator};

/// Upper bound on waiting for output readers after the child has exited.
const DRAIN_TIMEOUT: Duration = Duration::from_millis(500);

/// Observable state of the supervised application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum StatusReport {
    NotStarted,
    Running { pid: u32, address: String },
    Exited { exit_code: Option<i32>, stderr: String },
}

impl StatusReport {
    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running { .. })
    }
}

impl fmt::Display for StatusReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotStarted => write!(f, "No application has been launched yet."),
            Self::Running { address, .. } => write!(
                f,
                "Generated application is running. View it at {} in your browser.",
                address
            ),
            Self::Exited { exit_code, stderr } => {
                let code = exit_code
                    .map(|c| c.to_string())
                    .unwrap_or_else(|| "none (terminated by signal)".to_string());
                write!(f, "Application has stopped. Exit code: {}\nError: {}", code, stderr)
            }
        }
    }
}

/// The single child process owned by a supervisor.
struct SupervisedProcess {
    child: Child,
    pid: u32,
    capture: OutputCapture,
    exit_code: Option<Option<i32>>,
}

impl SupervisedProcess {
    /// Non-blocking liveness check. Caches the exit code once known.
    fn poll(&mut self) -> SupervisorResult<bool> {
        if self.exit_code.is_some() {
            return Ok(false);
        }
        match self.child.try_wait()? {
            Some(status) => {
                debug!("Process {} exited with {}", self.pid, status);
                self.exit_code = Some(status.code());
                Ok(false)
            }
            None => Ok(true),
        }
    }

    async fn exited_report(&mut self) -> StatusReport {
        self.capture.drain(DRAIN_TIMEOUT).await;
        StatusReport::Exited {
            exit_code: self.exit_code.flatten(),
            stderr: self.capture.stderr(),
        }
    }
}

/// Launches generated applications and keeps at most one of them alive.
///
/// Operations take `&mut self`; a supervisor is driven by one caller at a
/// time.
pub struct ProcessSupervisor {
    config: SupervisorConfig,
    terminator: Box<dyn Terminator>,
    current: Option<SupervisedProcess>,
}

impl ProcessSupervisor {
    /// Create a supervisor using the platform's terminator.
    pub fn new(config: SupervisorConfig) -> Self {
        let terminator = platform_terminator(config.terminate_timeout);
        Self::with_terminator(config, terminator)
    }

    pub fn with_terminator(config: SupervisorConfig, terminator: Box<dyn Terminator>) -> Self {
        Self {
            config,
            terminator,
            current: None,
        }
    }

    /// PID of the supervised process, if one was launched.
    pub fn pid(&self) -> Option<u32> {
        self.current.as_ref().map(|p| p.pid)
    }

    /// Captured stdout of the supervised process.
    pub fn stdout(&self) -> Option<String> {
        self.current.as_ref().map(|p| p.capture.stdout())
    }

    /// Validate, persist and start `code`, replacing any running application.
    pub async fn launch(&mut self, code: &str) -> SupervisorResult<StatusReport> {
        let check = SyntaxValidator::validate(code);
        if !check.valid {
            warn!("Refusing to launch: {}", check.message);
            return Err(SupervisorError::SyntaxInvalid(check.message));
        }

        self.stop_current().await?;

        let code = rewrite_launch_port(code, self.config.port);
        write_artifact(&self.config.artifact_path, &code).await?;

        info!("Launching: {}", self.config.command_line());
        let mut child = self.config.command().spawn().map_err(|e| {
            SupervisorError::LaunchFailed(format!(
                "Failed to spawn {}: {}",
                self.config.interpreter, e
            ))
        })?;
        let pid = child.id().unwrap_or(0);
        let capture = OutputCapture::attach(&mut child);

        let process = self.current.insert(SupervisedProcess {
            child,
            pid,
            capture,
            exit_code: None,
        });

        tokio::time::sleep(self.config.grace_period).await;

        if process.poll()? {
            info!("Application running (pid {}) at {}", pid, self.config.address());
            Ok(StatusReport::Running {
                pid,
                address: self.config.address(),
            })
        } else {
            process.capture.drain(DRAIN_TIMEOUT).await;
            let stderr = process.capture.stderr();
            warn!("Application exited during grace period (pid {})", pid);
            Err(SupervisorError::ProcessExitedEarly(stderr))
        }
    }

    /// Report the current state without waiting on the process.
    pub async fn status(&mut self) -> StatusReport {
        let address = self.config.address();
        let Some(process) = self.current.as_mut() else {
            return StatusReport::NotStarted;
        };

        match process.poll() {
            Ok(true) => StatusReport::Running {
                pid: process.pid,
                address,
            },
            Ok(false) => process.exited_report().await,
            Err(e) => {
                warn!("Could not poll process {}: {}", process.pid, e);
                StatusReport::Exited {
                    exit_code: None,
                    stderr: format!("{} (status unavailable: {})", process.capture.stderr(), e),
                }
            }
        }
    }

    /// Stop the supervised process, returning its final report.
    pub async fn terminate(&mut self) -> SupervisorResult<Option<StatusReport>> {
        if self.current.is_none() {
            return Ok(None);
        }
        self.stop_current().await?;
        Ok(match self.current.take() {
            Some(mut process) => Some(process.exited_report().await),
            None => None,
        })
    }

    /// Terminate and reap the current process if it is still alive.
    async fn stop_current(&mut self) -> SupervisorResult<()> {
        let Some(process) = self.current.as_mut() else {
            return Ok(());
        };
        if !process.poll().unwrap_or(true) {
            return Ok(());
        }

        info!("Stopping previous application (pid {})", process.pid);
        let code = match self.terminator.terminate(&mut process.child).await {
            Ok(code) => code,
            Err(e) => {
                warn!("Terminate failed for {}: {}, killing", process.pid, e);
                process.child.kill().await.map_err(|e| {
                    SupervisorError::LaunchFailed(format!(
                        "Could not stop previous application (pid {}): {}",
                        process.pid, e
                    ))
                })?;
                None
            }
        };
        process.exit_code = Some(code);
        Ok(())
    }
}

async fn write_artifact(path: &Path, code: &str) -> SupervisorResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, code).await?;
    debug!("Wrote {} bytes to {}", code.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terminate::MockTerminator;

    fn config(dir: &Path, script: &str) -> SupervisorConfig {
        SupervisorConfig::new()
            .artifact_path(dir.join("app.py"))
            .interpreter("sh")
            .interpreter_args(vec!["-c".into(), script.into(), "sh".into()])
            .grace_period(Duration::from_millis(300))
    }

    #[test]
    fn test_status_messages() {
        assert_eq!(
            StatusReport::NotStarted.to_string(),
            "No application has been launched yet."
        );

        let running = StatusReport::Running {
            pid: 1,
            address: "http://localhost:7861".into(),
        };
        assert!(running.to_string().contains("http://localhost:7861"));
        assert!(running.is_running());

        let exited = StatusReport::Exited {
            exit_code: Some(1),
            stderr: "Traceback".into(),
        };
        assert_eq!(
            exited.to_string(),
            "Application has stopped. Exit code: 1\nError: Traceback"
        );
    }

    #[test]
    fn test_report_serializes_with_state_tag() {
        let json = serde_json::to_value(StatusReport::NotStarted).unwrap();
        assert_eq!(json["state"], "not_started");
    }

    #[tokio::test]
    async fn test_invalid_syntax_skips_everything() {
        let dir = tempfile::tempdir().unwrap();
        let mut terminator = MockTerminator::new();
        terminator.expect_terminate().times(0);
        let mut supervisor =
            ProcessSupervisor::with_terminator(config(dir.path(), "sleep 30"), Box::new(terminator));

        let err = supervisor.launch("title = \"unterminated\n").await.unwrap_err();
        assert!(matches!(err, SupervisorError::SyntaxInvalid(_)));
        assert!(!dir.path().join("app.py").exists());
        assert!(supervisor.pid().is_none());
        assert_eq!(supervisor.status().await, StatusReport::NotStarted);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_relaunch_terminates_live_process() {
        let dir = tempfile::tempdir().unwrap();
        let mut terminator = MockTerminator::new();
        terminator.expect_terminate().times(1).returning(|child| {
            child.start_kill()?;
            Ok(None)
        });
        let mut supervisor =
            ProcessSupervisor::with_terminator(config(dir.path(), "sleep 30"), Box::new(terminator));

        supervisor.launch("print(1)\n").await.unwrap();
        supervisor.launch("print(2)\n").await.unwrap();
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_exited_process_is_not_terminated() {
        let dir = tempfile::tempdir().unwrap();
        let mut terminator = MockTerminator::new();
        terminator.expect_terminate().times(0);
        let mut supervisor =
            ProcessSupervisor::with_terminator(config(dir.path(), "exit 0"), Box::new(terminator));

        assert!(supervisor.launch("print(1)\n").await.is_err());
        assert!(supervisor.launch("print(2)\n").await.is_err());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_terminate_without_process() {
        let dir = tempfile::tempdir().unwrap();
        let mut supervisor = ProcessSupervisor::new(config(dir.path(), "sleep 30"));
        assert!(supervisor.terminate().await.unwrap().is_none());
    }
}
