//! Platform-specific termination of supervised processes.

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::{Child, Command};
use tracing::{debug, warn};

use crate::error::SupervisorResult;

#[cfg(test)]
use mockall::automock;

/// Stops a child process and waits until it has exited.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait Terminator: Send + Sync {
    /// Terminate `child` and reap it. Returns its exit code when it has one.
    async fn terminate(&self, child: &mut Child) -> SupervisorResult<Option<i32>>;
}

/// Cooperative termination: `SIGTERM`, then wait.
///
/// Falls back to a forced kill when the process is still alive after the
/// timeout.
pub struct GracefulTerminator {
    timeout: Duration,
}

impl GracefulTerminator {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

#[async_trait]
impl Terminator for GracefulTerminator {
    async fn terminate(&self, child: &mut Child) -> SupervisorResult<Option<i32>> {
        let Some(pid) = child.id() else {
            // Already reaped
            return Ok(child.try_wait()?.and_then(|s| s.code()));
        };

        debug!("Sending SIGTERM to {}", pid);
        let signalled = Command::new("kill")
            .arg("-TERM")
            .arg(pid.to_string())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map(|s| s.success())
            .unwrap_or(false);

        if signalled {
            if let Ok(status) = tokio::time::timeout(self.timeout, child.wait()).await {
                return Ok(status?.code());
            }
            warn!(
                "Process {} still running {:?} after SIGTERM, killing",
                pid, self.timeout
            );
        } else {
            warn!("Could not signal process {}, killing", pid);
        }

        child.kill().await?;
        Ok(child.wait().await?.code())
    }
}

/// Forced termination of the whole process tree via `taskkill`.
pub struct ForcefulTerminator;

#[async_trait]
impl Terminator for ForcefulTerminator {
    async fn terminate(&self, child: &mut Child) -> SupervisorResult<Option<i32>> {
        let Some(pid) = child.id() else {
            return Ok(child.try_wait()?.and_then(|s| s.code()));
        };

        debug!("Running taskkill for {}", pid);
        let killed = Command::new("taskkill")
            .args(["/F", "/T", "/PID"])
            .arg(pid.to_string())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map(|s| s.success())
            .unwrap_or(false);

        if !killed {
            warn!("taskkill failed for {}, killing directly", pid);
            child.kill().await?;
        }
        Ok(child.wait().await?.code())
    }
}

/// The terminator for the platform this binary was built for.
pub fn platform_terminator(timeout: Duration) -> Box<dyn Terminator> {
    if cfg!(windows) {
        Box::new(ForcefulTerminator)
    } else {
        Box::new(GracefulTerminator::new(timeout))
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn spawn(script: &str) -> Child {
        Command::new("sh")
            .arg("-c")
            .arg(script)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .unwrap()
    }

    #[tokio::test]
    async fn test_graceful_stops_sleeping_process() {
        let mut child = spawn("sleep 30");
        let terminator = GracefulTerminator::new(Duration::from_secs(5));

        terminator.terminate(&mut child).await.unwrap();
        assert!(child.try_wait().unwrap().is_some());
    }

    #[tokio::test]
    async fn test_graceful_escalates_when_term_ignored() {
        let mut child = spawn("trap '' TERM; sleep 30");
        // Let the shell install its trap before signalling.
        tokio::time::sleep(Duration::from_millis(200)).await;

        let terminator = GracefulTerminator::new(Duration::from_millis(300));
        let started = std::time::Instant::now();
        terminator.terminate(&mut child).await.unwrap();

        assert!(child.try_wait().unwrap().is_some());
        assert!(started.elapsed() < Duration::from_secs(10));
    }

    #[tokio::test]
    async fn test_already_exited_process() {
        let mut child = spawn("exit 4");
        child.wait().await.unwrap();

        let code = GracefulTerminator::new(Duration::from_secs(1))
            .terminate(&mut child)
            .await
            .unwrap();
        assert_eq!(code, Some(4));
    }
}
