//! Background draining of a child's stdout and stderr.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Child;
use tokio::task::JoinHandle;
use tracing::debug;

/// Lines kept per stream; older lines are dropped first.
const MAX_CAPTURED_LINES: usize = 500;

type LineBuffer = Arc<RwLock<VecDeque<String>>>;

/// Captured output of a supervised process.
///
/// Reader tasks keep the pipes empty so a chatty child never blocks on a full
/// pipe. Reading the buffers does not consume them.
pub struct OutputCapture {
    stdout: LineBuffer,
    stderr: LineBuffer,
    readers: Vec<JoinHandle<()>>,
}

impl OutputCapture {
    /// Take the child's piped streams and start draining them.
    pub fn attach(child: &mut Child) -> Self {
        let stdout = LineBuffer::default();
        let stderr = LineBuffer::default();
        let readers = vec![
            spawn_reader(child.stdout.take(), stdout.clone(), "stdout"),
            spawn_reader(child.stderr.take(), stderr.clone(), "stderr"),
        ];

        Self {
            stdout,
            stderr,
            readers,
        }
    }

    pub fn stdout(&self) -> String {
        join_lines(&self.stdout)
    }

    pub fn stderr(&self) -> String {
        join_lines(&self.stderr)
    }

    /// Wait up to `timeout` for both streams to reach end of file.
    ///
    /// Used after the child has exited so late output is not missed.
    pub async fn drain(&mut self, timeout: Duration) {
        let readers = std::mem::take(&mut self.readers);
        let all = join_readers(readers);
        if tokio::time::timeout(timeout, all).await.is_err() {
            debug!("Output readers still busy after {:?}", timeout);
        }
    }
}

impl Drop for OutputCapture {
    fn drop(&mut self) {
        for reader in &self.readers {
            reader.abort();
        }
    }
}

async fn join_readers(readers: Vec<JoinHandle<()>>) {
    for reader in readers {
        let _ = reader.await;
    }
}

fn spawn_reader<R>(stream: Option<R>, buffer: LineBuffer, name: &'static str) -> JoinHandle<()>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let Some(stream) = stream else {
            return;
        };
        let mut reader = BufReader::new(stream);
        let mut bytes = Vec::new();
        loop {
            bytes.clear();
            match reader.read_until(b'\n', &mut bytes).await {
                Ok(0) => break,
                Ok(_) => {
                    // Child output is not guaranteed to be UTF-8.
                    let line = String::from_utf8_lossy(&bytes)
                        .trim_end_matches(['\n', '\r'])
                        .to_string();
                    debug!(target: "smol::app", stream = name, "{}", line);
                    let mut buffer = buffer.write();
                    buffer.push_back(line);
                    if buffer.len() > MAX_CAPTURED_LINES {
                        buffer.pop_front();
                    }
                }
                Err(e) => {
                    debug!("Stopped reading {}: {}", name, e);
                    break;
                }
            }
        }
    })
}

fn join_lines(buffer: &LineBuffer) -> String {
    buffer.read().iter().cloned().collect::<Vec<_>>().join("\n")
}
