//! # smol_runner
//!
//! Process supervision for generated applications.
//!
//! This crate takes model-produced source text, normalizes its launch port,
//! writes it to a fixed artifact file and runs it as a child process. At most
//! one supervised process exists per [`ProcessSupervisor`]; launching a new
//! one first terminates and awaits the previous one.
//!
//! # Features
//!
//! - **Syntax Gate**: unparseable text is never written or run
//! - **Port Rewrite**: `app.launch()` calls are pinned to the designated port
//! - **Output Capture**: stdout/stderr are drained into buffers that can be
//!   read at any time without consuming them
//! - **Platform Termination**: cooperative terminate-then-wait on Unix,
//!   forced tree kill on Windows, behind the [`Terminator`] trait
//!
//! # Example
//!
//! ```rust,no_run
//! use smol_runner::{ProcessSupervisor, SupervisorConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut supervisor = ProcessSupervisor::new(SupervisorConfig::default().port(7861));
//!
//!     let report = supervisor.launch("import gradio as gr\n...\napp.launch()\n").await?;
//!     println!("{}", report);
//!
//!     println!("{}", supervisor.status().await);
//!     Ok(())
//! }
//! ```

pub mod capture;
pub mod config;
pub mod error;
pub mod rewrite;
pub mod supervisor;
pub mod terminate;

pub use capture::OutputCapture;
pub use config::SupervisorConfig;
pub use error::{SupervisorError, SupervisorResult, EARLY_EXIT_WITHOUT_OUTPUT};
pub use rewrite::{rewrite_launch_port, DEFAULT_LAUNCH_CALL};
pub use supervisor::{ProcessSupervisor, StatusReport};
pub use terminate::{platform_terminator, ForcefulTerminator, GracefulTerminator, Terminator};
