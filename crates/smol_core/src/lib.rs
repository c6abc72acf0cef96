//! # smol_core
//!
//! Pipeline coordinator for smolforge.
//!
//! The [`Agent`] ties the pipeline together:
//!
//! ```text
//! prompt ─▶ generate ─▶ (repair, on request) ─▶ save / launch ─▶ status
//! ```
//!
//! Every boundary operation returns human-readable text. Failures from the
//! generator, repairer or supervisor are rendered, never propagated, so a
//! presentation layer can show the result as-is.
//!
//! # Example
//!
//! ```rust,no_run
//! use smol_core::{Agent, SmolConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = SmolConfig::load(None)?;
//!     let mut agent = Agent::from_config(&config)?;
//!
//!     let code = agent.generate("a counter app with increment button", None).await;
//!     println!("{}", agent.launch(&code).await);
//!     println!("{}", agent.status().await);
//!     Ok(())
//! }
//! ```

pub mod agent;
pub mod artifact;
pub mod config;
pub mod error;

pub use agent::Agent;
pub use artifact::{GeneratedArtifact, GenerationOutcome, GenerationRecord, GenerationRequest};
pub use config::{ProviderSettings, SmolConfig, CONFIG_FILE_NAME};
pub use error::{CoreError, CoreResult};
