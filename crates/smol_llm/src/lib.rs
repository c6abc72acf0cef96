//! # smol_llm
//!
//! Model-provider plumbing for smolforge.
//!
//! - **Providers**: OpenAI chat completions and Google Gemini, behind the
//!   [`CodeProvider`] trait
//! - **Router**: dispatches a [`ProviderKind`] to its backend after resolving
//!   the provider's credential
//! - **Generator**: turns a user prompt into application source
//! - **Repairer**: asks a fixed provider to fix syntax errors, then re-validates
//! - **Mock Provider**: records calls and replays canned replies for tests
//!
//! ```text
//! prompt ──▶ CodeGenerator ──┐
//!                            ├──▶ ProviderRouter ──▶ OpenAI / Gemini
//! faulty ──▶ CodeRepairer ───┘          │
//!                                       └── CredentialSource (env)
//! ```

pub mod error;
pub mod gemini;
pub mod generator;
pub mod mock;
pub mod openai;
pub mod prompts;
pub mod provider;
pub mod repairer;
pub mod router;

pub use error::{LlmError, LlmResult};
pub use gemini::GeminiProvider;
pub use generator::CodeGenerator;
pub use mock::{CapturedRequest, MockProvider, MockReply};
pub use openai::OpenAiProvider;
pub use prompts::{PromptTemplates, GENERATION_TEMPERATURE, REPAIR_TEMPERATURE};
pub use provider::{CodeProvider, CompletionRequest, ProviderConfig, ProviderKind};
pub use repairer::{CodeRepairer, RepairOutcome, NO_REPAIR_NEEDED};
pub use router::{CredentialSource, EnvCredentials, ProviderRouter, StaticCredentials};
