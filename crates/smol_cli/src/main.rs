//! smolforge CLI - Main entry point.
//!
//! Exit codes:
//! - 0: Success
//! - 1: General error
//! - 2: Invalid arguments
//! - 3: Syntax validation failure
//! - 4: Model provider error
//! - 5: Launch failure

use std::process::ExitCode;

use clap::Parser;
use smol_core::CoreError;
use smol_llm::LlmError;
use smol_runner::SupervisorError;
use smol_syntax::SyntaxCheckError;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;

use commands::{load_config, Cli, Commands, Output};

/// CI-friendly exit codes
pub struct ExitCodes;

impl ExitCodes {
    pub const SUCCESS: u8 = 0;
    pub const GENERAL_ERROR: u8 = 1;
    pub const INVALID_ARGS: u8 = 2;
    pub const VALIDATION_FAILURE: u8 = 3;
    pub const PROVIDER_ERROR: u8 = 4;
    pub const LAUNCH_FAILURE: u8 = 5;
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let directives = if cli.verbose {
        "smol=debug,info"
    } else if cli.quiet {
        "smol=warn,error"
    } else {
        "smol=info,warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directives));

    // Logs go to stderr so generated code on stdout stays pipeable
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .try_init();

    let result = dispatch(cli).await;

    match result {
        Ok(()) => ExitCode::from(ExitCodes::SUCCESS),
        Err(e) => {
            let exit_code = categorize_error(&e);
            eprintln!("❌ {:#}", e);
            ExitCode::from(exit_code)
        }
    }
}

async fn dispatch(cli: Cli) -> anyhow::Result<()> {
    let output = Output::new(cli.quiet);
    let config = cli.config.as_deref();

    match cli.command {
        Commands::Check(args) => commands::check::execute(args, output).await,
        Commands::Generate(args) => {
            commands::generate::execute(args, load_config(config)?, output).await
        }
        Commands::Repair(args) => commands::repair::execute(args, load_config(config)?, output).await,
        Commands::Run(args) => commands::run::execute(args, load_config(config)?, output).await,
        Commands::Session(args) => {
            commands::session::execute(args, load_config(config)?, output).await
        }
    }
}

/// Categorize error to determine exit code
///
/// Typed errors anywhere in the chain decide first; plain messages from
/// `bail!` fall back to keyword matching.
fn categorize_error(e: &anyhow::Error) -> u8 {
    if let Some(code) = e.chain().find_map(typed_exit_code) {
        return code;
    }

    let msg = e.to_string().to_lowercase();

    if msg.contains("syntax") {
        ExitCodes::VALIDATION_FAILURE
    } else if msg.contains("api key") || msg.contains("api request") || msg.contains("provider") {
        ExitCodes::PROVIDER_ERROR
    } else if msg.contains("launch")
        || msg.contains("failed to start")
        || msg.contains("exited")
        || msg.contains("has stopped")
    {
        ExitCodes::LAUNCH_FAILURE
    } else if msg.contains("configuration") || msg.contains("not found") || msg.contains("argument") {
        ExitCodes::INVALID_ARGS
    } else {
        ExitCodes::GENERAL_ERROR
    }
}

fn typed_exit_code(cause: &(dyn std::error::Error + 'static)) -> Option<u8> {
    if let Some(e) = cause.downcast_ref::<CoreError>() {
        return Some(match e {
            CoreError::Config(_) | CoreError::TomlParse(_) => ExitCodes::INVALID_ARGS,
            CoreError::Llm(e) => llm_exit_code(e),
            CoreError::Supervisor(e) => supervisor_exit_code(e),
            CoreError::Io(_) => ExitCodes::GENERAL_ERROR,
        });
    }
    if let Some(e) = cause.downcast_ref::<SupervisorError>() {
        return Some(supervisor_exit_code(e));
    }
    if let Some(e) = cause.downcast_ref::<LlmError>() {
        return Some(llm_exit_code(e));
    }
    cause.downcast_ref::<SyntaxCheckError>().map(|e| match e {
        SyntaxCheckError::Io(_) => ExitCodes::INVALID_ARGS,
        SyntaxCheckError::ParserInit(_) => ExitCodes::GENERAL_ERROR,
    })
}

fn supervisor_exit_code(e: &SupervisorError) -> u8 {
    match e {
        SupervisorError::SyntaxInvalid(_) => ExitCodes::VALIDATION_FAILURE,
        SupervisorError::LaunchFailed(_)
        | SupervisorError::ProcessExitedEarly(_)
        | SupervisorError::Io(_) => ExitCodes::LAUNCH_FAILURE,
    }
}

fn llm_exit_code(e: &LlmError) -> u8 {
    match e {
        LlmError::CredentialMissing { .. }
        | LlmError::UnsupportedProvider(_)
        | LlmError::ProviderError { .. } => ExitCodes::PROVIDER_ERROR,
        LlmError::RepairFailed(_) => ExitCodes::GENERAL_ERROR,
    }
}
