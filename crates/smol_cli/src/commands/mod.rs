//! CLI command definitions.
//!
//! Each subcommand drives one slice of the generate, repair and launch
//! pipeline. `session` keeps a single agent alive across many commands.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use smol_core::SmolConfig;

pub mod check;
pub mod generate;
pub mod repair;
pub mod run;
pub mod session;

/// smolforge - prompt to running web app
#[derive(Parser)]
#[command(name = "smol")]
#[command(version, about = "smolforge - generate, repair and launch small web apps from a prompt")]
#[command(long_about = r#"
smolforge turns a natural-language prompt into a small Python web
application, checks that it parses, optionally asks a model to fix it,
and runs it on a fixed local port.

WORKFLOWS:
  generate  → Generate application source from a prompt
  repair    → Fix syntax errors in a file with one model call
  check     → Validate that a file parses
  run       → Launch a file and follow it until Ctrl-C
  session   → Interactive loop over the whole pipeline

CONFIGURATION:
  smol.toml in the working directory, or --config FILE.
  SMOL_PORT, SMOL_INTERPRETER and SMOL_PROVIDER override the file.
  OPENAI_API_KEY, GEMINI_API_KEY / GOOGLE_API_KEY hold credentials.

EXIT CODES:
  0 - Success
  1 - General error
  2 - Invalid arguments
  3 - Syntax validation failure
  4 - Model provider error
  5 - Launch failure
"#)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Configuration file (defaults to ./smol.toml when present)
    #[arg(short, long, global = true, env = "SMOL_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate application source from a prompt
    Generate(generate::GenerateArgs),

    /// Fix syntax errors in a source file
    Repair(repair::RepairArgs),

    /// Check that a source file parses
    Check(check::CheckArgs),

    /// Launch a source file on the configured port
    Run(run::RunArgs),

    /// Start an interactive session
    Session(session::SessionArgs),
}

/// Load configuration for commands that talk to providers or processes.
pub fn load_config(path: Option<&Path>) -> Result<SmolConfig> {
    SmolConfig::load(path).context("Failed to load configuration")
}

/// Progress printing that honours `--quiet`.
///
/// Results always go to stdout; only decoration is suppressed.
#[derive(Debug, Clone, Copy)]
pub struct Output {
    quiet: bool,
}

impl Output {
    pub fn new(quiet: bool) -> Self {
        Self { quiet }
    }

    pub fn step(&self, message: impl std::fmt::Display) {
        if !self.quiet {
            eprintln!("{}", message);
        }
    }
}
