//! Check command - Validate that a source file parses.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

use smol_syntax::SyntaxValidator;

use super::Output;

#[derive(Args)]
pub struct CheckArgs {
    /// Source file to validate
    #[arg(short, long)]
    pub file: PathBuf,

    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn execute(args: CheckArgs, output: Output) -> Result<()> {
    info!("Checking syntax of {}", args.file.display());

    let result = SyntaxValidator::validate_file(&args.file)
        .with_context(|| format!("Cannot read {}", args.file.display()))?;

    if args.json {
        let location = result.error.as_ref().map(|e| {
            serde_json::json!({ "line": e.line, "column": e.column, "snippet": e.snippet })
        });
        println!(
            "{}",
            serde_json::json!({
                "file": args.file.display().to_string(),
                "valid": result.valid,
                "message": result.message,
                "error": location,
            })
        );
    } else if result.valid {
        output.step(format!("✅ {}", args.file.display()));
        println!("{}", result.message);
    }

    if !result.valid {
        anyhow::bail!("{}: {}", args.file.display(), result.message);
    }
    Ok(())
}
