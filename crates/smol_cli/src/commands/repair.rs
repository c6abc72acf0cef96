//! Repair command - Ask a model to fix syntax errors in a file.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

use smol_core::{Agent, SmolConfig};
use smol_llm::{RepairOutcome, NO_REPAIR_NEEDED};

use super::Output;

#[derive(Args)]
pub struct RepairArgs {
    /// Source file to repair
    #[arg(short, long)]
    pub file: PathBuf,

    /// Overwrite the file with the repaired code instead of printing it
    #[arg(long)]
    pub in_place: bool,
}

pub async fn execute(args: RepairArgs, config: SmolConfig, output: Output) -> Result<()> {
    let code = tokio::fs::read_to_string(&args.file)
        .await
        .with_context(|| format!("Cannot read {}", args.file.display()))?;

    let mut agent = Agent::from_config(&config)?;
    info!(
        "Repairing {} with {}",
        args.file.display(),
        config.repair_provider
    );
    output.step(format!("🔧 Checking {}...", args.file.display()));

    match agent.try_repair(&code).await? {
        RepairOutcome::AlreadyValid => {
            println!("{}", NO_REPAIR_NEEDED);
        }
        RepairOutcome::Repaired(fixed) if args.in_place => {
            agent
                .save_to(&fixed, Some(args.file.as_path()))
                .await
                .with_context(|| format!("Error saving code to {}", args.file.display()))?;
            output.step(format!("✅ Repaired {}", args.file.display()));
        }
        RepairOutcome::Repaired(fixed) => {
            output.step("✅ Repaired code:");
            println!("{}", fixed);
        }
    }
    Ok(())
}
