//! Run command - Launch a source file and follow it.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use tracing::{debug, info};

use smol_core::{Agent, SmolConfig};
use smol_runner::StatusReport;

use super::Output;

#[derive(Args)]
pub struct RunArgs {
    /// Source file to launch
    #[arg(short, long)]
    pub file: PathBuf,

    /// Port to pin the application to (overrides configuration)
    #[arg(long)]
    pub port: Option<u16>,

    /// Seconds between liveness checks while following
    #[arg(long, default_value = "2")]
    pub poll_secs: u64,
}

pub async fn execute(args: RunArgs, mut config: SmolConfig, output: Output) -> Result<()> {
    let code = tokio::fs::read_to_string(&args.file)
        .await
        .with_context(|| format!("Cannot read {}", args.file.display()))?;
    if let Some(port) = args.port {
        config.port = port;
    }

    let mut agent = Agent::from_config(&config)?;
    output.step(format!("🚀 Launching {}...", args.file.display()));

    if let StatusReport::Running { pid, address } = agent.try_launch(&code).await? {
        info!("Following pid {}", pid);
        println!(
            "Application launched successfully! View it at {} in your browser.",
            address
        );
    }
    output.step("   Press Ctrl-C to stop.");

    let mut ticker = tokio::time::interval(Duration::from_secs(args.poll_secs.max(1)));
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                output.step("\n🛑 Stopping application...");
                println!("{}", agent.stop().await);
                return Ok(());
            }
            _ = ticker.tick() => {
                let report = agent.status_report().await;
                debug!("Status: {:?}", report);
                if !report.is_running() {
                    anyhow::bail!("{}", report);
                }
            }
        }
    }
}
