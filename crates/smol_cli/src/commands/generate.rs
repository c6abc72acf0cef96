//! Generate command - Turn a prompt into application source.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

use smol_core::{Agent, SmolConfig};
use smol_syntax::SyntaxValidator;

use super::Output;

#[derive(Args)]
pub struct GenerateArgs {
    /// What the application should do
    #[arg(short, long)]
    pub prompt: String,

    /// Model provider: openai (gpt-4o) or gemini
    #[arg(long, env = "SMOL_PROVIDER")]
    pub provider: Option<String>,

    /// Save the generated code to this file instead of printing it
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

pub async fn execute(args: GenerateArgs, config: SmolConfig, output: Output) -> Result<()> {
    let mut agent = Agent::from_config(&config)?;
    let provider = args.provider.as_deref();
    info!("Generating application for prompt: {}", args.prompt);

    output.step(format!(
        "🧠 Generating with {}...",
        provider.unwrap_or(agent.provider().name())
    ));
    let message = agent.generate(&args.prompt, provider).await;
    let Some(code) = agent.current_code().map(str::to_string) else {
        anyhow::bail!("{}", message);
    };

    match &args.output {
        Some(path) => {
            let saved = agent
                .save_to(&code, Some(path.as_path()))
                .await
                .with_context(|| format!("Error saving code to {}", path.display()))?;
            println!("💾 Code saved to {}", saved.display());
        }
        None => println!("{}", code),
    }

    let check = SyntaxValidator::validate(&code);
    if check.valid {
        output.step(format!("✅ {}", check.message));
    } else {
        output.step(format!("⚠️  {}", check.message));
        output.step("   Run `smol repair --file <FILE>` to ask for a fix.");
    }
    Ok(())
}
