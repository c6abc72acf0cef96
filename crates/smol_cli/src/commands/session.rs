//! Session command - Interactive loop over the whole pipeline.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{debug, info};

use smol_core::{Agent, SmolConfig};

use super::Output;

const HELP: &str = "\
Commands:
  generate <prompt>   Generate an application with the current provider
  provider <name>     Switch provider (openai | gpt-4o | gemini)
  repair              Fix syntax errors in the current code
  save [path]         Save the current code (default: generated_app.py)
  launch              Launch the current code on the configured port
  status              Show the state of the launched application
  stop                Stop the launched application
  show                Print the current code
  history             List generations in this session
  help                Show this help
  quit                Stop the application and leave";

#[derive(Args)]
pub struct SessionArgs {
    /// Provider to start with (overrides configuration)
    #[arg(long)]
    pub provider: Option<String>,
}

/// A parsed session line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    Generate(String),
    Provider(String),
    Repair,
    Save(Option<PathBuf>),
    Launch,
    Status,
    Stop,
    Show,
    History,
    Help,
    Quit,
}

impl SessionCommand {
    /// Parse one input line. Blank lines yield `None`.
    pub fn parse(line: &str) -> Option<Result<Self, String>> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        let command = match (word.to_lowercase().as_str(), rest) {
            ("generate" | "gen", "") => Err("Usage: generate <prompt>".to_string()),
            ("generate" | "gen", prompt) => Ok(Self::Generate(prompt.to_string())),
            ("provider" | "model", "") => Err("Usage: provider <openai|gemini>".to_string()),
            ("provider" | "model", name) => Ok(Self::Provider(name.to_string())),
            ("repair" | "fix", _) => Ok(Self::Repair),
            ("save", "") => Ok(Self::Save(None)),
            ("save", path) => Ok(Self::Save(Some(PathBuf::from(path)))),
            ("launch" | "run", _) => Ok(Self::Launch),
            ("status", _) => Ok(Self::Status),
            ("stop", _) => Ok(Self::Stop),
            ("show" | "code", _) => Ok(Self::Show),
            ("history", _) => Ok(Self::History),
            ("help" | "?", _) => Ok(Self::Help),
            ("quit" | "exit" | "q", _) => Ok(Self::Quit),
            (other, _) => Err(format!("Unknown command: {}. Type `help` for a list.", other)),
        };
        Some(command)
    }
}

pub async fn execute(args: SessionArgs, config: SmolConfig, output: Output) -> Result<()> {
    let mut agent = Agent::from_config(&config)?;
    if let Some(name) = &args.provider {
        println!("{}", agent.switch_provider(name));
    }

    info!("Session started with {}", agent.provider());
    output.step(format!(
        "🏭 smolforge session ({}). Apps run at http://localhost:{}. Type `help` for commands.",
        agent.provider(),
        config.port
    ));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    loop {
        stdout.write_all(b"smol> ").await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let command = match SessionCommand::parse(&line) {
            None => continue,
            Some(Ok(command)) => command,
            Some(Err(message)) => {
                println!("{}", message);
                continue;
            }
        };
        debug!("Session command: {:?}", command);

        if command == SessionCommand::Quit {
            break;
        }
        let reply = handle(&mut agent, command, output).await;
        println!("{}", reply);
    }

    if agent.status_report().await.is_running() {
        output.step("🛑 Stopping application...");
        println!("{}", agent.stop().await);
    }
    Ok(())
}

async fn handle(agent: &mut Agent, command: SessionCommand, output: Output) -> String {
    match command {
        SessionCommand::Generate(prompt) => {
            output.step(format!("🧠 Generating with {}...", agent.provider()));
            let reply = agent.generate(&prompt, None).await;
            match agent.current_code() {
                Some(code) if code == reply => {
                    format!("{}\n\n{}", reply, agent.validate(&reply))
                }
                _ => reply,
            }
        }
        SessionCommand::Provider(name) => agent.switch_provider(&name),
        SessionCommand::Repair => match current(agent) {
            Ok(code) => {
                output.step("🔧 Repairing...");
                agent.repair(&code).await
            }
            Err(message) => message,
        },
        SessionCommand::Save(path) => match current(agent) {
            Ok(code) => agent.save(&code, path.as_deref()).await,
            Err(message) => message,
        },
        SessionCommand::Launch => match current(agent) {
            Ok(code) => {
                output.step("🚀 Launching...");
                agent.launch(&code).await
            }
            Err(message) => message,
        },
        SessionCommand::Status => agent.status().await,
        SessionCommand::Stop => agent.stop().await,
        SessionCommand::Show => current(agent).unwrap_or_else(|message| message),
        SessionCommand::History => {
            if agent.history().is_empty() {
                "No generations yet.".to_string()
            } else {
                agent
                    .history()
                    .iter()
                    .enumerate()
                    .map(|(i, record)| format!("{:>3}. {}", i + 1, record.summary()))
                    .collect::<Vec<_>>()
                    .join("\n")
            }
        }
        SessionCommand::Help => HELP.to_string(),
        SessionCommand::Quit => String::new(),
    }
}

fn current(agent: &Agent) -> Result<String, String> {
    agent
        .current_code()
        .map(str::to_string)
        .ok_or_else(|| "No code yet. Use `generate <prompt>` first.".to_string())
}
