mod application;
mod config;
mod domain;
mod infrastructure;

use std::error::Error;
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use serde_json::json;
use tracing::{debug, info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use application::agent::{Agent, ChatOptions};
use application::stdio;
use application::tooling::ToolRegistry;
use config::AppConfig;
use infrastructure::model::{DeepSeekClient, ModelError};

#[derive(Parser, Debug)]
#[command(
    name = "sysact-agent",
    version,
    about = "Action-protocol agent for DeepSeek-style reasoner models"
)]
struct Cli {
    #[arg(long)]
    config: Option<String>,
    #[arg(long)]
    system: Option<String>,
    #[arg(long)]
    conversation: Option<String>,
    #[arg(long)]
    prompt_file: Option<String>,
    #[arg(long, value_enum, default_value_t = RunMode::Cli)]
    mode: RunMode,
    prompt: Vec<String>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum RunMode {
    Cli,
    Stdio,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenvy::dotenv().ok();
    init_tracing();
    info!("Starting sysact-agent");
    let cli = Cli::parse();
    debug!(mode = ?cli.mode, config = ?cli.config, "CLI arguments parsed");

    let config_path = cli.config.as_deref().map(expand_path);
    let app_config = AppConfig::load(config_path.as_deref())?;
    if let Some(path) = &config_path {
        info!(path = %path.display(), "Loaded configuration from file");
    }

    let api_key = std::env::var(&app_config.api_key_env)
        .map_err(|_| ModelError::MissingApiKey(app_config.api_key_env.clone()))?;
    let provider = DeepSeekClient::new(
        app_config.base_url.clone(),
        api_key,
        Duration::from_secs(app_config.request_timeout_secs),
    )?;

    let registry = ToolRegistry::with_builtins()?;
    let mut agent_config = app_config.agent.clone();
    if let Some(system) = cli.system.clone() {
        agent_config.system_prompt = Some(system);
    }
    let agent = Arc::new(Agent::new(provider, registry, agent_config));

    info!(mode = ?cli.mode, "Running agent in selected mode");
    match cli.mode {
        RunMode::Cli => {
            let prompt = load_prompt(&cli)?;
            info!("Dispatching single prompt via CLI mode");
            let outcome = agent
                .chat(
                    prompt,
                    ChatOptions {
                        conversation_id: cli.conversation.clone(),
                        ..ChatOptions::default()
                    },
                )
                .await?;

            let output = json!({
                "conversation_id": outcome.conversation_id,
                "content": outcome.content,
                "actions": outcome.actions,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        RunMode::Stdio => {
            info!("Entering STDIO mode; awaiting JSON line input");
            stdio::run(agent.clone()).await?;
        }
    }
    info!("Agent execution finished");
    Ok(())
}

fn init_tracing() {
    static INIT: std::sync::Once = std::sync::Once::new();
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_level(true)
            .init();
    });
}

fn expand_path(raw: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(raw).into_owned())
}

fn load_prompt(cli: &Cli) -> Result<String, Box<dyn Error>> {
    if let Some(path) = &cli.prompt_file {
        let path = expand_path(path);
        info!(path = %path.display(), "Loading prompt from file");
        let content = fs::read_to_string(path)?;
        return Ok(content.trim().to_string());
    }

    if !cli.prompt.is_empty() {
        info!("Using prompt provided through CLI arguments");
        return Ok(cli.prompt.join(" ").trim().to_string());
    }

    if atty::isnt(atty::Stream::Stdin) {
        info!("Reading prompt from standard input");
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        return Ok(buffer.trim().to_string());
    }

    warn!("Prompt not provided via arguments, file, or stdin");
    Err("prompt required via arguments, file, or stdin".into())
}
