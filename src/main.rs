mod repl;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use travel_core::config::AppConfig;
use travel_core::controller::{ChatController, Field, SubmitOutcome};
use travel_core::dispatcher::{Dispatcher, HttpDispatcher};

#[derive(Parser)]
#[command(
    name = "travel-chat",
    about = "Terminal chat client for the travel assistant API",
    version,
    author
)]
struct Cli {
    /// Path to config file (default: ~/.config/travel-chat/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Override the backend base URL
    #[arg(long, global = true)]
    api_base: Option<String>,

    /// Disable ANSI colors
    #[arg(long, global = true)]
    no_color: bool,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start interactive chat (default)
    Chat {
        /// City to scope questions to
        #[arg(long)]
        city: Option<String>,
    },

    /// Ask a single question and print the answer
    Ask {
        /// The question
        question: String,
        /// City to scope the question to
        #[arg(long)]
        city: Option<String>,
    },

    /// Check that the backend is reachable
    Health,

    /// List the tools the backend exposes
    Tools,

    /// Show or manage configuration
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current configuration
    Show,
    /// Initialize default configuration file
    Init,
    /// Print config file path
    Path,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so they don't interleave with the conversation.
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "travel_chat=info,travel_core=info,warn".into()),
        )
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    // Load config.
    let mut config = match &cli.config {
        Some(path) => AppConfig::load_from(path)?,
        None => AppConfig::load()?,
    };

    // Apply CLI overrides.
    if let Some(api_base) = &cli.api_base {
        config.backend.api_base = api_base.clone();
        config.backend.validate()?;
    }
    if cli.no_color {
        config.ui.color = false;
    }

    tracing::debug!("Backend: {}", config.backend.base());

    match cli.command {
        Some(Commands::Ask { question, city }) => {
            ask_once(&config, &question, city.as_deref()).await?;
        }
        Some(Commands::Health) => {
            let dispatcher = HttpDispatcher::new(config.backend.clone())?;
            match dispatcher.probe().await {
                Ok(()) => println!("Backend at {} is healthy", dispatcher.base_url()),
                Err(e) => bail!("Backend at {} is not reachable: {}", dispatcher.base_url(), e),
            }
        }
        Some(Commands::Tools) => {
            let dispatcher = HttpDispatcher::new(config.backend.clone())?;
            let tools = dispatcher.list_tools().await?;
            for tool in tools {
                println!("{}: {}", tool.name, tool.description);
                if !tool.parameters.is_empty() {
                    println!("    parameters: {}", tool.parameters.join(", "));
                }
            }
        }
        Some(Commands::Config { action }) => {
            handle_config_command(action, &config)?;
        }
        Some(Commands::Chat { city }) => {
            repl::run(config, city).await?;
        }
        None => {
            repl::run(config, None).await?;
        }
    }

    Ok(())
}

/// One request, one answer, no health banner.
async fn ask_once(config: &AppConfig, question: &str, city: Option<&str>) -> Result<()> {
    let dispatcher = HttpDispatcher::new(config.backend.clone())?;
    let view = repl::TerminalView::new(config.ui.color, false);
    let mut controller = ChatController::new(dispatcher, view, config.ui.health_banner_delay());

    controller.set_field(Field::Question, question);
    if let Some(city) = city {
        controller.set_field(Field::City, city);
    }

    match controller.submit().await {
        SubmitOutcome::Answered(_) | SubmitOutcome::Declined => Ok(()),
        SubmitOutcome::Invalid => bail!("The question must not be empty"),
        SubmitOutcome::TransportFailed => bail!("Request to {} failed", config.backend.base()),
        SubmitOutcome::Busy => bail!("A request is already in flight"),
    }
}

fn handle_config_command(action: Option<ConfigAction>, config: &AppConfig) -> Result<()> {
    match action {
        Some(ConfigAction::Show) | None => {
            let toml_str = toml::to_string_pretty(config)?;
            println!("{}", toml_str);
        }
        Some(ConfigAction::Init) => {
            let path = AppConfig::default_path();
            if path.exists() {
                println!("Config already exists at: {}", path.display());
            } else {
                config.save()?;
                println!("Created default config at: {}", path.display());
            }
        }
        Some(ConfigAction::Path) => {
            println!("{}", AppConfig::default_path().display());
        }
    }
    Ok(())
}
