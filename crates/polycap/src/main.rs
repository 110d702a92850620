//! Polycap CLI - describe images in any language with local vision models.
//!
//! Polycap asks a vision model on an Ollama server for an English description
//! of an image, then translates it into the requested language.
//!
//! # Usage
//!
//! ```bash
//! # Describe an image in French
//! polycap describe cat.jpg --language French
//!
//! # Check the server and installed models
//! polycap status
//!
//! # View configuration
//! polycap config show
//! ```

use clap::{Parser, Subcommand};
use polycap_core::Config;
use std::io::IsTerminal;

mod cli;
mod logging;

/// Polycap - describe images in any language with local vision models.
#[derive(Parser, Debug)]
#[command(name = "polycap")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Describe an image, translated into the target language
    Describe(cli::describe::DescribeArgs),

    /// Check the inference server and required models
    Status(cli::status::StatusArgs),

    /// List selectable vision models and the translator
    Models,

    /// List supported target languages
    Languages,

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logging isn't initialized yet, so use eprintln for config warnings.
    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Warning: Failed to load config: {e}\n  \
                 Using default configuration. Check your config file with `polycap config path`."
            );
            Config::default()
        }
    };
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    // --endpoint flags still win; they are applied per command.
    let config = apply_env_endpoint(config, std::env::var("OLLAMA_HOST").ok().as_deref());

    tracing::debug!("Polycap v{}", polycap_core::VERSION);

    match cli.command {
        Some(Commands::Describe(args)) => cli::describe::execute(args, config).await,
        Some(Commands::Status(args)) => cli::status::execute(args, config).await,
        Some(Commands::Models) => cli::catalog::list_models(&config),
        Some(Commands::Languages) => cli::catalog::list_languages(&config),
        Some(Commands::Config(args)) => cli::config::execute(args).await,
        None if std::io::stdin().is_terminal() && std::io::stderr().is_terminal() => {
            cli::interactive::run(&config).await
        }
        None => {
            use clap::CommandFactory;
            Cli::command().print_help()?;
            Ok(())
        }
    }
}

/// Override the configured endpoint with `OLLAMA_HOST`, when set and valid.
fn apply_env_endpoint(config: Config, value: Option<&str>) -> Config {
    let Some(value) = value.filter(|v| !v.trim().is_empty()) else {
        return config;
    };
    match config.clone().with_endpoint(Some(value)) {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!("Ignoring OLLAMA_HOST={value}: {e}");
            config
        }
    }
}
