//! The `polycap config` command for configuration management.

use clap::{Args, Subcommand};
use polycap_core::Config;
use std::path::{Path, PathBuf};

/// Arguments for the `config` command.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Subcommands for configuration management.
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Display current configuration
    Show {
        /// Show built-in defaults instead of the loaded file
        #[arg(long)]
        defaults: bool,
    },

    /// Show config file path
    Path,

    /// Initialize a new config file with defaults
    Init {
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,

        /// Inference server URL to write into the new file
        #[arg(long)]
        endpoint: Option<String>,
    },

    /// Parse and validate a config file without using it
    Check {
        /// File to check (defaults to the standard location)
        path: Option<PathBuf>,
    },
}

/// Execute the config command.
pub async fn execute(args: ConfigArgs) -> anyhow::Result<()> {
    match args.command {
        ConfigCommand::Show { defaults } => {
            let config = if defaults {
                Config::default()
            } else {
                Config::load()?
            };
            println!("{}", config.to_toml()?);
        }

        ConfigCommand::Path => {
            println!("{}", Config::default_path().display());
        }

        ConfigCommand::Init { force, endpoint } => {
            let path = Config::default_path();
            write_initial_config(&path, force, endpoint.as_deref())?;
            tracing::info!("Config file created at: {}", path.display());
            println!("Configuration initialized at: {}", path.display());
        }

        ConfigCommand::Check { path } => {
            let path = path.unwrap_or_else(Config::default_path);
            let config = Config::load_from(&path)?;
            println!(
                "{} is valid ({} vision model(s), translator {}, endpoint {})",
                path.display(),
                config.models.vision.len(),
                config.models.translator,
                config.endpoint()
            );
        }
    }

    Ok(())
}

/// Write a default config to `path`, refusing to clobber unless `force`.
fn write_initial_config(path: &Path, force: bool, endpoint: Option<&str>) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "Config file already exists at: {}\nUse --force to overwrite.",
            path.display()
        );
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let config = Config::default().with_endpoint(endpoint)?;
    std::fs::write(path, config.to_toml()?)?;
    Ok(())
}
