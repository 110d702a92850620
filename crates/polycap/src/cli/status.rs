//! The `polycap status` command: server reachability and model inventory.

use clap::Args;
use console::Style;
use polycap_core::{Config, HealthStatus, HealthTier, Polycap};

/// Arguments for the `status` command.
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Inference server URL (overrides the config file)
    #[arg(long, env = "OLLAMA_HOST")]
    pub endpoint: Option<String>,

    /// Print the status as JSON
    #[arg(long)]
    pub json: bool,
}

/// Execute the status command.
///
/// Exits non-zero when the server is unusable; missing models only warn.
pub async fn execute(args: StatusArgs, config: Config) -> anyhow::Result<()> {
    let config = config.with_endpoint(args.endpoint.as_deref())?;
    let endpoint = config.endpoint().to_string();
    let status = Polycap::new(config).check_health().await;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&status)?);
    } else {
        eprintln!("  Ollama server: {endpoint}");
        eprintln!("  {}", render(&status));
    }

    if status.is_error() {
        anyhow::bail!("Inference server unavailable at {endpoint}: {}", status.message);
    }
    Ok(())
}

/// Colored one-line summary of a health status.
pub fn render(status: &HealthStatus) -> String {
    match &status.tier {
        HealthTier::Available => {
            let green = Style::new().for_stderr().green();
            format!("{} {}", green.apply_to("✓"), status.message)
        }
        HealthTier::Warning { .. } => {
            let yellow = Style::new().for_stderr().yellow();
            format!("{} {}", yellow.apply_to("⚠"), status.message)
        }
        HealthTier::Error { .. } => {
            let red = Style::new().for_stderr().red();
            format!("{} {}", red.apply_to("✗"), status.message)
        }
    }
}
