//! Interactive mode for a bare `polycap` invocation on a TTY.
//!
//! A menu-driven front end over the same pipeline the `describe` and
//! `status` commands use.

pub mod describe;
pub mod theme;

use console::Style;
use dialoguer::{Input, Select};
use polycap_core::{Config, Polycap};

/// Map a dialoguer result to `Ok(None)` on Ctrl+C, `Ok(Some(v))` on success.
fn handle_interrupt<T>(result: dialoguer::Result<T>) -> anyhow::Result<Option<T>> {
    match result {
        Ok(v) => Ok(Some(v)),
        Err(dialoguer::Error::IO(e)) if e.kind() == std::io::ErrorKind::Interrupted => Ok(None),
        Err(e) => Err(e.into()),
    }
}

const MENU_ITEMS: &[&str] = &[
    "Describe an image",
    "Check server status",
    "Show configuration",
    "Change server URL",
    "Exit",
];

/// Entry point for interactive mode.
///
/// The server URL edited here applies for the rest of the session only.
pub async fn run(config: &Config) -> anyhow::Result<()> {
    theme::print_banner();

    let theme = theme::polycap_theme();
    let mut config = config.clone();

    loop {
        let selection = Select::with_theme(&theme)
            .with_prompt("What would you like to do?")
            .items(MENU_ITEMS)
            .default(0)
            .interact_opt()?;

        match selection {
            Some(0) => describe::guided_describe(&config).await?,
            Some(1) => show_status(&config).await,
            Some(2) => show_config(&config),
            Some(3) => change_endpoint(&mut config)?,
            Some(4) | None => break,
            _ => unreachable!(),
        }
    }

    Ok(())
}

async fn show_status(config: &Config) {
    let spinner = crate::cli::describe::create_spinner();
    spinner.set_message(format!("Contacting {}...", config.endpoint()));
    let status = Polycap::new(config.clone()).check_health().await;
    spinner.finish_and_clear();

    eprintln!();
    eprintln!("{}", crate::cli::status::render(&status));
    eprintln!();
}

fn change_endpoint(config: &mut Config) -> anyhow::Result<()> {
    let theme = theme::polycap_theme();
    let Some(raw) = handle_interrupt(
        Input::<String>::with_theme(&theme)
            .with_prompt("Server URL")
            .default(config.endpoint().to_string())
            .interact_text(),
    )?
    else {
        return Ok(());
    };

    match set_endpoint(config, &raw) {
        Ok(()) => {
            let ok = Style::new().for_stderr().green();
            eprintln!("  {} Using {}", ok.apply_to("✓"), config.endpoint());
        }
        Err(e) => {
            let warn = Style::new().for_stderr().yellow();
            eprintln!("  {}", warn.apply_to(e.to_string()));
        }
    }
    Ok(())
}

/// Replace the session endpoint; an invalid URL leaves it unchanged.
fn set_endpoint(config: &mut Config, raw: &str) -> polycap_core::Result<()> {
    *config = config.clone().with_endpoint(Some(raw))?;
    Ok(())
}

fn show_config(config: &Config) {
    let dim = Style::new().for_stderr().dim();
    let cyan = Style::new().for_stderr().cyan();
    let label = Style::new().for_stderr().bold();

    let config_path = Config::default_path();
    let path_note = if config_path.exists() {
        "(exists)"
    } else {
        "(using defaults)"
    };

    eprintln!();
    eprintln!("  {}", cyan.apply_to("Current configuration:"));
    eprintln!();
    eprintln!(
        "    {:<20} {} {}",
        label.apply_to("Config file:"),
        config_path.display(),
        dim.apply_to(path_note)
    );
    eprintln!("    {:<20} {}", label.apply_to("Server:"), config.endpoint());
    eprintln!(
        "    {:<20} {}",
        label.apply_to("Vision models:"),
        config
            .models
            .vision
            .iter()
            .map(|m| m.id.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );
    eprintln!(
        "    {:<20} {}",
        label.apply_to("Translator:"),
        config.models.translator
    );
    eprintln!(
        "    {:<20} {}",
        label.apply_to("Languages:"),
        config.languages.supported.join(", ")
    );
    eprintln!(
        "    {:<20} caption {}s, translation {}s",
        label.apply_to("Timeouts:"),
        config.limits.caption_timeout_ms / 1000,
        config.limits.translation_timeout_ms / 1000
    );
    eprintln!();
}
