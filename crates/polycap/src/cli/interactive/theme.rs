//! Dialoguer theme and banner for interactive mode.

use console::{style, Style};
use dialoguer::theme::ColorfulTheme;

/// Returns a `ColorfulTheme` with Polycap's colors.
///
/// - Prompt prefix: cyan `?`
/// - Active item indicator: cyan `▸`
/// - Success prefix: green `✓`
/// - Error prefix: red `✗`
pub fn polycap_theme() -> ColorfulTheme {
    ColorfulTheme {
        prompt_prefix: style("?".to_string()).for_stderr().cyan(),
        prompt_style: Style::new().for_stderr().bold(),
        prompt_suffix: style("›".to_string()).for_stderr().bright().black(),
        active_item_prefix: style("▸".to_string()).for_stderr().cyan(),
        active_item_style: Style::new().for_stderr().cyan(),
        success_prefix: style("✓".to_string()).for_stderr().green(),
        success_suffix: style("·".to_string()).for_stderr().bright().black(),
        error_prefix: style("✗".to_string()).for_stderr().red(),
        error_style: Style::new().for_stderr().red(),
        values_style: Style::new().for_stderr().green(),
        ..ColorfulTheme::default()
    }
}

/// Prints the banner to stderr so stdout stays clean.
pub fn print_banner() {
    let lines = banner_lines(polycap_core::VERSION);
    let cyan = Style::new().for_stderr().cyan();

    eprintln!();
    for line in &lines {
        eprintln!("{}", cyan.apply_to(line));
    }
    eprintln!();
}

fn banner_lines(version: &str) -> [String; 4] {
    let version_line = format!("Polycap v{version}");
    let tagline = "Multilingual image descriptions";
    let inner_width = tagline.len() + 4;

    [
        format!("  ╔{:═<width$}╗", "", width = inner_width),
        format!("  ║{:^width$}║", version_line, width = inner_width),
        format!("  ║{:^width$}║", tagline, width = inner_width),
        format!("  ╚{:═<width$}╝", "", width = inner_width),
    ]
}
