//! The `polycap models` and `polycap languages` listings.

use console::Style;
use polycap_core::{Config, PromptVariant};

/// Print the selectable vision models and the fixed translator.
pub fn list_models(config: &Config) -> anyhow::Result<()> {
    let bold = Style::new().bold();
    let dim = Style::new().dim();

    println!("{}", bold.apply_to("Vision models:"));
    for (i, model) in config.models.vision.iter().enumerate() {
        let marker = if i == 0 { "(default)" } else { "" };
        println!(
            "  {:<24} {} {}",
            model.id,
            model.label,
            dim.apply_to(marker)
        );
    }
    println!();
    println!("{}", bold.apply_to("Translator:"));
    println!("  {}", config.models.translator);
    Ok(())
}

/// Print the supported target languages and their prompt policy.
pub fn list_languages(config: &Config) -> anyhow::Result<()> {
    let policy = config.caption_policy();
    let dim = Style::new().dim();

    for language in &config.languages.supported {
        println!(
            "  {:<16} {}",
            language,
            dim.apply_to(language_notes(config, language, policy.variant_for(language)))
        );
    }
    Ok(())
}

/// Short annotation describing how a language is handled.
fn language_notes(config: &Config, language: &str, variant: PromptVariant) -> String {
    let mut notes = Vec::new();
    if language == config.languages.default {
        notes.push("default");
    }
    if polycap_core::describe::is_english(language) {
        notes.push("no translation");
    }
    if variant == PromptVariant::Short {
        notes.push("short caption");
    }
    if config.prompts.strict_empty.iter().any(|l| l == language) {
        notes.push("empty translation is an error");
    }
    if notes.is_empty() {
        String::new()
    } else {
        format!("({})", notes.join(", "))
    }
}
