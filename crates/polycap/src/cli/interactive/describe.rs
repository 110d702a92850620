//! Guided describe flow: model → language → image → run → optional save.

use crate::cli::describe::{create_spinner, report_failure};
use console::Style;
use dialoguer::{Confirm, Input, Select};
use polycap_core::output::download_file_name;
use polycap_core::{Config, DescribeRequest, Polycap, Stage};
use std::path::PathBuf;

use super::theme::polycap_theme;

/// Walk the user through one description.
///
/// Pipeline failures are printed and the flow returns to the menu; only
/// terminal I/O errors propagate.
pub async fn guided_describe(config: &Config) -> anyhow::Result<()> {
    let theme = polycap_theme();

    let model_items = model_items(config);
    if model_items.is_empty() {
        eprintln!("  No vision models configured.");
        return Ok(());
    }
    let Some(model_idx) = Select::with_theme(&theme)
        .with_prompt("Vision model")
        .items(&model_items)
        .default(0)
        .interact_opt()?
    else {
        return Ok(());
    };
    let model = config.models.vision[model_idx].id.clone();

    let Some((languages, default_lang)) = language_menu(config) else {
        eprintln!("  No target languages configured.");
        return Ok(());
    };
    let Some(lang_idx) = Select::with_theme(&theme)
        .with_prompt("Output language")
        .items(languages)
        .default(default_lang)
        .interact_opt()?
    else {
        return Ok(());
    };
    let language = languages[lang_idx].clone();

    let polycap = Polycap::new(config.clone());
    let warn = Style::new().for_stderr().yellow();

    let image = loop {
        let Some(raw_path) = super::handle_interrupt(
            Input::<String>::with_theme(&theme)
                .with_prompt("Path to image")
                .interact_text(),
        )?
        else {
            return Ok(());
        };

        let path = PathBuf::from(shellexpand::tilde(raw_path.trim()).into_owned());
        match polycap.load_image(&path) {
            Ok(image) => break image,
            Err(e) => eprintln!("  {}", warn.apply_to(e.to_string())),
        }
    };

    let request = DescribeRequest::new(&model, &language, image);
    let spinner = create_spinner();
    let result = polycap
        .describe_with_progress(&request, |stage| {
            spinner.set_message(match stage {
                Stage::Captioning => format!("Analyzing with {model}..."),
                Stage::Translating => format!("Translating to {language}..."),
            });
        })
        .await;
    spinner.finish_and_clear();

    let outcome = match result {
        Ok(outcome) => outcome,
        Err(e) => {
            let err = Style::new().for_stderr().red();
            let e = report_failure(e, config.endpoint(), true);
            eprintln!("  {} {e}", err.apply_to("✗"));
            return Ok(());
        }
    };

    let cyan = Style::new().for_stderr().cyan();
    eprintln!();
    eprintln!("  {}", cyan.apply_to(format!("Description ({language}):")));
    println!("{}", outcome.final_text);
    eprintln!();

    let file_name = download_file_name(&language);
    let save = Confirm::with_theme(&theme)
        .with_prompt(format!("Save as {file_name}?"))
        .default(false)
        .interact_opt()?;

    if save == Some(true) {
        std::fs::write(&file_name, &outcome.final_text)?;
        let ok = Style::new().for_stderr().green();
        eprintln!("  {} Saved {file_name}", ok.apply_to("✓"));
    }

    Ok(())
}

/// Supported languages and the index to preselect; `None` when the list is empty.
fn language_menu(config: &Config) -> Option<(&[String], usize)> {
    let languages = config.languages.supported.as_slice();
    if languages.is_empty() {
        return None;
    }
    let default = languages
        .iter()
        .position(|l| l == &config.languages.default)
        .unwrap_or(0);
    Some((languages, default))
}

/// Menu labels: "label (id)" for each configured vision model.
fn model_items(config: &Config) -> Vec<String> {
    config
        .models
        .vision
        .iter()
        .map(|m| format!("{} ({})", m.label, m.id))
        .collect()
}
