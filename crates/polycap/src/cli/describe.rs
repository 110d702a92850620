//! The `polycap describe` command.

use clap::{Args, ValueEnum};
use polycap_core::output::download_file_name;
use polycap_core::{
    Config, DescribeRequest, DescriptionRecord, OutputFormat as CoreOutputFormat, OutputWriter,
    PipelineError, Polycap, Stage,
};
use std::fs::File;
use std::io::{BufWriter, IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Supported output formats.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum OutputFormat {
    /// The description text only
    Text,
    /// JSON record with the English text and models used
    Json,
}

impl From<OutputFormat> for CoreOutputFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Text => CoreOutputFormat::Text,
            OutputFormat::Json => CoreOutputFormat::Json,
        }
    }
}

/// Arguments for the `describe` command.
#[derive(Args, Debug)]
pub struct DescribeArgs {
    /// Image file to describe (JPEG, PNG, WebP or GIF)
    #[arg(required = true)]
    pub image: PathBuf,

    /// Target language display name, e.g. "French" or "Amharic"
    #[arg(short, long)]
    pub language: Option<String>,

    /// Vision model used for captioning (defaults to the first configured one)
    #[arg(short, long)]
    pub model: Option<String>,

    /// Inference server URL (overrides the config file)
    #[arg(long, env = "OLLAMA_HOST")]
    pub endpoint: Option<String>,

    /// Write the result to this file instead of stdout
    #[arg(short, long, conflicts_with = "save")]
    pub output: Option<PathBuf>,

    /// Save the result as description_<language>.txt in the current directory
    #[arg(long)]
    pub save: bool,

    /// Output format (defaults to the config file setting)
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,

    /// Also print the intermediate English description to stderr
    #[arg(long)]
    pub show_english: bool,
}

/// Execute the describe command.
pub async fn execute(args: DescribeArgs, config: Config) -> anyhow::Result<()> {
    let config = config.with_endpoint(args.endpoint.as_deref())?;
    let language = resolve_language(args.language.as_deref(), &config);
    let model = resolve_model(args.model.as_deref(), &config)?;
    let format = resolve_format(args.format, &config);
    let pretty = args.pretty || config.output.pretty;

    let output_path = args
        .output
        .or_else(|| args.save.then(|| PathBuf::from(download_file_name(&language))));
    let partial_to_stdout = partial_goes_to_stdout(format, output_path.as_deref());

    let polycap = Polycap::new(config);
    let image = polycap.load_image(&args.image)?;
    let request = DescribeRequest::new(&model, &language, image);

    let spinner = create_spinner();
    let result = polycap
        .describe_with_progress(&request, |stage| {
            spinner.set_message(stage_message(stage, &model, &language));
        })
        .await;
    spinner.finish_and_clear();

    let outcome = match result {
        Ok(outcome) => outcome,
        Err(e) => {
            return Err(report_failure(
                e,
                polycap.config().endpoint(),
                partial_to_stdout,
            ))
        }
    };

    if args.show_english {
        if let Some(english) = &outcome.english_text {
            let dim = console::Style::new().for_stderr().dim();
            eprintln!("{}", dim.apply_to(format!("English: {english}")));
        }
    }

    let record = DescriptionRecord::new(
        outcome,
        args.image
            .file_name()
            .map(|n| n.to_string_lossy().into_owned()),
    );

    match output_path {
        Some(path) => {
            let file = File::create(&path)?;
            let mut writer = OutputWriter::new(BufWriter::new(file), format, pretty);
            writer.write(&record)?;
            writer.flush()?;
            tracing::info!("Description saved to {}", path.display());
        }
        None => {
            let stdout = std::io::stdout();
            let mut writer = OutputWriter::new(stdout.lock(), format, pretty);
            writer.write(&record)?;
            writer.flush()?;
        }
    }

    Ok(())
}

/// Print whatever survived a failed run and convert the error for `main`.
///
/// A translation failure still has the English description. It goes to
/// stdout only when stdout is carrying plain text; otherwise to stderr, so
/// JSON consumers and file output never see unstructured text.
pub fn report_failure(
    err: PipelineError,
    endpoint: &str,
    partial_to_stdout: bool,
) -> anyhow::Error {
    if let Some(english) = err.partial_english() {
        let warn = console::Style::new().for_stderr().yellow();
        eprintln!(
            "{}",
            warn.apply_to("Translation failed; English description follows:")
        );
        if partial_to_stdout {
            println!("{english}");
        } else {
            eprintln!("{english}");
        }
    }
    tracing::error!(stage = err.stage(), "{err}");

    match failure_hint(&err, endpoint) {
        Some(hint) => anyhow::Error::new(err).context(hint),
        None => err.into(),
    }
}

/// Whether a partial result may be printed on stdout.
fn partial_goes_to_stdout(format: CoreOutputFormat, output: Option<&Path>) -> bool {
    format == CoreOutputFormat::Text && output.is_none()
}

/// Operator hint for failures with a recognizable transport cause.
fn failure_hint(err: &PipelineError, endpoint: &str) -> Option<String> {
    let cause = err.inference_error()?;
    if cause.is_connection() {
        return Some(format!(
            "Could not reach Ollama at {endpoint}. Is it running? \
             Set --endpoint or OLLAMA_HOST to point elsewhere."
        ));
    }
    if cause.is_timeout() {
        let setting = if err.stage() == "translation" {
            "limits.translation_timeout_ms"
        } else {
            "limits.caption_timeout_ms"
        };
        return Some(format!(
            "The model did not answer in time. Raise {setting} in the config file."
        ));
    }
    if cause.status_code() == Some(404) {
        return Some(
            "Model not found on the server. Run `polycap status` to see missing models."
                .to_string(),
        );
    }
    None
}

/// Target language: the flag, else the configured default.
pub fn resolve_language(requested: Option<&str>, config: &Config) -> String {
    let language = requested
        .map(|l| l.trim().to_string())
        .unwrap_or_else(|| config.languages.default.clone());

    if !config.languages.supported.iter().any(|l| l == &language) {
        tracing::warn!(
            "'{language}' is not in the supported language list ({}); trying anyway",
            config.languages.supported.join(", ")
        );
    }
    language
}

/// Vision model: the flag, else the first catalog entry.
///
/// The translator is never accepted as a captioning model.
pub fn resolve_model(requested: Option<&str>, config: &Config) -> anyhow::Result<String> {
    let model = match requested {
        Some(model) => model.trim().to_string(),
        None => match config.default_vision_model() {
            Some(model) => model.id.clone(),
            None => anyhow::bail!("No vision models configured. Check `polycap config show`."),
        },
    };

    if model == config.models.translator {
        anyhow::bail!(
            "'{model}' is the translator model and cannot caption images.\n\n  \
             Hint: run `polycap models` to see the vision models."
        );
    }
    if config.vision_model(&model).is_none() {
        tracing::warn!("'{model}' is not in the configured vision model catalog");
    }
    Ok(model)
}

fn resolve_format(requested: Option<OutputFormat>, config: &Config) -> CoreOutputFormat {
    requested
        .map(CoreOutputFormat::from)
        .or_else(|| CoreOutputFormat::parse(&config.output.format))
        .unwrap_or(CoreOutputFormat::Text)
}

fn stage_message(stage: Stage, model: &str, language: &str) -> String {
    let translating = !polycap_core::describe::is_english(language);
    match (stage, translating) {
        (Stage::Captioning, true) => format!("Step 1/2: Analyzing with {model}..."),
        (Stage::Captioning, false) => format!("Analyzing with {model}..."),
        (Stage::Translating, _) => format!("Step 2/2: Translating to {language}..."),
    }
}

/// Spinner on stderr; hidden when stderr isn't a terminal.
pub fn create_spinner() -> indicatif::ProgressBar {
    use indicatif::{ProgressBar, ProgressStyle};

    if !std::io::stderr().is_terminal() {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message("starting...");
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}
