//! Output formatting for description results.
//!
//! Results are written either as plain text (the final description only,
//! ready to save as a `.txt` download) or as a JSON record.

use serde::Serialize;
use std::io::{self, Write};

use crate::describe::DescriptionOutcome;

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// The final description text only
    Text,
    /// A JSON object with the description and its provenance
    Json,
}

impl OutputFormat {
    /// Parse format from string (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" | "txt" | "plain" => Some(Self::Text),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Serializable record of one description.
#[derive(Debug, Clone, Serialize)]
pub struct DescriptionRecord {
    /// File name of the described image, when it came from disk
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    #[serde(flatten)]
    pub outcome: DescriptionOutcome,
}

impl DescriptionRecord {
    pub fn new(outcome: DescriptionOutcome, image: Option<String>) -> Self {
        Self { image, outcome }
    }
}

/// A writer that emits description records as text or JSON.
pub struct OutputWriter<W: Write> {
    writer: W,
    format: OutputFormat,
    pretty: bool,
}

impl<W: Write> OutputWriter<W> {
    /// Create a new output writer.
    ///
    /// `pretty` only affects JSON output.
    pub fn new(writer: W, format: OutputFormat, pretty: bool) -> Self {
        Self {
            writer,
            format,
            pretty,
        }
    }

    /// Write a single record.
    pub fn write(&mut self, record: &DescriptionRecord) -> io::Result<()> {
        match self.format {
            OutputFormat::Text => {
                self.writer.write_all(record.outcome.final_text.as_bytes())?;
                writeln!(self.writer)?;
            }
            OutputFormat::Json => {
                if self.pretty {
                    serde_json::to_writer_pretty(&mut self.writer, record)
                        .map_err(io::Error::other)?;
                } else {
                    serde_json::to_writer(&mut self.writer, record).map_err(io::Error::other)?;
                }
                writeln!(self.writer)?;
            }
        }
        Ok(())
    }

    /// Flush the underlying writer.
    pub fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

/// File name offered when saving a result: `description_{language}.txt`.
///
/// Path separators and other characters unsafe in file names become `_`.
pub fn download_file_name(language: &str) -> String {
    let safe: String = language
        .trim()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!("description_{safe}.txt")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome() -> DescriptionOutcome {
        DescriptionOutcome {
            final_text: "Un chat est assis sur un tapis.".into(),
            english_text: Some("A cat sits on a mat.".into()),
            target_language: "French".into(),
            vision_model: "llava:latest".into(),
            translator_model: Some("qwen2:7b".into()),
        }
    }

    #[test]
    fn test_write_text() {
        let mut buffer = Vec::new();
        let mut writer = OutputWriter::new(&mut buffer, OutputFormat::Text, false);
        writer
            .write(&DescriptionRecord::new(outcome(), None))
            .unwrap();

        let output = String::from_utf8(buffer).unwrap();
        assert_eq!(output, "Un chat est assis sur un tapis.\n");
    }

    #[test]
    fn test_write_json() {
        let mut buffer = Vec::new();
        let mut writer = OutputWriter::new(&mut buffer, OutputFormat::Json, false);
        writer
            .write(&DescriptionRecord::new(outcome(), Some("cat.jpg".into())))
            .unwrap();

        let value: serde_json::Value = serde_json::from_slice(&buffer).unwrap();
        assert_eq!(value["image"], "cat.jpg");
        assert_eq!(value["final_text"], "Un chat est assis sur un tapis.");
        assert_eq!(value["english_text"], "A cat sits on a mat.");
        assert_eq!(value["translator_model"], "qwen2:7b");
    }

    #[test]
    fn test_json_omits_english_for_english_target() {
        let mut outcome = outcome();
        outcome.english_text = None;
        outcome.translator_model = None;

        let json = serde_json::to_string(&DescriptionRecord::new(outcome, None)).unwrap();
        assert!(!json.contains("english_text"));
        assert!(!json.contains("translator_model"));
        assert!(!json.contains("\"image\""));
    }

    #[test]
    fn test_format_parse() {
        assert_eq!(OutputFormat::parse("json"), Some(OutputFormat::Json));
        assert_eq!(OutputFormat::parse("TEXT"), Some(OutputFormat::Text));
        assert_eq!(OutputFormat::parse("txt"), Some(OutputFormat::Text));
        assert_eq!(OutputFormat::parse("jsonl"), None);
    }

    #[test]
    fn test_download_file_name() {
        assert_eq!(download_file_name("French"), "description_French.txt");
        assert_eq!(download_file_name("../etc"), "description____etc.txt");
        assert_eq!(download_file_name("Chinese (Simplified)"), "description_Chinese__Simplified_.txt");
    }
}
