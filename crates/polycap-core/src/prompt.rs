//! Prompt construction for the captioning and translation stages.
//!
//! Long English descriptions translate poorly into some targets, so the
//! caption prompt is chosen per target language from a policy table rather
//! than by script or language family.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One sentence, for targets where long descriptions translate unreliably.
pub const SHORT_CAPTION_PROMPT: &str =
    "Describe the image in a single, short sentence in English.";

/// Exhaustive description, always requested in English.
pub const DETAILED_CAPTION_PROMPT: &str =
    "Provide a highly detailed and exhaustive description of the image. \
     List all visible objects, their actions, their spatial relationship, and the overall context \
     of the scene in English.";

/// Which caption prompt to send to the vision model.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PromptVariant {
    /// A single short English sentence
    Short,
    /// Objects, actions, spatial relationships and scene context
    #[default]
    Detailed,
}

impl PromptVariant {
    pub fn text(self) -> &'static str {
        match self {
            PromptVariant::Short => SHORT_CAPTION_PROMPT,
            PromptVariant::Detailed => DETAILED_CAPTION_PROMPT,
        }
    }
}

/// Language → caption prompt variant table.
///
/// Keys are matched exactly against the target language display name.
/// Unlisted languages get [`PromptVariant::Detailed`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptionPolicy {
    variants: BTreeMap<String, PromptVariant>,
}

impl Default for CaptionPolicy {
    fn default() -> Self {
        Self::new(BTreeMap::from([(
            "Amharic".to_string(),
            PromptVariant::Short,
        )]))
    }
}

impl CaptionPolicy {
    pub fn new(variants: BTreeMap<String, PromptVariant>) -> Self {
        Self { variants }
    }

    /// Variant for a target language. Case-sensitive.
    pub fn variant_for(&self, target_language: &str) -> PromptVariant {
        self.variants
            .get(target_language)
            .copied()
            .unwrap_or_default()
    }

    /// Caption prompt for a target language.
    pub fn caption_prompt(&self, target_language: &str) -> String {
        self.variant_for(target_language).text().to_string()
    }
}

/// Caption prompt for `target_language` under the default policy.
pub fn build_caption_prompt(target_language: &str) -> String {
    CaptionPolicy::default().caption_prompt(target_language)
}

/// Instruction to translate `english_text` into `target_language`.
///
/// The source text is embedded verbatim.
pub fn build_translation_prompt(english_text: &str, target_language: &str) -> String {
    format!(
        "Translate the following English description into the {target_language} language. \
         Provide ONLY the translated text, nothing else. \
         Description:\n\n'{english_text}'"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_amharic_gets_short_prompt() {
        assert_eq!(build_caption_prompt("Amharic"), SHORT_CAPTION_PROMPT);
    }

    #[test]
    fn test_lowercase_amharic_gets_detailed_prompt() {
        // Exact, case-sensitive match on the display name
        assert_eq!(build_caption_prompt("amharic"), DETAILED_CAPTION_PROMPT);
        assert_eq!(build_caption_prompt("AMHARIC"), DETAILED_CAPTION_PROMPT);
        assert_eq!(build_caption_prompt(" Amharic"), DETAILED_CAPTION_PROMPT);
    }

    #[test]
    fn test_other_languages_get_detailed_prompt() {
        for lang in ["English", "Chinese", "French", "Spanish", "", "Klingon"] {
            assert_eq!(build_caption_prompt(lang), DETAILED_CAPTION_PROMPT, "{lang}");
        }
    }

    #[test]
    fn test_detailed_prompt_asks_for_english() {
        assert!(DETAILED_CAPTION_PROMPT.contains("spatial relationship"));
        assert!(DETAILED_CAPTION_PROMPT.ends_with("in English."));
    }

    #[test]
    fn test_custom_policy_is_data_driven() {
        let policy = CaptionPolicy::new(BTreeMap::from([
            ("Amharic".to_string(), PromptVariant::Short),
            ("Tigrinya".to_string(), PromptVariant::Short),
        ]));
        assert_eq!(policy.variant_for("Tigrinya"), PromptVariant::Short);
        assert_eq!(policy.variant_for("French"), PromptVariant::Detailed);
        assert_eq!(policy.variant_for("Amharic"), PromptVariant::Short);
    }

    #[test]
    fn test_translation_prompt_embeds_text_verbatim() {
        let text = "A cat sits on a mat.\n  Second line with 'quotes' and ünïcode.";
        let prompt = build_translation_prompt(text, "French");
        assert!(prompt.contains(text));
        assert!(prompt.contains("into the French language"));
        assert!(prompt.contains("Provide ONLY the translated text"));
    }

    #[test]
    fn test_translation_prompt_does_not_truncate() {
        let text = "word ".repeat(5_000);
        let prompt = build_translation_prompt(&text, "Chinese");
        assert!(prompt.contains(&text));
    }
}
