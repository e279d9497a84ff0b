//! Translation adapter.
//!
//! Sends an English theme collection back through the generative
//! service as JSON, asking for values to be translated and keys and
//! structure kept. Only the structured parse stages apply here: when
//! they fail the original, untranslated themes are returned rather than
//! synthesized placeholders.

use anyhow::Result;

use crate::llm::TextGenerator;
use crate::models::{Language, ThemeRecord};
use crate::parse::{parse_structured, ParseStage};

#[derive(Debug, Clone, PartialEq)]
pub struct TranslationOutcome {
    pub themes: Vec<ThemeRecord>,
    /// Raw response text, or the error message when the call itself failed.
    pub raw: String,
    /// `None` when the original themes were returned.
    pub stage: Option<ParseStage>,
}

impl TranslationOutcome {
    pub fn translated(&self) -> bool {
        self.stage.is_some()
    }
}

/// Build the translation prompt. Non-ASCII text is embedded verbatim.
pub fn translation_prompt(themes: &[ThemeRecord], target: Language) -> Result<String> {
    let payload = serde_json::to_string_pretty(themes)?;
    let target = target.prompt_name();

    Ok(format!(
        "You are a professional translator with expertise in spirituality, philosophy, and psychology.\n\n\
Translate the following JSON data containing lecture themes from English to {target}. \
Maintain the exact same JSON structure and field names, but translate all content values.\n\n\
Pay special attention to properly translating spiritual and philosophical terms. \
Ensure the {target} translation maintains the spiritual essence and nuance of the original.\n\n\
The translation should sound natural and idiomatic in {target} while preserving the meaning.\n\n\
JSON to translate:\n```json\n{payload}\n```\n\n\
IMPORTANT: Return ONLY the translated JSON array with NO additional text or explanation. \
The result must be valid JSON that can be parsed programmatically.\n"
    ))
}

/// Parse a translation response, falling back to `original` unchanged.
///
/// A translated array must line up with `original` by position; one of a
/// different length is treated like an unparseable response.
pub fn parse_translation(original: &[ThemeRecord], raw: String) -> TranslationOutcome {
    match parse_structured(&raw) {
        Some(parsed) if parsed.themes.len() == original.len() => TranslationOutcome {
            themes: parsed.themes,
            raw,
            stage: Some(parsed.stage),
        },
        Some(parsed) => {
            tracing::warn!(
                expected = original.len(),
                got = parsed.themes.len(),
                "translated collection length differs from original; keeping original themes"
            );
            untranslated(original, raw)
        }
        None => {
            let preview: String = raw.chars().take(500).collect();
            tracing::warn!(response = %preview, "failed to parse translated JSON; keeping original themes");
            untranslated(original, raw)
        }
    }
}

fn untranslated(original: &[ThemeRecord], raw: String) -> TranslationOutcome {
    TranslationOutcome {
        themes: original.to_vec(),
        raw,
        stage: None,
    }
}

async fn request_translation(
    generator: &dyn TextGenerator,
    themes: &[ThemeRecord],
    target: Language,
) -> Result<String> {
    let prompt = translation_prompt(themes, target)?;
    generator.generate(&prompt).await
}

/// Translate `themes` into `target`. Never fails; see [`TranslationOutcome`].
pub async fn translate(
    generator: &dyn TextGenerator,
    themes: &[ThemeRecord],
    target: Language,
) -> TranslationOutcome {
    match request_translation(generator, themes, target).await {
        Ok(raw) => parse_translation(themes, raw),
        Err(e) => {
            tracing::warn!(error = %e, "translation request failed; keeping original themes");
            untranslated(themes, e.to_string())
        }
    }
}
