//! Structured response parser.
//!
//! Generated text is supposed to be a bare JSON array, but often
//! arrives wrapped in prose or a fenced code block, or is not valid JSON
//! at all. [`parse_themes`] runs an ordered cascade of strategies and
//! always returns something renderable:
//!
//! | Stage | Strategy |
//! |-------|----------|
//! | [`ParseStage::DirectArray`] | first `[` to last `]`, else the first complete array after the first `[` |
//! | [`ParseStage::FencedBlock`] | interior of the first ```` ``` ```` block |
//! | [`ParseStage::TitleScrape`] | `"title": "..."` fragments → placeholder records |
//! | [`ParseStage::Fallback`] | one fixed default theme |
//!
//! The translation path reuses only the two structured stages; see
//! [`parse_structured`].

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::models::ThemeRecord;
use crate::prompt::THEME_COUNT;

static FENCED_BLOCK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)```(?:json)?(.*?)```").unwrap_or_else(|e| panic!("fence regex: {e}"))
});

static TITLE_FRAGMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?:"title"|\{)\s*:\s*"([^"]+)""#)
        .unwrap_or_else(|e| panic!("title regex: {e}"))
});

/// Which cascade stage produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParseStage {
    DirectArray,
    FencedBlock,
    TitleScrape,
    /// Every strategy failed; the themes are the fixed default.
    Fallback,
}

impl ParseStage {
    /// Whether the records came from real structured output.
    pub fn is_structured(&self) -> bool {
        matches!(self, ParseStage::DirectArray | ParseStage::FencedBlock)
    }
}

impl std::fmt::Display for ParseStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ParseStage::DirectArray => "direct array",
            ParseStage::FencedBlock => "fenced block",
            ParseStage::TitleScrape => "title scrape",
            ParseStage::Fallback => "fallback",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedThemes {
    pub themes: Vec<ThemeRecord>,
    pub stage: ParseStage,
}

type Strategy = fn(&str) -> Option<Vec<ThemeRecord>>;

/// The structured strategies, shared by generation and translation.
const STRUCTURED: [(ParseStage, Strategy); 2] = [
    (ParseStage::DirectArray, direct_array),
    (ParseStage::FencedBlock, fenced_block),
];

/// Parse a raw generation response. Never fails.
pub fn parse_themes(raw: &str) -> ParsedThemes {
    if let Some(parsed) = parse_structured(raw) {
        return parsed;
    }

    let scraped = scrape_titles(raw);
    if !scraped.is_empty() {
        tracing::warn!(
            count = scraped.len(),
            "structured parse failed; recovered titles only"
        );
        return ParsedThemes {
            themes: scraped,
            stage: ParseStage::TitleScrape,
        };
    }

    tracing::warn!("no themes recoverable from response; using default theme");
    ParsedThemes {
        themes: vec![ThemeRecord::fallback()],
        stage: ParseStage::Fallback,
    }
}

/// Run only the structured stages (direct array, then fenced block).
pub fn parse_structured(raw: &str) -> Option<ParsedThemes> {
    STRUCTURED.iter().find_map(|(stage, strategy)| {
        strategy(raw).map(|themes| {
            tracing::debug!(stage = %stage, count = themes.len(), "parsed themes");
            ParsedThemes {
                themes,
                stage: *stage,
            }
        })
    })
}

/// A non-empty JSON array of objects.
fn parse_array(candidate: &str) -> Option<Vec<ThemeRecord>> {
    serde_json::from_str::<Vec<ThemeRecord>>(candidate.trim())
        .ok()
        .filter(|themes| !themes.is_empty())
}

/// Stage 1: the span from the first `[` to the last `]`, or the whole text.
///
/// When that span does not parse (prose after the array may contain a
/// `]`), the first complete array starting at the first `[` is taken and
/// anything after it ignored.
fn direct_array(raw: &str) -> Option<Vec<ThemeRecord>> {
    let start = raw.find('[');
    let candidate = match (start, raw.rfind(']')) {
        (Some(start), Some(end)) if start < end => &raw[start..=end],
        _ => raw,
    };
    parse_array(candidate).or_else(|| start.and_then(|start| leading_array(&raw[start..])))
}

/// The first JSON array at the start of `text`, ignoring trailing text.
fn leading_array(text: &str) -> Option<Vec<ThemeRecord>> {
    serde_json::Deserializer::from_str(text)
        .into_iter::<Vec<ThemeRecord>>()
        .next()?
        .ok()
        .filter(|themes| !themes.is_empty())
}

fn fenced_interior(raw: &str) -> Option<&str> {
    FENCED_BLOCK
        .captures(raw)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
}

/// Stage 2: the interior of the first fenced code block.
fn fenced_block(raw: &str) -> Option<Vec<ThemeRecord>> {
    fenced_interior(raw).and_then(parse_array)
}

/// Stage 3: titles from `"title": "..."` fragments, in order, at most [`THEME_COUNT`].
///
/// Scans the fenced interior when there is one, otherwise the whole text.
fn scrape_titles(raw: &str) -> Vec<ThemeRecord> {
    let haystack = fenced_interior(raw).unwrap_or(raw);
    TITLE_FRAGMENT
        .captures_iter(haystack)
        .filter_map(|caps| caps.get(1))
        .take(THEME_COUNT)
        .map(|m| ThemeRecord::from_title(m.as_str()))
        .collect()
}
