//! Domain context loading.
//!
//! The school-of-thought description that steers generation tone is
//! kept in a local HTML or plain-text file. HTML is reduced to readable
//! text: script and style blocks removed, tags stripped, common entities
//! decoded, and lines trimmed with blank runs dropped.

use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;

/// Characters shown by `seeker context`.
pub const PREVIEW_CHARS: usize = 2_700;

static SCRIPT_STYLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<(script|style)\b[^>]*>.*?</(script|style)\s*>")
        .unwrap_or_else(|e| panic!("script regex: {e}"))
});
static COMMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<!--.*?-->").unwrap_or_else(|e| panic!("comment regex: {e}")));
static TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<[^>]*>").unwrap_or_else(|e| panic!("tag regex: {e}")));
static ENTITY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"&(#x[0-9a-fA-F]+|#[0-9]+|[a-zA-Z]+);")
        .unwrap_or_else(|e| panic!("entity regex: {e}"))
});

fn decode_entity(name: &str) -> Option<String> {
    let decoded = match name {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => ' ',
        "ndash" => '–',
        "mdash" => '—',
        "hellip" => '…',
        _ => {
            let code = if let Some(hex) = name.strip_prefix("#x") {
                u32::from_str_radix(hex, 16).ok()?
            } else if let Some(dec) = name.strip_prefix('#') {
                dec.parse().ok()?
            } else {
                return None;
            };
            char::from_u32(code)?
        }
    };
    Some(decoded.to_string())
}

/// Reduce an HTML document to its visible text.
pub fn html_to_text(html: &str) -> String {
    let without_scripts = SCRIPT_STYLE.replace_all(html, "");
    let without_comments = COMMENT.replace_all(&without_scripts, "");
    let text = TAG.replace_all(&without_comments, "\n");
    let text = ENTITY.replace_all(&text, |caps: &regex::Captures| {
        decode_entity(&caps[1]).unwrap_or_else(|| caps[0].to_string())
    });

    text.lines()
        .map(str::trim)
        .flat_map(|line| line.split("  "))
        .map(str::trim)
        .filter(|chunk| !chunk.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn looks_like_html(path: &Path, content: &str) -> bool {
    let by_extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("html") || e.eq_ignore_ascii_case("htm"))
        .unwrap_or(false);
    let head = content.trim_start();
    by_extension || head.starts_with("<!DOCTYPE") || head.starts_with("<html")
}

/// Load and clean a domain-context file. Blank results are `None`.
pub fn load_domain_context(path: &Path) -> Result<Option<String>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read context file: {}", path.display()))?;

    let text = if looks_like_html(path, &content) {
        html_to_text(&content)
    } else {
        content.trim().to_string()
    };

    if text.is_empty() {
        Ok(None)
    } else {
        Ok(Some(text))
    }
}

/// First [`PREVIEW_CHARS`] characters, with `...` when longer.
pub fn preview(text: &str) -> String {
    if text.chars().count() > PREVIEW_CHARS {
        let mut out: String = text.chars().take(PREVIEW_CHARS).collect();
        out.push_str("...");
        out
    } else {
        text.to_string()
    }
}
