//! Keyword-based topic classifier.
//!
//! Each video gets exactly one [`ClassificationLabel`] from an ordered
//! table of patterns. Patterns overlap on purpose, so the table order is
//! part of the contract: the first pattern that matches wins.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::ClassificationLabel;

/// Number of description characters considered alongside the title.
pub const EXCERPT_CHARS: usize = 200;

static RULES: Lazy<Vec<(Regex, ClassificationLabel)>> = Lazy::new(|| {
    [
        (r"meditation|mindfulness", ClassificationLabel::Meditation),
        (r"buddhis|zen|tao", ClassificationLabel::EasternPhilosophy),
        (r"christian|jesus|bible|faith", ClassificationLabel::Christian),
        (r"islam|muslim|quran", ClassificationLabel::Islamic),
        (r"judaism|jewish|torah", ClassificationLabel::Jewish),
        (r"hindu|vedanta|yoga", ClassificationLabel::Hindu),
        (r"consciousness|awareness", ClassificationLabel::Consciousness),
        (
            r"psychedelic|plant medicine|ayahuasca|dmt",
            ClassificationLabel::Psychedelic,
        ),
        (r"near death|afterlife|heaven", ClassificationLabel::Afterlife),
        (r"science|physics|quantum", ClassificationLabel::Science),
        // NOTE: "consciousness|awareness" here can never fire; the
        // Consciousness rule above always matches first. Kept as-is so
        // existing labels stay stable.
        (
            r"gnosticism|gnostic|consciousness|awareness",
            ClassificationLabel::Gnosticism,
        ),
    ]
    .into_iter()
    .map(|(pattern, label)| {
        let re = Regex::new(pattern).unwrap_or_else(|e| panic!("bad rule {pattern}: {e}"));
        (re, label)
    })
    .collect()
});

/// First [`EXCERPT_CHARS`] characters of a description, with `...` when cut.
pub fn description_excerpt(description: &str) -> String {
    if description.chars().count() > EXCERPT_CHARS {
        let mut excerpt: String = description.chars().take(EXCERPT_CHARS).collect();
        excerpt.push_str("...");
        excerpt
    } else {
        description.to_string()
    }
}

/// Classify a video from its title and description. Total and deterministic.
pub fn classify(title: &str, description: &str) -> ClassificationLabel {
    let haystack = format!(
        "{}{}",
        title.to_lowercase(),
        description_excerpt(description).to_lowercase()
    );

    RULES
        .iter()
        .find(|(re, _)| re.is_match(&haystack))
        .map(|(_, label)| *label)
        .unwrap_or(ClassificationLabel::General)
}
