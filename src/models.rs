//! Core data models used throughout Theme Seeker.
//!
//! These types represent the videos, classification labels, and lecture
//! themes that flow through the mining, generation, translation, and
//! export pipeline.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::str::FromStr;

/// Video metadata as returned by the video source. Never mutated after fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoRecord {
    pub video_id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub channel: String,
    #[serde(default)]
    pub published_at: String,
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub view_count: u64,
    #[serde(default)]
    pub like_count: u64,
    #[serde(default)]
    pub comment_count: u64,
}

impl VideoRecord {
    pub fn watch_url(&self) -> String {
        format!("https://www.youtube.com/watch?v={}", self.video_id)
    }
}

/// A video together with the label and recency window assigned while mining.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MinedVideo {
    #[serde(flatten)]
    pub video: VideoRecord,
    pub label: ClassificationLabel,
    pub window: RecencyWindow,
}

/// Coarse topical bucket assigned by [`crate::classify::classify`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClassificationLabel {
    #[serde(rename = "Meditation/Mindfulness practice")]
    Meditation,
    #[serde(rename = "Eastern philosophy")]
    EasternPhilosophy,
    #[serde(rename = "Christian spirituality")]
    Christian,
    #[serde(rename = "Islamic spirituality")]
    Islamic,
    #[serde(rename = "Jewish spirituality")]
    Jewish,
    #[serde(rename = "Hindu spirituality")]
    Hindu,
    #[serde(rename = "Consciousness exploration")]
    Consciousness,
    #[serde(rename = "Psychedelic spirituality")]
    Psychedelic,
    #[serde(rename = "Afterlife exploration")]
    Afterlife,
    #[serde(rename = "Science and spirituality")]
    Science,
    #[serde(rename = "Gnosticism")]
    Gnosticism,
    #[serde(rename = "General spiritual content")]
    General,
}

impl ClassificationLabel {
    pub const ALL: [ClassificationLabel; 12] = [
        ClassificationLabel::Meditation,
        ClassificationLabel::EasternPhilosophy,
        ClassificationLabel::Christian,
        ClassificationLabel::Islamic,
        ClassificationLabel::Jewish,
        ClassificationLabel::Hindu,
        ClassificationLabel::Consciousness,
        ClassificationLabel::Psychedelic,
        ClassificationLabel::Afterlife,
        ClassificationLabel::Science,
        ClassificationLabel::Gnosticism,
        ClassificationLabel::General,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ClassificationLabel::Meditation => "Meditation/Mindfulness practice",
            ClassificationLabel::EasternPhilosophy => "Eastern philosophy",
            ClassificationLabel::Christian => "Christian spirituality",
            ClassificationLabel::Islamic => "Islamic spirituality",
            ClassificationLabel::Jewish => "Jewish spirituality",
            ClassificationLabel::Hindu => "Hindu spirituality",
            ClassificationLabel::Consciousness => "Consciousness exploration",
            ClassificationLabel::Psychedelic => "Psychedelic spirituality",
            ClassificationLabel::Afterlife => "Afterlife exploration",
            ClassificationLabel::Science => "Science and spirituality",
            ClassificationLabel::Gnosticism => "Gnosticism",
            ClassificationLabel::General => "General spiritual content",
        }
    }
}

impl std::fmt::Display for ClassificationLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How far back a mining run looks. Fixed day counts, not calendar months.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RecencyWindow {
    Week,
    Month,
    HalfYear,
}

impl RecencyWindow {
    pub const ALL: [RecencyWindow; 3] = [
        RecencyWindow::Week,
        RecencyWindow::Month,
        RecencyWindow::HalfYear,
    ];

    pub fn days(&self) -> i64 {
        match self {
            RecencyWindow::Week => 7,
            RecencyWindow::Month => 30,
            RecencyWindow::HalfYear => 180,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            RecencyWindow::Week => "Last Week",
            RecencyWindow::Month => "Last Month",
            RecencyWindow::HalfYear => "Last 6 Months",
        }
    }
}

impl FromStr for RecencyWindow {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "week" | "1w" => Ok(RecencyWindow::Week),
            "month" | "30d" => Ok(RecencyWindow::Month),
            "half-year" | "6m" | "180d" => Ok(RecencyWindow::HalfYear),
            other => Err(format!(
                "unknown window '{}': expected week, month, or half-year",
                other
            )),
        }
    }
}

/// Output language of a theme collection or document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    English,
    Portuguese,
}

const EN_MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

const PT_MONTHS: [&str; 12] = [
    "Janeiro",
    "Fevereiro",
    "Março",
    "Abril",
    "Maio",
    "Junho",
    "Julho",
    "Agosto",
    "Setembro",
    "Outubro",
    "Novembro",
    "Dezembro",
];

impl Language {
    pub fn tag(&self) -> &'static str {
        match self {
            Language::English => "en",
            Language::Portuguese => "pt",
        }
    }

    /// Name used inside prompts and archive filenames.
    pub fn name(&self) -> &'static str {
        match self {
            Language::English => "english",
            Language::Portuguese => "portuguese",
        }
    }

    pub fn prompt_name(&self) -> &'static str {
        match self {
            Language::English => "English",
            Language::Portuguese => "Portuguese",
        }
    }

    pub fn filename_suffix(&self) -> &'static str {
        match self {
            Language::English => "",
            Language::Portuguese => "_pt",
        }
    }

    /// Localized month name for `month` in `1..=12`.
    pub fn month_name(&self, month: u32) -> &'static str {
        let idx = (month.clamp(1, 12) - 1) as usize;
        match self {
            Language::English => EN_MONTHS[idx],
            Language::Portuguese => PT_MONTHS[idx],
        }
    }

    fn placeholder_word(&self) -> &'static str {
        match self {
            Language::English => "Theme",
            Language::Portuguese => "Tema",
        }
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "en" | "english" => Ok(Language::English),
            "pt" | "portuguese" | "pt-br" => Ok(Language::Portuguese),
            other => Err(format!(
                "unsupported language '{}': expected en or pt",
                other
            )),
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.prompt_name())
    }
}

/// The seven fields every generated theme object carries, in prompt order.
pub const THEME_FIELDS: [&str; 7] = [
    "title",
    "description",
    "age_resonance",
    "philosophical_connection",
    "lecture_outline",
    "teaser",
    "full_text",
];

/// One lecture-topic suggestion.
///
/// Every field is optional because the generative service does not
/// guarantee its output. A record is usable downstream once it has a
/// non-empty title; see [`ThemeRecord::display_title`] for the
/// positional placeholder used otherwise.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ThemeRecord {
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub age_resonance: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub philosophical_connection: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub lecture_outline: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub teaser: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub full_text: Option<String>,
}

impl ThemeRecord {
    /// A record recovered from a bare title, with placeholder text elsewhere.
    pub fn from_title(title: &str) -> Self {
        Self {
            title: Some(title.to_string()),
            description: Some(format!("Description for '{}'", title)),
            teaser: Some(format!("Teaser for '{}'", title)),
            full_text: Some(format!(
                "This is a placeholder for the full text about '{}'.",
                title
            )),
            ..Default::default()
        }
    }

    /// The fixed theme returned when no structure or title can be recovered.
    /// Keeps document generation usable; never genuine content.
    pub fn fallback() -> Self {
        Self {
            title: Some(
                "The Algorithm of Your Soul: Breaking Free from the Echo Chamber".to_string(),
            ),
            teaser: Some(
                "Feeling trapped in an online echo chamber? Discover the 'algorithm of your soul' \
                 – the invisible code dictating your thoughts and actions."
                    .to_string(),
            ),
            full_text: Some(FALLBACK_FULL_TEXT.to_string()),
            ..Default::default()
        }
    }

    /// Non-empty trimmed title, if any.
    pub fn title(&self) -> Option<&str> {
        self.title
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }

    /// Title for display and selection, or `Theme N` / `Tema N` (1-based).
    pub fn display_title(&self, index: usize, language: Language) -> String {
        match self.title() {
            Some(t) => clean_title(t),
            None => format!("{} {}", language.placeholder_word(), index + 1),
        }
    }
}

const FALLBACK_FULL_TEXT: &str = "The algorithm of your soul is the invisible pattern that shapes your thoughts, behaviors, and perceptions. Just as digital algorithms influence what you see online, internal algorithms determine how you experience life.

By understanding these inner patterns, you can rewrite the code that limits your potential. Ancient wisdom traditions have long recognized these patterns and offer timeless techniques to transcend them.

This journey of awakening begins with awareness - recognizing when you're trapped in echo chambers of your own making. Then, through mindful reflection and intentional practice, you can gradually reprogram these patterns for a more authentic, fulfilling life.

Break free from the digital matrix. Discover your true potential.";

/// Strip markdown emphasis and heading markers from a title.
pub fn clean_title(title: &str) -> String {
    title.replace(['*', '#'], "").trim().to_string()
}

/// Accept strings, string arrays (joined by newlines), numbers, and booleans.
fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(value_to_text))
}

fn value_to_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(_) | Value::Bool(_) => Some(value.to_string()),
        Value::Array(items) => {
            let parts: Vec<String> = items.iter().filter_map(value_to_text).collect();
            if parts.is_empty() {
                None
            } else {
                Some(parts.join("\n"))
            }
        }
        Value::Object(_) => Some(value.to_string()),
    }
}
