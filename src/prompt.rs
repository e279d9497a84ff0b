//! Theme request builder.
//!
//! Turns classified video titles, an age cohort, and optional domain
//! context into the generation prompt. Pure templating; the prompt
//! pins the seven-field JSON contract that [`crate::parse`] relies on.

use crate::models::{MinedVideo, THEME_FIELDS};

/// Upper bound on embedded domain context, in characters.
pub const MAX_DOMAIN_CONTEXT_CHARS: usize = 10_000;

/// Number of themes every prompt asks for.
pub const THEME_COUNT: usize = 10;

/// Cohort keys offered by the CLI, in display order.
pub const COHORTS: [&str; 5] = ["20-30", "30-40", "40-50", "50-60", "60+"];

/// Typical characteristics of an age cohort, or `""` for unknown keys.
pub fn cohort_characteristics(cohort: &str) -> &'static str {
    match cohort {
        "20-30" => "digital natives, social media focused, seeking authenticity, concerned about climate crisis, mental health aware",
        "30-40" => "career-focused, starting families, balancing work-life, health conscious, pragmatic spirituality",
        "40-50" => "mid-life reflection, established careers, parenting teens, seeking deeper meaning, stress management",
        "50-60" => "empty nest transitions, career peak or change, caring for aging parents, legacy considerations",
        "60+" => "retirement planning/living, health challenges, grandparenting, mortality awareness, wisdom sharing",
        _ => "",
    }
}

/// Cap domain context at [`MAX_DOMAIN_CONTEXT_CHARS`], appending `...` when cut.
pub fn bound_domain_context(text: &str) -> String {
    if text.chars().count() > MAX_DOMAIN_CONTEXT_CHARS {
        let mut bounded: String = text.chars().take(MAX_DOMAIN_CONTEXT_CHARS).collect();
        bounded.push_str("...");
        bounded
    } else {
        text.to_string()
    }
}

/// Everything one generation call needs.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationContext {
    /// `(title, label)` pairs in mining order.
    pub items: Vec<(String, String)>,
    pub cohort: String,
    pub characteristics: String,
    /// Already bounded; `None` when no context is loaded or it is blank.
    pub domain_context: Option<String>,
}

impl GenerationContext {
    pub fn new(videos: &[MinedVideo], cohort: &str, domain_context: Option<&str>) -> Self {
        let items = videos
            .iter()
            .map(|v| (v.video.title.clone(), v.label.as_str().to_string()))
            .collect();

        Self {
            items,
            cohort: cohort.to_string(),
            characteristics: cohort_characteristics(cohort).to_string(),
            domain_context: domain_context
                .filter(|c| !c.trim().is_empty())
                .map(bound_domain_context),
        }
    }

    pub fn has_domain_context(&self) -> bool {
        self.domain_context.is_some()
    }
}

fn field_schema(connection_hint: &str) -> String {
    let hints = [
        "The catchy title that reflects both current trends and philosophical approach",
        "A short description (2-3 sentences)",
        "Explanation of why this theme resonates with this specific age group",
        connection_hint,
        "An outline for a 30-minute lecture based on the theme",
        "A 50-60 word teaser that would be compelling for marketing purposes",
        "A 500-word text that expands on the theme for a document/flyer",
    ];
    let lines: Vec<String> = THEME_FIELDS
        .iter()
        .zip(hints)
        .map(|(field, hint)| format!("  \"{}\": \"{}\"", field, hint))
        .collect();
    format!("{{\n{}\n}}", lines.join(",\n"))
}

/// Build the generation prompt.
///
/// `has_domain_context` picks the template; when it is set but the
/// context carries no text, the plain template is used.
pub fn build_prompt(ctx: &GenerationContext, has_domain_context: bool) -> String {
    let titles_context = ctx
        .items
        .iter()
        .map(|(title, label)| format!("- {} ({})", title, label))
        .collect::<Vec<_>>()
        .join("\n");

    let contract = format!(
        "IMPORTANT: Return your response as exactly one valid JSON array of exactly {count} theme objects. \
Each theme object must have these exact fields:\n{schema}\n\n\
Make sure all fields are properly escaped for valid JSON and that the entire response is a valid JSON array.",
        count = THEME_COUNT,
        schema = field_schema(if has_domain_context {
            "Brief note on how it connects to the philosophical context"
        } else {
            "Brief note on how it connects to current spiritual trends"
        }),
    );

    match ctx.domain_context.as_deref().filter(|_| has_domain_context) {
        Some(domain) => format!(
            "As a spiritual content creator for a philosophical school of thought, analyze these trending YouTube video titles related to spirituality:\n\n\
{titles}\n\n\
The philosophical school has the following context, which should guide your suggestions:\n\
----\n\
{domain}\n\
----\n\n\
Based on these trends and the philosophical context, create {count} compelling lecture themes that would resonate specifically with people aged {cohort} years.\n\
Consider that this age group typically has these characteristics: {traits}.\n\n\
Make sure your suggested themes align with the philosophical approach described in the context.\n\n\
{contract}\n",
            titles = titles_context,
            domain = domain,
            count = THEME_COUNT,
            cohort = ctx.cohort,
            traits = ctx.characteristics,
            contract = contract,
        ),
        None => format!(
            "As a spiritual content creator, analyze these trending YouTube video titles related to spirituality:\n\n\
{titles}\n\n\
Based on these trends, create {count} compelling lecture themes that would resonate specifically with people aged {cohort} years.\n\
Consider that this age group typically has these characteristics: {traits}.\n\n\
{contract}\n",
            titles = titles_context,
            count = THEME_COUNT,
            cohort = ctx.cohort,
            traits = ctx.characteristics,
            contract = contract,
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::classify;
    use crate::models::{RecencyWindow, VideoRecord};

    fn mined(title: &str) -> MinedVideo {
        MinedVideo {
            video: VideoRecord {
                video_id: title.to_lowercase().replace(' ', "-"),
                title: title.to_string(),
                description: String::new(),
                channel: "Channel".to_string(),
                published_at: "2026-10-01T00:00:00Z".to_string(),
                thumbnail: None,
                view_count: 1,
                like_count: 0,
                comment_count: 0,
            },
            label: classify(title, ""),
            window: RecencyWindow::Week,
        }
    }

    #[test]
    fn truncation_boundaries() {
        let over = "a".repeat(MAX_DOMAIN_CONTEXT_CHARS + 1);
        let bounded = bound_domain_context(&over);
        assert_eq!(bounded.len(), MAX_DOMAIN_CONTEXT_CHARS + 3);
        assert_eq!(&bounded[..MAX_DOMAIN_CONTEXT_CHARS], &over[..MAX_DOMAIN_CONTEXT_CHARS]);
        assert!(bounded.ends_with("..."));

        let under = "b".repeat(MAX_DOMAIN_CONTEXT_CHARS - 1);
        assert_eq!(bound_domain_context(&under), under);

        let exact = "c".repeat(MAX_DOMAIN_CONTEXT_CHARS);
        assert_eq!(bound_domain_context(&exact), exact);
    }

    #[test]
    fn truncation_counts_characters_not_bytes() {
        let over = "á".repeat(MAX_DOMAIN_CONTEXT_CHARS + 1);
        let bounded = bound_domain_context(&over);
        assert_eq!(bounded.chars().count(), MAX_DOMAIN_CONTEXT_CHARS + 3);
    }

    #[test]
    fn unknown_cohort_degrades_to_empty_clause() {
        assert_eq!(cohort_characteristics("10-20"), "");
        let ctx = GenerationContext::new(&[mined("Zen")], "10-20", None);
        let prompt = build_prompt(&ctx, false);
        assert!(prompt.contains("characteristics: ."));
    }

    #[test]
    fn prompt_lists_every_video_with_label() {
        let titles = [
            "Guided Meditation for Beginners",
            "The Tao of Letting Go",
            "Jesus and the Modern Mind",
            "Quantum Physics and the Soul",
            "Ayahuasca Journeys",
            "Near Death Testimonies",
            "Morning Yoga Flow",
            "Understanding the Quran",
            "Torah Study for Everyone",
            "Expanding Consciousness",
            "The Gnostic Gospels",
            "Sunday Sermon",
            "Mindfulness at Work",
            "Zen Gardens",
            "Vedanta Explained",
        ];
        let videos: Vec<MinedVideo> = titles.iter().map(|t| mined(t)).collect();
        let ctx = GenerationContext::new(&videos, "30-40", None);
        let prompt = build_prompt(&ctx, ctx.has_domain_context());

        let bullet_lines: Vec<&str> = prompt.lines().filter(|l| l.starts_with("- ")).collect();
        assert_eq!(bullet_lines.len(), 15);
        assert!(prompt.contains("- Guided Meditation for Beginners (Meditation/Mindfulness practice)"));
        assert!(prompt.contains("- The Tao of Letting Go (Eastern philosophy)"));
        assert!(prompt.contains(
            "career-focused, starting families, balancing work-life, health conscious, pragmatic spirituality"
        ));
        assert!(prompt.contains("aged 30-40 years"));
    }

    #[test]
    fn prompt_demands_seven_field_array() {
        let ctx = GenerationContext::new(&[mined("Zen")], "20-30", None);
        let prompt = build_prompt(&ctx, false);
        assert!(prompt.contains("exactly one valid JSON array of exactly 10 theme objects"));
        for field in THEME_FIELDS {
            assert!(prompt.contains(&format!("\"{}\":", field)), "missing {}", field);
        }
    }

    #[test]
    fn domain_context_embedded_between_delimiters() {
        let ctx = GenerationContext::new(&[mined("Zen")], "60+", Some("The school teaches inner renewal."));
        assert!(ctx.has_domain_context());
        let prompt = build_prompt(&ctx, true);
        assert!(prompt.contains("----\nThe school teaches inner renewal.\n----"));
        assert!(prompt.contains("philosophical school of thought"));

        let plain = build_prompt(&ctx, false);
        assert!(!plain.contains("inner renewal"));
        assert!(!plain.contains("----"));
    }

    #[test]
    fn blank_domain_context_is_dropped_and_long_is_bounded() {
        let blank = GenerationContext::new(&[], "60+", Some("   \n"));
        assert!(!blank.has_domain_context());

        let long = "z".repeat(MAX_DOMAIN_CONTEXT_CHARS + 50);
        let ctx = GenerationContext::new(&[], "60+", Some(&long));
        let domain = ctx.domain_context.unwrap();
        assert_eq!(domain.len(), MAX_DOMAIN_CONTEXT_CHARS + 3);
    }
}
