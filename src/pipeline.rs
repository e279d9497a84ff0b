//! Step orchestration: mine, generate, translate.
//!
//! Each step takes its inputs explicitly and returns what the caller
//! should store in the [`Session`](crate::session::Session). Nothing is
//! returned for storage when the external call fails.

use anyhow::Result;
use chrono::{DateTime, Utc};

use crate::classify::classify;
use crate::config::SearchConfig;
use crate::error::SeekerError;
use crate::llm::TextGenerator;
use crate::models::{Language, MinedVideo, RecencyWindow};
use crate::parse::parse_themes;
use crate::prompt::{build_prompt, GenerationContext};
use crate::session::ThemeCollection;
use crate::translate::{translate, TranslationOutcome};
use crate::youtube::{published_after, VideoSource};

/// Fetch popular videos for one window and classify each.
pub async fn mine(
    source: &dyn VideoSource,
    search: &SearchConfig,
    window: RecencyWindow,
    now: DateTime<Utc>,
) -> Result<Vec<MinedVideo>> {
    let after = published_after(window, now);
    let videos = source
        .popular_videos(&search.query, search.max_results, &after)
        .await?;

    Ok(videos
        .into_iter()
        .map(|video| {
            let label = classify(&video.title, &video.description);
            MinedVideo {
                video,
                label,
                window,
            }
        })
        .collect())
}

/// Generate an English theme collection from mined videos.
///
/// Service failures propagate; parse failures never do, since the
/// response cascade always yields at least one theme.
pub async fn generate(
    generator: &dyn TextGenerator,
    videos: &[MinedVideo],
    cohort: &str,
    domain_context: Option<&str>,
) -> Result<ThemeCollection> {
    if videos.is_empty() {
        return Err(SeekerError::NoVideos("generation".to_string()).into());
    }

    let ctx = GenerationContext::new(videos, cohort, domain_context);
    let prompt = build_prompt(&ctx, ctx.has_domain_context());
    tracing::debug!(
        model = generator.model_name(),
        videos = ctx.items.len(),
        cohort,
        prompt_chars = prompt.chars().count(),
        "requesting themes"
    );

    let raw = generator.generate(&prompt).await?;
    let parsed = parse_themes(&raw);
    tracing::info!(stage = %parsed.stage, themes = parsed.themes.len(), "parsed generation response");

    Ok(ThemeCollection {
        language: Language::English,
        themes: parsed.themes,
        raw,
        stage: Some(parsed.stage),
    })
}

/// Translate a collection. The collection is `Some` only when the
/// translation parsed; the outcome is returned either way so the caller
/// can report the raw response.
pub async fn translate_collection(
    generator: &dyn TextGenerator,
    english: &ThemeCollection,
    target: Language,
) -> Result<(Option<ThemeCollection>, TranslationOutcome)> {
    if english.themes.is_empty() {
        return Err(SeekerError::NoThemes.into());
    }

    let outcome = translate(generator, &english.themes, target).await;
    let collection = outcome.translated().then(|| ThemeCollection {
        language: target,
        themes: outcome.themes.clone(),
        raw: outcome.raw.clone(),
        stage: outcome.stage,
    });
    Ok((collection, outcome))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::ScriptedGenerator;
    use crate::models::{ClassificationLabel, VideoRecord};
    use crate::parse::ParseStage;
    use async_trait::async_trait;
    use chrono::TimeZone;
    use std::sync::Mutex;

    struct FixedSource {
        videos: Vec<VideoRecord>,
        calls: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl VideoSource for FixedSource {
        async fn popular_videos(
            &self,
            query: &str,
            _max_results: u32,
            published_after: &str,
        ) -> Result<Vec<VideoRecord>> {
            self.calls
                .lock()
                .unwrap()
                .push(format!("{}@{}", query, published_after));
            Ok(self.videos.clone())
        }
    }

    fn video(id: &str, title: &str) -> VideoRecord {
        VideoRecord {
            video_id: id.to_string(),
            title: title.to_string(),
            description: String::new(),
            channel: String::new(),
            published_at: String::new(),
            thumbnail: None,
            view_count: 0,
            like_count: 0,
            comment_count: 0,
        }
    }

    #[tokio::test]
    async fn mine_classifies_and_tags_window() {
        let source = FixedSource {
            videos: vec![video("1", "Morning Meditation"), video("2", "Cooking show")],
            calls: Mutex::new(Vec::new()),
        };
        let now = Utc.with_ymd_and_hms(2026, 10, 14, 0, 0, 0).unwrap();
        let mined = mine(&source, &SearchConfig::default(), RecencyWindow::Week, now)
            .await
            .unwrap();

        assert_eq!(mined[0].label, ClassificationLabel::Meditation);
        assert_eq!(mined[1].label, ClassificationLabel::General);
        assert!(mined.iter().all(|m| m.window == RecencyWindow::Week));
        assert_eq!(
            *source.calls.lock().unwrap(),
            vec!["spirituality@2026-10-07T00:00:00Z".to_string()]
        );
    }

    #[tokio::test]
    async fn generate_requires_videos() {
        let generator = ScriptedGenerator::new(vec![]);
        let err = generate(&generator, &[], "30-40", None).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SeekerError>(),
            Some(SeekerError::NoVideos(_))
        ));
        assert!(generator.prompts().is_empty());
    }

    #[tokio::test]
    async fn untranslatable_response_keeps_no_collection() {
        let english = ThemeCollection {
            language: Language::English,
            themes: vec![crate::models::ThemeRecord::from_title("Stillness")],
            raw: String::new(),
            stage: Some(ParseStage::DirectArray),
        };
        let generator = ScriptedGenerator::new(vec!["Desculpe, não posso.".to_string()]);
        let (collection, outcome) = translate_collection(&generator, &english, Language::Portuguese)
            .await
            .unwrap();
        assert!(collection.is_none());
        assert_eq!(outcome.themes, english.themes);
        assert_eq!(outcome.raw, "Desculpe, não posso.");
    }
}
