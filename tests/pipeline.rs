//! Library-level scenarios: scripted generation end to end, and the
//! YouTube and Gemini adapters against mock HTTP servers.

use chrono::{NaiveDate, TimeZone, Utc};
use serde_json::json;
use std::io::{Cursor, Read};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use theme_seeker::config::{GenerationConfig, SearchConfig, YouTubeConfig};
use theme_seeker::error::SeekerError;
use theme_seeker::export::assemble_batch;
use theme_seeker::llm::{GeminiGenerator, ScriptedGenerator, TextGenerator};
use theme_seeker::models::{ClassificationLabel, Language, RecencyWindow};
use theme_seeker::parse::ParseStage;
use theme_seeker::pipeline;
use theme_seeker::progress::NoProgress;
use theme_seeker::session::{Session, VideoSelection};
use theme_seeker::youtube::{VideoSource, YouTubeClient};

fn ten_themes(lang_prefix: &str) -> String {
    let themes: Vec<serde_json::Value> = (1..=10)
        .map(|i| {
            json!({
                "title": format!("{} {}", lang_prefix, i),
                "description": "d",
                "age_resonance": "a",
                "philosophical_connection": "p",
                "lecture_outline": "o",
                "teaser": "t",
                "full_text": format!("{} body {}.\n\nSecond paragraph.", lang_prefix, i)
            })
        })
        .collect();
    serde_json::to_string(&themes).unwrap()
}

fn youtube_config(server: &MockServer) -> YouTubeConfig {
    YouTubeConfig {
        base_url: server.uri(),
        ..Default::default()
    }
}

fn generation_config(server: &MockServer) -> GenerationConfig {
    GenerationConfig {
        base_url: server.uri(),
        ..Default::default()
    }
}

fn completion(text: &str) -> serde_json::Value {
    json!({"candidates": [{"content": {"parts": [{"text": text}]}}]})
}

#[tokio::test]
async fn scripted_session_runs_mine_generate_translate_export() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/youtube/v3/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{"id": {"videoId": "v1"}}, {"id": {"videoId": "v2"}}]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/youtube/v3/videos"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [
                {"id": "v1", "snippet": {"title": "Zen and the Art of Letting Go"}, "statistics": {"viewCount": "10"}},
                {"id": "v2", "snippet": {"title": "Near Death Stories", "description": "afterlife accounts"}, "statistics": {"viewCount": "20"}}
            ]
        })))
        .mount(&server)
        .await;

    let client = YouTubeClient::with_key(&youtube_config(&server), "yt-key".to_string()).unwrap();
    let now = Utc.with_ymd_and_hms(2026, 10, 14, 9, 0, 0).unwrap();
    let mined = pipeline::mine(&client, &SearchConfig::default(), RecencyWindow::Month, now)
        .await
        .unwrap();
    assert_eq!(mined[0].video.video_id, "v2");
    assert_eq!(mined[0].label, ClassificationLabel::Afterlife);
    assert_eq!(mined[1].label, ClassificationLabel::EasternPhilosophy);

    let mut session = Session::default();
    session.set_videos(RecencyWindow::Month, mined);
    let videos = session.videos_for(VideoSelection::Combined).unwrap();

    let generator = ScriptedGenerator::new(vec![
        format!("Themes [draft]:\n```json\n{}\n```", ten_themes("Theme")),
        ten_themes("Tema"),
    ]);
    let english = pipeline::generate(&generator, &videos, "30-40", Some("Rosicrucian school"))
        .await
        .unwrap();
    assert_eq!(english.themes.len(), 10);
    assert_eq!(english.stage, Some(ParseStage::FencedBlock));

    let (translated, _outcome) =
        pipeline::translate_collection(&generator, &english, Language::Portuguese)
            .await
            .unwrap();
    let translated = translated.expect("translation should parse");
    assert_eq!(translated.language, Language::Portuguese);
    assert_eq!(translated.themes[0].title.as_deref(), Some("Tema 1"));

    let prompts = generator.prompts();
    assert!(prompts[0].contains("- Near Death Stories (Afterlife exploration)"));
    assert!(prompts[0].contains("Rosicrucian school"));
    assert!(prompts[1].contains("\"title\": \"Theme 1\""));

    session.set_generated(english);
    session.set_translated(translated);
    let selected = session
        .themes_for(Language::Portuguese)
        .unwrap()
        .select(&["Tema 2".to_string(), "Tema 5".to_string()])
        .unwrap();

    let date = NaiveDate::from_ymd_opt(2026, 10, 14).unwrap();
    let (documents, report) = assemble_batch(
        &selected,
        Language::Portuguese,
        date,
        "BRAND",
        None,
        &NoProgress,
    )
    .await;
    assert!(report.is_complete());
    assert_eq!(
        report.written,
        vec!["Tema_2_pt_20261014.docx", "Tema_5_pt_20261014.docx"]
    );

    let mut archive = zip::ZipArchive::new(Cursor::new(documents[0].1.as_slice())).unwrap();
    let mut xml = String::new();
    archive
        .by_name("word/document.xml")
        .unwrap()
        .read_to_string(&mut xml)
        .unwrap();
    assert!(xml.contains("OUTUBRO 2026"));
    assert!(xml.contains("Tema body 2."));
    assert!(xml.contains("Second paragraph."));
}

#[tokio::test]
async fn youtube_search_then_details_sorted_by_views() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/youtube/v3/search"))
        .and(query_param("q", "meditation"))
        .and(query_param("order", "viewCount"))
        .and(query_param("maxResults", "50"))
        .and(query_param("publishedAfter", "2026-10-07T00:00:00Z"))
        .and(query_param("key", "yt-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [
                {"id": {"videoId": "low"}},
                {"id": {"kind": "youtube#channel"}},
                {"id": {"videoId": "high"}}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/youtube/v3/videos"))
        .and(query_param("id", "low,high"))
        .and(query_param("part", "snippet,statistics"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [
                {"id": "low", "snippet": {"title": "Low", "channelTitle": "A"}, "statistics": {"viewCount": "5"}},
                {"id": "high", "snippet": {"title": "High", "channelTitle": "B",
                    "thumbnails": {"high": {"url": "https://i.ytimg.com/h.jpg"}}},
                 "statistics": {"viewCount": "900", "likeCount": "12", "commentCount": "3"}}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = YouTubeClient::with_key(&youtube_config(&server), "yt-key".to_string()).unwrap();
    let videos = client
        .popular_videos("meditation", 80, "2026-10-07T00:00:00Z")
        .await
        .unwrap();

    let ids: Vec<&str> = videos.iter().map(|v| v.video_id.as_str()).collect();
    assert_eq!(ids, vec!["high", "low"]);
    assert_eq!(videos[0].like_count, 12);
    assert_eq!(videos[0].thumbnail.as_deref(), Some("https://i.ytimg.com/h.jpg"));
}

#[tokio::test]
async fn youtube_empty_search_skips_details() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/youtube/v3/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"items": []})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/youtube/v3/videos"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"items": []})))
        .expect(0)
        .mount(&server)
        .await;

    let client = YouTubeClient::with_key(&youtube_config(&server), "k".to_string()).unwrap();
    let videos = client.popular_videos("q", 5, "2026-01-01T00:00:00Z").await.unwrap();
    assert!(videos.is_empty());
}

#[tokio::test]
async fn youtube_http_error_is_typed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/youtube/v3/search"))
        .respond_with(ResponseTemplate::new(403).set_body_string("quotaExceeded"))
        .mount(&server)
        .await;

    let client = YouTubeClient::with_key(&youtube_config(&server), "k".to_string()).unwrap();
    let err = client
        .popular_videos("q", 5, "2026-01-01T00:00:00Z")
        .await
        .unwrap_err();
    match err.downcast_ref::<SeekerError>() {
        Some(SeekerError::Api { status, body, .. }) => {
            assert_eq!(*status, 403);
            assert_eq!(body, "quotaExceeded");
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn gemini_selects_listed_model_and_generates() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1beta/models"))
        .and(query_param("key", "gm-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "models": [
                {"name": "models/embedding-001"},
                {"name": "models/gemini-2.0-flash-001"}
            ]
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-2.0-flash-001:generateContent"))
        .and(query_param("key", "gm-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("[{\"title\": \"A\"}]")))
        .expect(1)
        .mount(&server)
        .await;

    let generator = GeminiGenerator::connect_with_key(&generation_config(&server), "gm-key".to_string())
        .await
        .unwrap();
    assert_eq!(generator.model_name(), "models/gemini-2.0-flash-001");
    assert_eq!(generator.generate("hello").await.unwrap(), "[{\"title\": \"A\"}]");
}

#[tokio::test]
async fn gemini_listing_failure_uses_fallback_model() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1beta/models"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-2.0-flash:generateContent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("ok")))
        .mount(&server)
        .await;

    let generator = GeminiGenerator::connect_with_key(&generation_config(&server), "k".to_string())
        .await
        .unwrap();
    assert_eq!(generator.model_name(), "models/gemini-2.0-flash");
    assert_eq!(generator.generate("hello").await.unwrap(), "ok");
}

#[tokio::test]
async fn gemini_client_error_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1beta/models"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"models": []})))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-2.0-flash:generateContent"))
        .respond_with(ResponseTemplate::new(400).set_body_string("API key not valid"))
        .expect(1)
        .mount(&server)
        .await;

    let generator = GeminiGenerator::connect_with_key(&generation_config(&server), "bad".to_string())
        .await
        .unwrap();
    let err = generator.generate("hello").await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<SeekerError>(),
        Some(SeekerError::Api { status: 400, .. })
    ));
}

#[tokio::test]
async fn gemini_retries_server_errors() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1beta/models"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"models": []})))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-2.0-flash:generateContent"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-2.0-flash:generateContent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("recovered")))
        .expect(1)
        .mount(&server)
        .await;

    let generator = GeminiGenerator::connect_with_key(&generation_config(&server), "k".to_string())
        .await
        .unwrap();
    assert_eq!(generator.generate("hello").await.unwrap(), "recovered");
}
