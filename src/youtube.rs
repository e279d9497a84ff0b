//! YouTube Data API v3 video source.
//!
//! One mining run is two round trips: `search.list` ordered by view count
//! for ids, then `videos.list` for snippets and statistics. Results come
//! back sorted by view count, highest first.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use serde::Deserialize;
use std::time::Duration;

use crate::config::YouTubeConfig;
use crate::error::{credential, SeekerError, Service};
use crate::models::{RecencyWindow, VideoRecord};

/// `publishedAfter` timestamp for a window ending at `now`.
pub fn published_after(window: RecencyWindow, now: DateTime<Utc>) -> String {
    (now - ChronoDuration::days(window.days()))
        .format("%Y-%m-%dT%H:%M:%SZ")
        .to_string()
}

/// Anything that can list popular videos for a query.
#[async_trait]
pub trait VideoSource: Send + Sync {
    async fn popular_videos(
        &self,
        query: &str,
        max_results: u32,
        published_after: &str,
    ) -> Result<Vec<VideoRecord>>;
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Deserialize)]
struct SearchItem {
    id: SearchId,
}

#[derive(Deserialize)]
struct SearchId {
    #[serde(rename = "videoId")]
    video_id: Option<String>,
}

#[derive(Deserialize)]
struct VideosResponse {
    #[serde(default)]
    items: Vec<VideoItem>,
}

#[derive(Deserialize)]
struct VideoItem {
    id: String,
    snippet: Snippet,
    #[serde(default)]
    statistics: Statistics,
}

#[derive(Deserialize)]
struct Snippet {
    title: String,
    #[serde(default)]
    description: String,
    #[serde(rename = "channelTitle", default)]
    channel_title: String,
    #[serde(rename = "publishedAt", default)]
    published_at: String,
    #[serde(default)]
    thumbnails: Thumbnails,
}

#[derive(Deserialize, Default)]
struct Thumbnails {
    high: Option<Thumbnail>,
    default: Option<Thumbnail>,
}

#[derive(Deserialize)]
struct Thumbnail {
    url: String,
}

/// Counters arrive as decimal strings and may be hidden by the uploader.
#[derive(Deserialize, Default)]
struct Statistics {
    #[serde(rename = "viewCount")]
    view_count: Option<String>,
    #[serde(rename = "likeCount")]
    like_count: Option<String>,
    #[serde(rename = "commentCount")]
    comment_count: Option<String>,
}

fn counter(value: Option<&String>) -> u64 {
    value.and_then(|v| v.parse().ok()).unwrap_or(0)
}

impl From<VideoItem> for VideoRecord {
    fn from(item: VideoItem) -> Self {
        let thumbnails = item.snippet.thumbnails;
        VideoRecord {
            video_id: item.id,
            title: item.snippet.title,
            description: item.snippet.description,
            channel: item.snippet.channel_title,
            published_at: item.snippet.published_at,
            thumbnail: thumbnails.high.or(thumbnails.default).map(|t| t.url),
            view_count: counter(item.statistics.view_count.as_ref()),
            like_count: counter(item.statistics.like_count.as_ref()),
            comment_count: counter(item.statistics.comment_count.as_ref()),
        }
    }
}

pub struct YouTubeClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl YouTubeClient {
    pub fn new(config: &YouTubeConfig) -> Result<Self> {
        let api_key = credential(Service::YouTube, &config.api_key_env)?;
        Self::with_key(config, api_key)
    }

    pub fn with_key(config: &YouTubeConfig, api_key: String) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, &str)],
    ) -> Result<T, SeekerError> {
        let response = self
            .client
            .get(format!("{}/youtube/v3/{}", self.base_url, endpoint))
            .query(params)
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| SeekerError::transport(Service::YouTube, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SeekerError::Api {
                service: Service::YouTube,
                status: status.as_u16(),
                body,
            });
        }

        response
            .json()
            .await
            .map_err(|e| SeekerError::transport(Service::YouTube, e))
    }
}

#[async_trait]
impl VideoSource for YouTubeClient {
    async fn popular_videos(
        &self,
        query: &str,
        max_results: u32,
        published_after: &str,
    ) -> Result<Vec<VideoRecord>> {
        let max_results = max_results.clamp(1, 50).to_string();
        let search: SearchResponse = self
            .get_json(
                "search",
                &[
                    ("part", "id,snippet"),
                    ("q", query),
                    ("type", "video"),
                    ("order", "viewCount"),
                    ("publishedAfter", published_after),
                    ("maxResults", &max_results),
                ],
            )
            .await?;

        let ids: Vec<String> = search
            .items
            .into_iter()
            .filter_map(|item| item.id.video_id)
            .collect();
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let joined = ids.join(",");
        let details: VideosResponse = self
            .get_json("videos", &[("part", "snippet,statistics"), ("id", &joined)])
            .await?;

        let mut videos: Vec<VideoRecord> = details.items.into_iter().map(VideoRecord::from).collect();
        videos.sort_by(|a, b| b.view_count.cmp(&a.view_count));
        tracing::info!(count = videos.len(), query, published_after, "fetched videos");
        Ok(videos)
    }
}
