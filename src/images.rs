//! Illustrative image lookup for theme documents.
//!
//! A query is derived from the theme title plus a couple of randomly
//! sampled spiritual keywords, sent to a stock-photo endpoint, and the
//! result normalized to JPEG so the document assembler only handles one
//! format.

use anyhow::{Context, Result};
use async_trait::async_trait;
use image::GenericImageView;
use rand::seq::SliceRandom;
use rand::Rng;
use std::io::Cursor;
use std::time::Duration;

use crate::config::ImageConfig;
use crate::error::{SeekerError, Service};

const STOP_WORDS: [&str; 24] = [
    "the", "and", "of", "in", "to", "a", "is", "that", "it", "with", "as", "for", // en
    "o", "os", "de", "da", "do", "das", "dos", "em", "no", "na", "um", "uma", // pt
];

const SPIRITUAL_KEYWORDS: [&str; 20] = [
    "spiritual",
    "meditation",
    "abstract",
    "enlightenment",
    "mindfulness",
    "consciousness",
    "sacred",
    "divine",
    "cosmic",
    "transcendence",
    "wisdom",
    "harmony",
    "balance",
    "serenity",
    "energy",
    "light",
    "nature",
    "universe",
    "soul",
    "spirit",
];

/// A decoded image ready for embedding.
#[derive(Debug, Clone)]
pub struct ThemeImage {
    /// JPEG bytes.
    pub jpeg: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl ThemeImage {
    /// Decode any supported format and re-encode as JPEG.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let decoded = image::load_from_memory(bytes).context("Failed to decode image")?;
        let (width, height) = decoded.dimensions();
        let rgb = image::DynamicImage::ImageRgb8(decoded.to_rgb8());
        let mut jpeg = Vec::new();
        rgb.write_to(&mut Cursor::new(&mut jpeg), image::ImageOutputFormat::Jpeg(85))
            .context("Failed to encode image as JPEG")?;
        Ok(Self {
            jpeg,
            width,
            height,
        })
    }
}

/// Title words worth searching for: lower-cased, no stop words, longer than 3.
pub fn title_keywords(title: &str) -> Vec<String> {
    title
        .to_lowercase()
        .replace('-', " ")
        .split_whitespace()
        .filter(|w| !STOP_WORDS.contains(w) && w.chars().count() > 3)
        .map(str::to_string)
        .collect()
}

/// Build the image search query for a theme title.
///
/// Up to two title keywords plus two sampled keywords (three when the
/// title yields none), followed by `abstract art`.
pub fn image_query<R: Rng + ?Sized>(title: &str, rng: &mut R) -> String {
    let sampled: Vec<&str> = SPIRITUAL_KEYWORDS
        .choose_multiple(rng, 3)
        .copied()
        .collect();
    let title_words = title_keywords(title);

    let mut terms: Vec<String> = if title_words.is_empty() {
        sampled.iter().map(|s| s.to_string()).collect()
    } else {
        title_words
            .into_iter()
            .take(2)
            .chain(sampled.iter().take(2).map(|s| s.to_string()))
            .collect()
    };
    terms.push("abstract art".to_string());
    terms.join(" ")
}

/// Anything that can illustrate a theme title.
#[async_trait]
pub trait ImageSource: Send + Sync {
    async fn image_for(&self, title: &str) -> Result<ThemeImage>;
}

/// Stock-photo endpoint client.
pub struct ImageClient {
    client: reqwest::Client,
    base_url: String,
}

impl ImageClient {
    pub fn new(config: &ImageConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Search URL for a query, spaces encoded as `+`.
    pub fn search_url(&self, query: &str) -> String {
        format!("{}/1200x600/?{}", self.base_url, query.replace(' ', "+"))
    }

    /// Fetch one image for a theme title.
    pub async fn fetch_for_title(&self, title: &str) -> Result<ThemeImage> {
        let query = image_query(title, &mut rand::thread_rng());
        let url = self.search_url(&query);
        tracing::debug!(%url, "fetching theme image");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| SeekerError::transport(Service::Images, e))?;
        let status = response.status();
        if !status.is_success() {
            return Err(SeekerError::Api {
                service: Service::Images,
                status: status.as_u16(),
                body: String::new(),
            }
            .into());
        }
        let bytes = response
            .bytes()
            .await
            .map_err(|e| SeekerError::transport(Service::Images, e))?;
        ThemeImage::from_bytes(&bytes)
    }
}

#[async_trait]
impl ImageSource for ImageClient {
    async fn image_for(&self, title: &str) -> Result<ThemeImage> {
        self.fetch_for_title(title).await
    }
}
