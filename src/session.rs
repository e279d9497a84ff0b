//! Working state carried between `seeker` invocations.
//!
//! A [`Session`] is loaded at the start of a command, replaced wholesale
//! by whichever step runs, and written back. Mined videos are kept per
//! recency window; themes are kept as an English collection plus an
//! optional translated collection aligned to it by position.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use std::str::FromStr;

use crate::error::SeekerError;
use crate::models::{clean_title, Language, MinedVideo, RecencyWindow, ThemeRecord};
use crate::parse::ParseStage;

/// At most this many themes are exported per selection.
pub const MAX_SELECTION: usize = 10;

/// Which mined videos feed generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VideoSelection {
    Window(RecencyWindow),
    /// All windows merged, deduplicated by video id.
    Combined,
}

impl FromStr for VideoSelection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("combined") || s.eq_ignore_ascii_case("all") {
            return Ok(VideoSelection::Combined);
        }
        s.parse().map(VideoSelection::Window)
    }
}

impl std::fmt::Display for VideoSelection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VideoSelection::Window(w) => f.write_str(w.display_name()),
            VideoSelection::Combined => f.write_str("Combined"),
        }
    }
}

/// Themes in one language, with the raw completion they were parsed from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThemeCollection {
    pub language: Language,
    pub themes: Vec<ThemeRecord>,
    /// Raw service response, kept for inspection.
    #[serde(default)]
    pub raw: String,
    /// Cascade stage that produced `themes`.
    #[serde(default)]
    pub stage: Option<ParseStage>,
}

impl ThemeCollection {
    /// Cleaned display titles, positional placeholders for untitled themes.
    pub fn titles(&self) -> Vec<String> {
        self.themes
            .iter()
            .enumerate()
            .map(|(i, t)| t.display_title(i, self.language))
            .collect()
    }

    /// Themes whose cleaned title matches one of `requested`, in the
    /// order requested. Repeated and unknown titles are skipped, the
    /// latter with a warning.
    pub fn select(&self, requested: &[String]) -> Result<Vec<ThemeRecord>, SeekerError> {
        let titles = self.titles();
        let mut asked = HashSet::new();
        let mut selected = Vec::new();

        for name in requested.iter().map(|t| clean_title(t)) {
            if !asked.insert(name.clone()) {
                continue;
            }
            let before = selected.len();
            selected.extend(
                self.themes
                    .iter()
                    .zip(titles.iter())
                    .filter(|(_, title)| **title == name)
                    .map(|(theme, _)| theme.clone()),
            );
            if selected.len() == before {
                tracing::warn!(title = %name, "no theme with this title");
            }
        }

        if selected.is_empty() {
            return Err(SeekerError::NoSelection);
        }
        if selected.len() > MAX_SELECTION {
            tracing::warn!(
                selected = selected.len(),
                "selection capped at {}",
                MAX_SELECTION
            );
        }
        Ok(selected.into_iter().take(MAX_SELECTION).collect())
    }

    /// The first [`MAX_SELECTION`] themes.
    pub fn select_all(&self) -> Result<Vec<ThemeRecord>, SeekerError> {
        if self.themes.is_empty() {
            return Err(SeekerError::NoSelection);
        }
        Ok(self.themes.iter().take(MAX_SELECTION).cloned().collect())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Session {
    #[serde(default)]
    pub week: Vec<MinedVideo>,
    #[serde(default)]
    pub month: Vec<MinedVideo>,
    #[serde(default)]
    pub half_year: Vec<MinedVideo>,
    #[serde(default)]
    pub english: Option<ThemeCollection>,
    #[serde(default)]
    pub translated: Option<ThemeCollection>,
}

impl Session {
    /// Load from `path`; a missing file is an empty session.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read session file: {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse session file: {}", path.display()))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create session directory: {}", parent.display())
                })?;
            }
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write session file: {}", path.display()))
    }

    /// Delete the session file. Returns whether one existed.
    pub fn reset(path: &Path) -> Result<bool> {
        if !path.exists() {
            return Ok(false);
        }
        std::fs::remove_file(path)
            .with_context(|| format!("Failed to remove session file: {}", path.display()))?;
        Ok(true)
    }

    pub fn videos(&self, window: RecencyWindow) -> &[MinedVideo] {
        match window {
            RecencyWindow::Week => &self.week,
            RecencyWindow::Month => &self.month,
            RecencyWindow::HalfYear => &self.half_year,
        }
    }

    /// Replace the videos mined for `window`.
    pub fn set_videos(&mut self, window: RecencyWindow, videos: Vec<MinedVideo>) {
        match window {
            RecencyWindow::Week => self.week = videos,
            RecencyWindow::Month => self.month = videos,
            RecencyWindow::HalfYear => self.half_year = videos,
        }
    }

    /// All windows merged in week, month, half-year order; the first
    /// occurrence of a video id wins.
    pub fn combined(&self) -> Vec<MinedVideo> {
        let mut seen = HashSet::new();
        RecencyWindow::ALL
            .iter()
            .flat_map(|w| self.videos(*w).iter())
            .filter(|v| seen.insert(v.video.video_id.clone()))
            .cloned()
            .collect()
    }

    pub fn videos_for(&self, selection: VideoSelection) -> Result<Vec<MinedVideo>, SeekerError> {
        let videos = match selection {
            VideoSelection::Window(w) => self.videos(w).to_vec(),
            VideoSelection::Combined => self.combined(),
        };
        if videos.is_empty() {
            return Err(SeekerError::NoVideos(selection.to_string()));
        }
        Ok(videos)
    }

    /// Replace the English collection. The old translation no longer
    /// lines up with it and is dropped.
    pub fn set_generated(&mut self, collection: ThemeCollection) {
        self.english = Some(collection);
        self.translated = None;
    }

    pub fn set_translated(&mut self, collection: ThemeCollection) {
        self.translated = Some(collection);
    }

    pub fn themes_for(&self, language: Language) -> Result<&ThemeCollection, SeekerError> {
        let collection = match language {
            Language::English => self.english.as_ref(),
            Language::Portuguese => self.translated.as_ref(),
        };
        collection
            .filter(|c| !c.themes.is_empty())
            .ok_or(SeekerError::NoThemes)
    }
}
