use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub youtube: YouTubeConfig,
    #[serde(default)]
    pub generation: GenerationConfig,
    #[serde(default)]
    pub images: ImageConfig,
    #[serde(default)]
    pub export: ExportConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub context: ContextConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SearchConfig {
    #[serde(default = "default_query")]
    pub query: String,
    #[serde(default = "default_max_results")]
    pub max_results: u32,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            query: default_query(),
            max_results: default_max_results(),
        }
    }
}

fn default_query() -> String {
    "spirituality".to_string()
}
fn default_max_results() -> u32 {
    25
}

#[derive(Debug, Deserialize, Clone)]
pub struct YouTubeConfig {
    #[serde(default = "default_youtube_url")]
    pub base_url: String,
    #[serde(default = "default_youtube_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for YouTubeConfig {
    fn default() -> Self {
        Self {
            base_url: default_youtube_url(),
            api_key_env: default_youtube_key_env(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_youtube_url() -> String {
    "https://www.googleapis.com".to_string()
}
fn default_youtube_key_env() -> String {
    "YOUTUBE_API_KEY".to_string()
}
fn default_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Deserialize, Clone)]
pub struct GenerationConfig {
    #[serde(default = "default_gemini_url")]
    pub base_url: String,
    #[serde(default = "default_gemini_key_env")]
    pub api_key_env: String,
    /// Picked when any listed model name contains it.
    #[serde(default = "default_model")]
    pub preferred_model: String,
    /// Second choice: any listed model whose name contains this.
    #[serde(default = "default_model_family")]
    pub model_family: String,
    /// Used when listing fails or nothing matches.
    #[serde(default = "default_model")]
    pub fallback_model: String,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_generation_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            base_url: default_gemini_url(),
            api_key_env: default_gemini_key_env(),
            preferred_model: default_model(),
            model_family: default_model_family(),
            fallback_model: default_model(),
            max_retries: default_max_retries(),
            timeout_secs: default_generation_timeout_secs(),
        }
    }
}

fn default_gemini_url() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}
fn default_gemini_key_env() -> String {
    "GEMINI_API_KEY".to_string()
}
fn default_model() -> String {
    "gemini-2.0-flash".to_string()
}
fn default_model_family() -> String {
    "gemini".to_string()
}
fn default_max_retries() -> u32 {
    3
}
fn default_generation_timeout_secs() -> u64 {
    120
}

#[derive(Debug, Deserialize, Clone)]
pub struct ImageConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_image_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: default_image_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_true() -> bool {
    true
}
fn default_image_url() -> String {
    "https://source.unsplash.com".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct ExportConfig {
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    #[serde(default = "default_branding")]
    pub branding: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            branding: default_branding(),
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("./out")
}
fn default_branding() -> String {
    "ROSACRUZ ÁUREA | LECTORIUM ROSICRUCIANUM".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct SessionConfig {
    #[serde(default = "default_session_path")]
    pub path: PathBuf,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            path: default_session_path(),
        }
    }
}

fn default_session_path() -> PathBuf {
    PathBuf::from("./data/session.json")
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ContextConfig {
    /// HTML or plain-text file describing the school of thought.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl Config {
    /// Defaults for every section, used when no config file exists.
    pub fn minimal() -> Self {
        Self::default()
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    validate(&config)?;
    Ok(config)
}

/// Load `path` if it exists, otherwise fall back to [`Config::minimal`].
pub fn load_or_minimal(path: &Path) -> Result<Config> {
    if path.exists() {
        load_config(path)
    } else {
        tracing::debug!(path = %path.display(), "config file not found; using defaults");
        Ok(Config::minimal())
    }
}

fn validate(config: &Config) -> Result<()> {
    // Validate search
    if config.search.query.trim().is_empty() {
        anyhow::bail!("search.query must not be empty");
    }
    if !(1..=50).contains(&config.search.max_results) {
        anyhow::bail!("search.max_results must be in [1, 50]");
    }

    // Validate generation
    if config.generation.fallback_model.trim().is_empty() {
        anyhow::bail!("generation.fallback_model must not be empty");
    }
    if config.generation.timeout_secs == 0 || config.youtube.timeout_secs == 0 {
        anyhow::bail!("timeout_secs must be > 0");
    }

    for (name, url) in [
        ("youtube.base_url", &config.youtube.base_url),
        ("generation.base_url", &config.generation.base_url),
        ("images.base_url", &config.images.base_url),
    ] {
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            anyhow::bail!("{} must be an http(s) URL, got '{}'", name, url);
        }
    }

    Ok(())
}
