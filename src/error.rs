//! Error taxonomy for Theme Seeker.
//!
//! Parse failures never show up here: the response parser recovers
//! locally (see [`crate::parse`]). What remains are precondition
//! failures, raised before any network call, and transport or API
//! failures from the three external services.

use thiserror::Error;

/// The external services Theme Seeker talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Service {
    YouTube,
    Gemini,
    Images,
}

impl std::fmt::Display for Service {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Service::YouTube => "YouTube Data API",
            Service::Gemini => "Gemini API",
            Service::Images => "image search",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum SeekerError {
    /// The environment variable holding a service credential is unset or empty.
    #[error("{service} credential missing: set the {env_var} environment variable")]
    MissingCredential { service: Service, env_var: String },

    #[error("no videos available for {0}; run `seeker mine` first")]
    NoVideos(String),

    #[error("no themes available; run `seeker generate` first")]
    NoThemes,

    #[error("no themes selected: pass --select <TITLE> or --all")]
    NoSelection,

    #[error("{service} request failed: {source}")]
    Transport {
        service: Service,
        #[source]
        source: reqwest::Error,
    },

    #[error("{service} returned HTTP {status}: {body}")]
    Api {
        service: Service,
        status: u16,
        body: String,
    },

    #[error("{service} returned an unexpected payload: {detail}")]
    Payload { service: Service, detail: String },
}

impl SeekerError {
    pub fn transport(service: Service, source: reqwest::Error) -> Self {
        SeekerError::Transport { service, source }
    }

    /// Whether retrying the same request may succeed (rate limits, 5xx, network).
    pub fn is_retryable(&self) -> bool {
        match self {
            SeekerError::Transport { .. } => true,
            SeekerError::Api { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

/// Read a credential from the environment, treating an empty value as unset.
pub fn credential(service: Service, env_var: &str) -> Result<String, SeekerError> {
    match std::env::var(env_var) {
        Ok(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(SeekerError::MissingCredential {
            service,
            env_var: env_var.to_string(),
        }),
    }
}
