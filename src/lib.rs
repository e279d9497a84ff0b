//! # Theme Seeker
//!
//! Lecture-theme generation from trending spirituality videos.
//!
//! Theme Seeker mines popular videos for a query over three recency
//! windows, tags each with a topical label, asks a generative-text
//! service for ten lecture themes aimed at an age cohort, recovers a
//! structured theme list from whatever the service returns, optionally
//! translates it, and exports the chosen themes as formatted `.docx`
//! documents.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐   ┌────────────┐   ┌────────────┐   ┌──────────┐
//! │ YouTube  │──▶│ Classifier │──▶│  Prompt    │──▶│  Gemini  │
//! │ search   │   │ (labels)   │   │  builder   │   │          │
//! └──────────┘   └────────────┘   └────────────┘   └────┬─────┘
//!                                                       │ raw text
//!                      ┌────────────┐   ┌────────────┐  ▼
//!                      │  Export    │◀──│ Translate  │◀─ Parser
//!                      │ docx / zip │   │ (optional) │  (cascade)
//!                      └────────────┘   └────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! seeker mine all                       # fetch and classify videos
//! seeker generate --cohort 30-40        # ten themes, plus Portuguese
//! seeker themes --lang pt
//! seeker export --lang pt --all --zip
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Core data types |
//! | [`error`] | Precondition and service error taxonomy |
//! | [`classify`] | Keyword topic classifier |
//! | [`prompt`] | Theme request builder |
//! | [`parse`] | Structured response parser cascade |
//! | [`translate`] | Translation adapter |
//! | [`llm`] | Generative-text provider abstraction |
//! | [`youtube`] | Video source |
//! | [`images`] | Theme illustration lookup |
//! | [`context`] | Domain-context loading |
//! | [`document`] | `.docx` assembly |
//! | [`archive`] | File naming and zip bundling |
//! | [`export`] | Batch export |
//! | [`session`] | Working state between commands |
//! | [`pipeline`] | Mine, generate, and translate steps |
//! | [`progress`] | Export progress reporting |
//! | [`commands`] | Command handlers for the `seeker` binary |

pub mod archive;
pub mod classify;
pub mod commands;
pub mod config;
pub mod context;
pub mod document;
pub mod error;
pub mod export;
pub mod images;
pub mod llm;
pub mod models;
pub mod parse;
pub mod pipeline;
pub mod progress;
pub mod prompt;
pub mod session;
pub mod translate;
pub mod youtube;
