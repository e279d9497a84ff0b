//! # Theme Seeker CLI (`seeker`)
//!
//! The `seeker` binary drives the whole workflow: mining videos,
//! generating and translating lecture themes, and exporting documents.
//! State is kept in a session file between invocations.
//!
//! ## Usage
//!
//! ```bash
//! seeker --config ./config/seeker.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `seeker mine <window>` | Fetch and classify popular videos (`week`, `month`, `half-year`, `all`) |
//! | `seeker videos` | List mined videos for a window or the combined set |
//! | `seeker context` | Preview the loaded domain context |
//! | `seeker generate --cohort <key>` | Generate ten themes, then translate to Portuguese |
//! | `seeker translate` | Translate the English themes |
//! | `seeker themes` | Show the current themes |
//! | `seeker export` | Write selected themes as `.docx` files or one `.zip` |
//! | `seeker reset` | Delete the session file |
//!
//! ## Environment
//!
//! `YOUTUBE_API_KEY` and `GEMINI_API_KEY` hold the service credentials
//! (names configurable). `RUST_LOG` controls diagnostics on stderr.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use theme_seeker::commands::{self, ExportArgs, GenerateArgs};
use theme_seeker::config;
use theme_seeker::models::{Language, RecencyWindow};
use theme_seeker::progress::ProgressMode;
use theme_seeker::prompt::COHORTS;
use theme_seeker::session::VideoSelection;

/// Theme Seeker CLI: lecture themes from trending spirituality videos.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. Without one, built-in defaults are used.
#[derive(Parser)]
#[command(
    name = "seeker",
    about = "Theme Seeker: lecture themes from trending spirituality videos",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/seeker.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch popular videos for a recency window and classify them.
    Mine {
        /// `week`, `month`, `half-year`, or `all`.
        window: String,
    },

    /// List mined videos.
    Videos {
        /// `week`, `month`, `half-year`, or `combined`.
        #[arg(long, default_value = "combined")]
        source: VideoSelection,
    },

    /// Preview the domain context file.
    Context,

    /// Generate ten lecture themes for an age cohort.
    ///
    /// Themes are translated to Portuguese right after generation unless
    /// `--no-translate` is given.
    Generate {
        /// Age cohort key.
        #[arg(long, value_parser = clap::builder::PossibleValuesParser::new(COHORTS))]
        cohort: String,

        /// Videos to draw from: `week`, `month`, `half-year`, or `combined`.
        #[arg(long, default_value = "combined")]
        source: VideoSelection,

        /// Keep the themes in English only.
        #[arg(long)]
        no_translate: bool,

        /// Parse a saved service response instead of calling the service.
        #[arg(long)]
        response_file: Option<PathBuf>,
    },

    /// Translate the current English themes.
    Translate {
        #[arg(long, default_value = "pt")]
        lang: Language,
    },

    /// Show the current themes.
    Themes {
        #[arg(long, default_value = "en")]
        lang: Language,

        /// Include resonance, connection, outline, and full text.
        #[arg(long)]
        full: bool,
    },

    /// Export themes as Word documents.
    Export {
        #[arg(long, default_value = "en")]
        lang: Language,

        /// Theme title to export (repeatable, at most 10 are used).
        #[arg(long = "select")]
        select: Vec<String>,

        /// Export every theme (first 10).
        #[arg(long, conflicts_with = "select")]
        all: bool,

        /// Bundle the documents into one zip archive.
        #[arg(long)]
        zip: bool,

        /// Output directory; overrides `[export].output_dir`.
        #[arg(long)]
        output: Option<PathBuf>,

        /// Progress on stderr: `off`, `human`, or `json`. Defaults to
        /// human when stderr is a terminal.
        #[arg(long)]
        progress: Option<ProgressMode>,
    },

    /// Delete the session file.
    Reset,
}

fn parse_windows(window: &str) -> Result<Vec<RecencyWindow>, String> {
    if window.eq_ignore_ascii_case("all") {
        Ok(RecencyWindow::ALL.to_vec())
    } else {
        window.parse().map(|w| vec![w])
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let cfg = config::load_or_minimal(&cli.config)?;

    match cli.command {
        Commands::Mine { window } => {
            let windows = parse_windows(&window).map_err(anyhow::Error::msg)?;
            commands::run_mine(&cfg, &windows).await?;
        }
        Commands::Videos { source } => {
            commands::run_videos(&cfg, source)?;
        }
        Commands::Context => {
            commands::run_context(&cfg)?;
        }
        Commands::Generate {
            cohort,
            source,
            no_translate,
            response_file,
        } => {
            commands::run_generate(
                &cfg,
                GenerateArgs {
                    cohort,
                    source,
                    translate: !no_translate,
                    response_file,
                },
            )
            .await?;
        }
        Commands::Translate { lang } => {
            commands::run_translate(&cfg, lang).await?;
        }
        Commands::Themes { lang, full } => {
            commands::run_themes(&cfg, lang, full)?;
        }
        Commands::Export {
            lang,
            select,
            all,
            zip,
            output,
            progress,
        } => {
            commands::run_export(
                &cfg,
                ExportArgs {
                    language: lang,
                    select,
                    all,
                    archive: zip,
                    output,
                    progress: progress.unwrap_or_else(ProgressMode::default_for_tty),
                },
            )
            .await?;
        }
        Commands::Reset => {
            commands::run_reset(&cfg)?;
        }
    }

    Ok(())
}
