//! Command handlers behind the `seeker` binary.
//!
//! Each `run_*` loads the session, performs one step, prints results on
//! stdout, and saves the session only when the step succeeded.

use anyhow::{bail, Context, Result};
use chrono::{Local, Utc};
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::context::{load_domain_context, preview};
use crate::export::{export_documents, ExportOptions};
use crate::images::{ImageClient, ImageSource};
use crate::llm::{GeminiGenerator, ScriptedGenerator, TextGenerator};
use crate::models::{Language, MinedVideo, RecencyWindow, ThemeRecord};
use crate::pipeline;
use crate::progress::{format_number, ProgressMode};
use crate::session::{Session, ThemeCollection, VideoSelection};
use crate::youtube::YouTubeClient;

/// Characters of a failed translation response echoed to the user.
const RAW_PREVIEW_CHARS: usize = 500;

pub async fn run_mine(config: &Config, windows: &[RecencyWindow]) -> Result<()> {
    let client = YouTubeClient::new(&config.youtube)?;
    let mut session = Session::load(&config.session.path)?;
    let now = Utc::now();

    for window in windows {
        let mined = pipeline::mine(&client, &config.search, *window, now).await?;
        println!(
            "{}: {} videos for \"{}\"",
            window.display_name(),
            mined.len(),
            config.search.query
        );
        print_videos(&mined);
        session.set_videos(*window, mined);
        // Saved per window so a later failure keeps earlier results.
        session.save(&config.session.path)?;
    }
    Ok(())
}

pub fn run_videos(config: &Config, selection: VideoSelection) -> Result<()> {
    let session = Session::load(&config.session.path)?;
    let videos = session.videos_for(selection)?;
    println!("{}: {} videos", selection, videos.len());
    print_videos(&videos);
    Ok(())
}

fn print_videos(videos: &[MinedVideo]) {
    for (i, mined) in videos.iter().enumerate() {
        let video = &mined.video;
        println!();
        println!("{}. {}", i + 1, video.title);
        println!(
            "   {} | {} views | {}",
            mined.label,
            format_number(video.view_count),
            video.channel
        );
        println!("   {}", video.watch_url());
    }
}

pub fn run_context(config: &Config) -> Result<()> {
    let path = config
        .context
        .path
        .as_ref()
        .context("No context file configured; set [context].path")?;
    match load_domain_context(path)? {
        Some(text) => {
            println!("{} ({} characters)", path.display(), text.chars().count());
            println!();
            println!("{}", preview(&text));
        }
        None => println!("{} contains no text.", path.display()),
    }
    Ok(())
}

pub struct GenerateArgs {
    pub cohort: String,
    pub source: VideoSelection,
    pub translate: bool,
    /// Parse a saved response instead of calling the service.
    pub response_file: Option<PathBuf>,
}

pub async fn run_generate(config: &Config, args: GenerateArgs) -> Result<()> {
    let mut session = Session::load(&config.session.path)?;
    let videos = session.videos_for(args.source)?;
    let domain_context = match &config.context.path {
        Some(path) => load_domain_context(path)?,
        None => None,
    };

    let generator: Box<dyn TextGenerator> = match &args.response_file {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read response file: {}", path.display()))?;
            Box::new(ScriptedGenerator::new(vec![raw]))
        }
        None => Box::new(GeminiGenerator::connect(&config.generation).await?),
    };

    let collection = pipeline::generate(
        generator.as_ref(),
        &videos,
        &args.cohort,
        domain_context.as_deref(),
    )
    .await?;
    println!(
        "Generated {} themes for ages {} from {} videos (model {}, parsed via {})",
        collection.themes.len(),
        args.cohort,
        videos.len(),
        generator.model_name(),
        collection
            .stage
            .map(|s| s.to_string())
            .unwrap_or_else(|| "-".to_string()),
    );
    print_titles(&collection);

    let english = collection.clone();
    session.set_generated(collection);
    session.save(&config.session.path)?;

    if args.translate {
        if args.response_file.is_some() {
            println!();
            println!("Translation skipped for a saved response; run `seeker translate`.");
        } else {
            translate_and_store(
                generator.as_ref(),
                &english,
                Language::Portuguese,
                &mut session,
                &config.session.path,
            )
            .await?;
        }
    }
    Ok(())
}

pub async fn run_translate(config: &Config, target: Language) -> Result<()> {
    if target == Language::English {
        bail!("Themes are generated in English; choose another target language");
    }
    let mut session = Session::load(&config.session.path)?;
    let english = session.themes_for(Language::English)?.clone();
    let generator = GeminiGenerator::connect(&config.generation).await?;
    translate_and_store(&generator, &english, target, &mut session, &config.session.path).await
}

async fn translate_and_store(
    generator: &dyn TextGenerator,
    english: &ThemeCollection,
    target: Language,
    session: &mut Session,
    session_path: &Path,
) -> Result<()> {
    let (collection, outcome) = pipeline::translate_collection(generator, english, target).await?;
    println!();
    match collection {
        Some(translated) => {
            println!("Translated {} themes to {}", translated.themes.len(), target);
            print_titles(&translated);
            session.set_translated(translated);
            session.save(session_path)?;
        }
        None => {
            let raw: String = outcome.raw.chars().take(RAW_PREVIEW_CHARS).collect();
            eprintln!("Translation to {} failed; themes remain in English.", target);
            eprintln!("Response: {}", raw);
        }
    }
    Ok(())
}

fn print_titles(collection: &ThemeCollection) {
    for (i, title) in collection.titles().iter().enumerate() {
        println!("  {}. {}", i + 1, title);
    }
}

struct Headings {
    description: &'static str,
    teaser: &'static str,
    age_resonance: &'static str,
    philosophical_connection: &'static str,
    lecture_outline: &'static str,
    full_text: &'static str,
}

fn headings(language: Language) -> Headings {
    match language {
        Language::English => Headings {
            description: "Description",
            teaser: "Teaser",
            age_resonance: "Age Group Resonance",
            philosophical_connection: "Philosophical Connection",
            lecture_outline: "Lecture Outline",
            full_text: "Full Text",
        },
        Language::Portuguese => Headings {
            description: "Descrição",
            teaser: "Chamada",
            age_resonance: "Ressonância com a Faixa Etária",
            philosophical_connection: "Conexão Filosófica",
            lecture_outline: "Estrutura da Palestra",
            full_text: "Texto Completo",
        },
    }
}

pub fn run_themes(config: &Config, language: Language, full: bool) -> Result<()> {
    let session = Session::load(&config.session.path)?;
    let collection = session.themes_for(language)?;
    let h = headings(language);

    for (i, theme) in collection.themes.iter().enumerate() {
        println!("{}. {}", i + 1, theme.display_title(i, language));
        print_field(h.description, theme.description.as_deref());
        print_field(h.teaser, theme.teaser.as_deref());
        if full {
            print_field(h.age_resonance, theme.age_resonance.as_deref());
            print_field(
                h.philosophical_connection,
                theme.philosophical_connection.as_deref(),
            );
            print_field(h.lecture_outline, theme.lecture_outline.as_deref());
            print_field(h.full_text, theme.full_text.as_deref());
        }
        println!();
    }
    Ok(())
}

fn print_field(heading: &str, value: Option<&str>) {
    if let Some(value) = value.filter(|v| !v.trim().is_empty()) {
        if value.contains('\n') {
            println!("   {}:", heading);
            for line in value.lines() {
                println!("     {}", line);
            }
        } else {
            println!("   {}: {}", heading, value);
        }
    }
}

pub struct ExportArgs {
    pub language: Language,
    pub select: Vec<String>,
    pub all: bool,
    pub archive: bool,
    pub output: Option<PathBuf>,
    pub progress: ProgressMode,
}

pub async fn run_export(config: &Config, args: ExportArgs) -> Result<()> {
    let session = Session::load(&config.session.path)?;
    let collection = session.themes_for(args.language)?;
    let themes: Vec<ThemeRecord> = if args.all {
        collection.select_all()?
    } else {
        collection.select(&args.select)?
    };

    let images = if config.images.enabled {
        Some(ImageClient::new(&config.images)?)
    } else {
        None
    };
    let output_dir = args.output.as_deref().unwrap_or(&config.export.output_dir);
    let options = ExportOptions {
        language: args.language,
        date: Local::now().date_naive(),
        branding: &config.export.branding,
        output_dir,
        archive: args.archive,
    };

    let reporter = args.progress.reporter();
    let report = export_documents(
        &themes,
        &options,
        images.as_ref().map(|c| c as &dyn ImageSource),
        reporter.as_ref(),
    )
    .await?;

    for path in &report.files {
        println!("{}", path.display());
    }
    println!(
        "{} documents written, {} failed",
        report.written.len(),
        report.failed.len()
    );
    if !report.is_complete() {
        eprintln!("Failed: {}", report.failed.join(", "));
    }
    if !report.image_failures.is_empty() {
        eprintln!("Exported without image: {}", report.image_failures.join(", "));
    }
    if report.written.is_empty() {
        bail!("No documents could be assembled");
    }
    Ok(())
}

pub fn run_reset(config: &Config) -> Result<()> {
    if Session::reset(&config.session.path)? {
        println!("Session cleared: {}", config.session.path.display());
    } else {
        println!("No session to clear.");
    }
    Ok(())
}
