//! Batch export of selected themes to `.docx` files or one `.zip`.
//!
//! Themes are processed strictly in order: one image lookup and one
//! assembly per theme. A failed image lookup is recorded and the document
//! is produced without an illustration; a failed assembly skips the theme.
//! Both are listed in the [`BatchReport`] and the batch always continues.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::archive::{archive_filename, build_archive, claim_name, document_filename};
use crate::document::{assemble, placeholder_title};
use crate::images::{ImageSource, ThemeImage};
use crate::models::{clean_title, Language, ThemeRecord};
use crate::progress::{ExportProgressEvent, ExportProgressReporter};

/// Per-item outcome of a batch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchReport {
    /// Document file names produced, in selection order.
    pub written: Vec<String>,
    /// Titles whose documents could not be assembled.
    pub failed: Vec<String>,
    /// Titles exported without an image because the lookup failed.
    pub image_failures: Vec<String>,
    /// Paths created on disk: one per document, or the archive.
    pub files: Vec<PathBuf>,
}

impl BatchReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

pub struct ExportOptions<'a> {
    pub language: Language,
    pub date: NaiveDate,
    pub branding: &'a str,
    pub output_dir: &'a Path,
    /// Bundle everything into one archive instead of individual files.
    pub archive: bool,
}

/// Title used for the document heading and file name.
fn export_title(theme: &ThemeRecord, language: Language) -> String {
    theme
        .title()
        .map(clean_title)
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| placeholder_title(language).to_string())
}

/// Assemble each theme into `(file name, bytes)`, reporting as it goes.
pub async fn assemble_batch(
    themes: &[ThemeRecord],
    language: Language,
    date: NaiveDate,
    branding: &str,
    images: Option<&dyn ImageSource>,
    progress: &dyn ExportProgressReporter,
) -> (Vec<(String, Vec<u8>)>, BatchReport) {
    assemble_each(themes, language, date, images, progress, |theme, image| {
        assemble(theme, language, image, date, branding)
    })
    .await
}

async fn assemble_each<F>(
    themes: &[ThemeRecord],
    language: Language,
    date: NaiveDate,
    images: Option<&dyn ImageSource>,
    progress: &dyn ExportProgressReporter,
    build: F,
) -> (Vec<(String, Vec<u8>)>, BatchReport)
where
    F: Fn(&ThemeRecord, Option<&ThemeImage>) -> Result<Vec<u8>>,
{
    let total = themes.len() as u64;
    let mut documents = Vec::with_capacity(themes.len());
    let mut report = BatchReport::default();
    let mut taken = HashSet::new();

    for (i, theme) in themes.iter().enumerate() {
        let n = i as u64 + 1;
        let title = export_title(theme, language);

        let image = match images {
            Some(source) => {
                progress.report(ExportProgressEvent::FetchingImage {
                    title: title.clone(),
                    n,
                    total,
                });
                match source.image_for(&title).await {
                    Ok(image) => Some(image),
                    Err(e) => {
                        tracing::warn!(title = %title, error = %e, "image lookup failed; exporting without image");
                        report.image_failures.push(title.clone());
                        None
                    }
                }
            }
            None => None,
        };

        match build(theme, image.as_ref()) {
            Ok(bytes) => {
                let file = claim_name(&mut taken, &document_filename(&title, language, date));
                progress.report(ExportProgressEvent::Assembled {
                    title: title.clone(),
                    file: file.clone(),
                    n,
                    total,
                });
                report.written.push(file.clone());
                documents.push((file, bytes));
            }
            Err(e) => {
                tracing::error!(title = %title, error = %e, "document assembly failed");
                progress.report(ExportProgressEvent::Failed {
                    title: title.clone(),
                    error: e.to_string(),
                    n,
                    total,
                });
                report.failed.push(title);
            }
        }
    }

    (documents, report)
}

/// Export `themes` per `options`. Fails only on file-system errors;
/// per-theme failures are listed in the report.
pub async fn export_documents(
    themes: &[ThemeRecord],
    options: &ExportOptions<'_>,
    images: Option<&dyn ImageSource>,
    progress: &dyn ExportProgressReporter,
) -> Result<BatchReport> {
    let (documents, mut report) = assemble_batch(
        themes,
        options.language,
        options.date,
        options.branding,
        images,
        progress,
    )
    .await;

    if documents.is_empty() {
        return Ok(report);
    }

    std::fs::create_dir_all(options.output_dir).with_context(|| {
        format!(
            "Failed to create output directory: {}",
            options.output_dir.display()
        )
    })?;

    if options.archive {
        let bytes = build_archive(documents)?;
        let path = options
            .output_dir
            .join(archive_filename(options.language, options.date));
        std::fs::write(&path, bytes)
            .with_context(|| format!("Failed to write archive: {}", path.display()))?;
        report.files.push(path);
    } else {
        for (name, (_, bytes)) in report.written.iter().zip(documents) {
            let path = options.output_dir.join(name);
            std::fs::write(&path, bytes)
                .with_context(|| format!("Failed to write document: {}", path.display()))?;
            report.files.push(path);
        }
    }

    Ok(report)
}
