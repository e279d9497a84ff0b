//! Document and archive naming, and zip bundling of exported documents.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;
use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;
use zip::CompressionMethod;

use crate::models::Language;

static UNSAFE_CHARS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[^\w\-_\. ]").unwrap_or_else(|e| panic!("filename regex: {e}"))
});

/// `{safe_title}{_pt?}_{YYYYMMDD}.docx`.
///
/// Characters other than word characters, `-`, `_`, `.` and space are
/// removed, then spaces become underscores.
pub fn document_filename(title: &str, language: Language, date: NaiveDate) -> String {
    let safe = UNSAFE_CHARS.replace_all(title, "").trim().replace(' ', "_");
    let safe = if safe.is_empty() { "theme".to_string() } else { safe };
    format!(
        "{}{}_{}.docx",
        safe,
        language.filename_suffix(),
        date.format("%Y%m%d")
    )
}

/// `lecture_themes_{english|portuguese}_{YYYYMMDD}.zip`.
pub fn archive_filename(language: Language, date: NaiveDate) -> String {
    format!("lecture_themes_{}_{}.zip", language.name(), date.format("%Y%m%d"))
}

/// Give repeated names a `-2`, `-3`, ... suffix before the extension.
pub fn unique_names(names: &[String]) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    names.iter().map(|name| claim_name(&mut seen, name)).collect()
}

/// Return `name`, or the first free `-2`, `-3`, ... variant, and mark it taken.
pub fn claim_name(seen: &mut HashSet<String>, name: &str) -> String {
    if seen.insert(name.to_string()) {
        return name.to_string();
    }
    let (stem, ext) = match name.rfind('.') {
        Some(dot) => (&name[..dot], &name[dot..]),
        None => (name, ""),
    };
    let mut n = 2;
    loop {
        let candidate = format!("{}-{}{}", stem, n, ext);
        if seen.insert(candidate.clone()) {
            return candidate;
        }
        n += 1;
    }
}

/// Bundle named documents into one deflated zip.
pub fn build_archive(documents: Vec<(String, Vec<u8>)>) -> Result<Vec<u8>> {
    let names: Vec<String> = documents.iter().map(|(name, _)| name.clone()).collect();
    let names = unique_names(&names);

    let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for (name, (_, bytes)) in names.into_iter().zip(documents) {
        zip.start_file(name.as_str(), options)
            .with_context(|| format!("Failed to add {} to archive", name))?;
        zip.write_all(&bytes)?;
    }

    let cursor = zip.finish().context("Failed to finish archive")?;
    Ok(cursor.into_inner())
}
