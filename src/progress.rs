//! Export progress reporting.
//!
//! Batch export walks the selected themes one at a time; each step is
//! reported on **stderr** so stdout stays reserved for command results.

use std::io::Write;

/// A single progress event for batch export.
#[derive(Clone, Debug)]
pub enum ExportProgressEvent {
    /// Fetching the illustration for theme `n` of `total`.
    FetchingImage { title: String, n: u64, total: u64 },
    /// Theme `n` of `total` assembled into `file`.
    Assembled {
        title: String,
        file: String,
        n: u64,
        total: u64,
    },
    /// Theme `n` of `total` could not be assembled.
    Failed {
        title: String,
        error: String,
        n: u64,
        total: u64,
    },
}

/// Reports export progress. Implementations write to stderr (human or JSON).
pub trait ExportProgressReporter: Send + Sync {
    fn report(&self, event: ExportProgressEvent);
}

/// Human-friendly progress on stderr: "export  3 / 10  assembled  Inner_Light_20261014.docx".
pub struct StderrProgress;

impl ExportProgressReporter for StderrProgress {
    fn report(&self, event: ExportProgressEvent) {
        let line = match &event {
            ExportProgressEvent::FetchingImage { title, n, total } => {
                format!("export  {} / {}  fetching image  {}\n", n, total, title)
            }
            ExportProgressEvent::Assembled { file, n, total, .. } => {
                format!("export  {} / {}  assembled  {}\n", n, total, file)
            }
            ExportProgressEvent::Failed {
                title,
                error,
                n,
                total,
            } => format!("export  {} / {}  failed  {}: {}\n", n, total, title, error),
        };
        let _ = std::io::stderr().lock().write_all(line.as_bytes());
        let _ = std::io::stderr().lock().flush();
    }
}

/// Machine-readable progress: one JSON object per line on stderr.
pub struct JsonProgress;

impl ExportProgressReporter for JsonProgress {
    fn report(&self, event: ExportProgressEvent) {
        let obj = event_json(&event);
        if let Ok(line) = serde_json::to_string(&obj) {
            let _ = writeln!(std::io::stderr().lock(), "{}", line);
            let _ = std::io::stderr().lock().flush();
        }
    }
}

fn event_json(event: &ExportProgressEvent) -> serde_json::Value {
    match event {
        ExportProgressEvent::FetchingImage { title, n, total } => serde_json::json!({
            "event": "progress",
            "phase": "fetching_image",
            "title": title,
            "n": n,
            "total": total
        }),
        ExportProgressEvent::Assembled {
            title,
            file,
            n,
            total,
        } => serde_json::json!({
            "event": "progress",
            "phase": "assembled",
            "title": title,
            "file": file,
            "n": n,
            "total": total
        }),
        ExportProgressEvent::Failed {
            title,
            error,
            n,
            total,
        } => serde_json::json!({
            "event": "progress",
            "phase": "failed",
            "title": title,
            "error": error,
            "n": n,
            "total": total
        }),
    }
}

/// No-op reporter when progress is disabled.
pub struct NoProgress;

impl ExportProgressReporter for NoProgress {
    fn report(&self, _event: ExportProgressEvent) {}
}

/// Thousands separators: `1234567` → `1,234,567`.
pub fn format_number(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::with_capacity(s.len() + (s.len() - 1) / 3);
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result.chars().rev().collect()
}

/// Progress mode for the CLI: off, human (stderr), or JSON (stderr).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ProgressMode {
    Off,
    Human,
    Json,
}

impl ProgressMode {
    /// Default: human progress when stderr is a TTY, otherwise off.
    pub fn default_for_tty() -> Self {
        if atty::is(atty::Stream::Stderr) {
            ProgressMode::Human
        } else {
            ProgressMode::Off
        }
    }

    pub fn reporter(&self) -> Box<dyn ExportProgressReporter> {
        match self {
            ProgressMode::Off => Box::new(NoProgress),
            ProgressMode::Human => Box::new(StderrProgress),
            ProgressMode::Json => Box::new(JsonProgress),
        }
    }
}

impl std::str::FromStr for ProgressMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "off" | "none" => Ok(ProgressMode::Off),
            "human" => Ok(ProgressMode::Human),
            "json" => Ok(ProgressMode::Json),
            other => Err(format!("unknown progress mode '{}': expected off, human, or json", other)),
        }
    }
}
