//! Report generation: JSON and HTML renderings of one run.
//!
//! Both renderers consume the same results and summary. When an output path
//! is given the document is rendered in memory first, then written to a
//! temporary file next to the target and renamed into place, so a failed
//! write never leaves a truncated report behind.

pub mod html;
pub mod json;

pub use html::{status_color, to_html};
pub use json::{parse_json, to_json, Report};

use crate::model::{Summary, TestResult};
use chrono::{DateTime, TimeZone};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("failed to create report directory {}: {source}", .path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write report {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("failed to render HTML report: {0}")]
    Template(#[from] askama::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Json,
    Html,
}

impl ReportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ReportFormat::Json => "json",
            ReportFormat::Html => "html",
        }
    }
}

impl FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(ReportFormat::Json),
            "html" => Ok(ReportFormat::Html),
            other => Err(format!("unknown report format: {other} (expected json or html)")),
        }
    }
}

impl std::fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.extension())
    }
}

/// Generation time stamped on every report, UTC RFC 3339.
pub(crate) fn generated_at() -> String {
    chrono::Utc::now().to_rfc3339()
}

/// Render a report document in the requested format.
pub fn render(
    results: &[TestResult],
    summary: &Summary,
    format: ReportFormat,
) -> Result<String, ReportError> {
    match format {
        ReportFormat::Json => to_json(results, summary),
        ReportFormat::Html => to_html(results, summary),
    }
}

/// Render a report and, when `output` is given, persist it there.
/// Returns the rendered document either way.
pub fn write(
    results: &[TestResult],
    summary: &Summary,
    format: ReportFormat,
    output: Option<&Path>,
) -> Result<String, ReportError> {
    let content = render(results, summary, format)?;
    if let Some(path) = output {
        persist(path, content.as_bytes())?;
        info!(path = %path.display(), %format, "Report saved");
    }
    Ok(content)
}

/// `report_<YYYYmmdd_HHMMSS>.<ext>`
pub fn default_file_name<Tz: TimeZone>(format: ReportFormat, at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!(
        "report_{}.{}",
        at.format("%Y%m%d_%H%M%S"),
        format.extension()
    )
}

fn persist(path: &Path, content: &[u8]) -> Result<(), ReportError> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent).map_err(|source| ReportError::CreateDir {
        path: parent.to_path_buf(),
        source,
    })?;

    let write_err = |source: io::Error| ReportError::Write {
        path: path.to_path_buf(),
        source,
    };

    let mut tmp = NamedTempFile::new_in(parent).map_err(write_err)?;
    tmp.write_all(content).map_err(write_err)?;
    tmp.as_file().sync_all().map_err(write_err)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        tmp.as_file()
            .set_permissions(fs::Permissions::from_mode(0o644))
            .map_err(write_err)?;
    }

    tmp.persist(path).map_err(|e| write_err(e.error))?;
    Ok(())
}
