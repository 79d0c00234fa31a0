//! Filesystem checks: existence, extension, and size bounds.

use crate::model::{Status, TestResult};
use serde::Deserialize;
use serde_json::json;
use std::path::{Path, PathBuf};
use std::time::Instant;

pub const FILE_EXISTS: &str = "File Exists Check";
pub const FILE_FORMAT: &str = "File Format Check";
pub const FILE_SIZE: &str = "File Size Check";

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PathParams {
    pub path: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileFormatParams {
    pub path: PathBuf,
    pub expected_ext: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileSizeParams {
    pub path: PathBuf,
    #[serde(default)]
    pub min_bytes: u64,
    #[serde(default)]
    pub max_bytes: Option<u64>,
}

/// Pass when `path` names an existing filesystem entry.
pub fn file_exists(params: &PathParams) -> TestResult {
    let started = Instant::now();
    let exists = params.path.exists();
    let path = params.path.display().to_string();

    TestResult::since(
        FILE_EXISTS,
        if exists { Status::Passed } else { Status::Failed },
        started,
        format!("File {}: {}", if exists { "found" } else { "not found" }, path),
    )
    .with_details(json!({ "path": path, "exists": exists }))
}

/// Lower-case an extension and make sure it carries a leading dot.
pub fn normalize_extension(ext: &str) -> String {
    let ext = ext.to_lowercase();
    if ext.starts_with('.') {
        ext
    } else {
        format!(".{ext}")
    }
}

/// Extension of `path` as `.ext`, or an empty string when it has none.
fn actual_extension(path: &Path) -> String {
    path.extension()
        .map(|e| format!(".{}", e.to_string_lossy().to_lowercase()))
        .unwrap_or_default()
}

/// Pass when the extension of `path` matches `expected_ext`, ignoring case.
/// The file itself does not need to exist.
pub fn file_format(params: &FileFormatParams) -> TestResult {
    let started = Instant::now();
    let expected = normalize_extension(&params.expected_ext);
    let actual = actual_extension(&params.path);
    let matches = actual == expected;

    TestResult::since(
        FILE_FORMAT,
        if matches { Status::Passed } else { Status::Failed },
        started,
        format!("Expected {expected}, got {actual}"),
    )
    .with_details(json!({ "expected": expected, "actual": actual }))
}

/// Pass when the file size lies within `[min_bytes, max_bytes]`, both ends
/// inclusive. A missing upper bound means unlimited.
pub fn file_size(params: &FileSizeParams) -> TestResult {
    let started = Instant::now();
    let path = params.path.display().to_string();

    let size = match std::fs::metadata(&params.path) {
        Ok(meta) => meta.len(),
        Err(e) => {
            return TestResult::error(FILE_SIZE, started, format!("Cannot stat {path}: {e}"))
                .with_details(json!({ "path": path }));
        }
    };

    let in_range =
        size >= params.min_bytes && params.max_bytes.map_or(true, |max| size <= max);
    let max_label = params
        .max_bytes
        .map(|m| m.to_string())
        .unwrap_or_else(|| "unlimited".to_string());

    TestResult::since(
        FILE_SIZE,
        if in_range { Status::Passed } else { Status::Failed },
        started,
        format!(
            "Size: {size} bytes (min: {}, max: {max_label})",
            params.min_bytes
        ),
    )
    .with_details(json!({
        "path": path,
        "size": size,
        "min": params.min_bytes,
        "max": params.max_bytes,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn sized_file(dir: &Path, len: usize) -> PathBuf {
        let path = dir.join("asset.bin");
        fs::write(&path, vec![0u8; len]).unwrap();
        path
    }

    #[test]
    fn test_file_exists() {
        let dir = tempfile::tempdir().unwrap();
        let path = sized_file(dir.path(), 4);

        let r = file_exists(&PathParams { path: path.clone() });
        assert_eq!(r.status, Status::Passed);
        assert_eq!(r.details["exists"], true);

        let r = file_exists(&PathParams {
            path: dir.path().join("missing.exr"),
        });
        assert_eq!(r.status, Status::Failed);
        assert!(r.message.contains("not found"));
    }

    #[test]
    fn test_normalize_extension() {
        assert_eq!(normalize_extension("EXR"), ".exr");
        assert_eq!(normalize_extension(".Mov"), ".mov");
    }

    #[test]
    fn test_file_format_is_case_insensitive() {
        let r = file_format(&FileFormatParams {
            path: PathBuf::from("/renders/shot_010.EXR"),
            expected_ext: "exr".to_string(),
        });
        assert_eq!(r.status, Status::Passed);
        assert_eq!(r.details["actual"], ".exr");

        let r = file_format(&FileFormatParams {
            path: PathBuf::from("/renders/shot_010.exr"),
            expected_ext: ".EXR".to_string(),
        });
        assert_eq!(r.status, Status::Passed);
    }

    #[test]
    fn test_file_format_mismatch() {
        let r = file_format(&FileFormatParams {
            path: PathBuf::from("/renders/shot_010.png"),
            expected_ext: "exr".to_string(),
        });
        assert_eq!(r.status, Status::Failed);
        assert_eq!(r.message, "Expected .exr, got .png");

        let r = file_format(&FileFormatParams {
            path: PathBuf::from("/renders/README"),
            expected_ext: "txt".to_string(),
        });
        assert_eq!(r.status, Status::Failed);
        assert_eq!(r.details["actual"], "");
    }

    #[test]
    fn test_file_size_lower_bound_inclusive() {
        let dir = tempfile::tempdir().unwrap();
        let path = sized_file(dir.path(), 100);

        let at_min = file_size(&FileSizeParams {
            path: path.clone(),
            min_bytes: 100,
            max_bytes: None,
        });
        assert_eq!(at_min.status, Status::Passed);

        let below_min = file_size(&FileSizeParams {
            path: sized_file(dir.path(), 99),
            min_bytes: 100,
            max_bytes: None,
        });
        assert_eq!(below_min.status, Status::Failed);
        assert_eq!(below_min.details["size"], 99);
    }

    #[test]
    fn test_file_size_upper_bound_inclusive() {
        let dir = tempfile::tempdir().unwrap();
        let path = sized_file(dir.path(), 100);

        let at_max = file_size(&FileSizeParams {
            path: path.clone(),
            min_bytes: 0,
            max_bytes: Some(100),
        });
        assert_eq!(at_max.status, Status::Passed);

        let over_max = file_size(&FileSizeParams {
            path,
            min_bytes: 0,
            max_bytes: Some(99),
        });
        assert_eq!(over_max.status, Status::Failed);
        assert_eq!(over_max.details["max"], 99);
    }

    #[test]
    fn test_file_size_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let r = file_size(&FileSizeParams {
            path: dir.path().join("gone.mov"),
            min_bytes: 0,
            max_bytes: None,
        });
        assert_eq!(r.status, Status::Error);
        assert!(r.message.contains("Cannot stat"));
    }
}
