//! Suite discovery on disk, project scaffolding, and ad-hoc asset suites.

use crate::model::{Suite, SuiteError, TestDeclaration};
use anyhow::{Context, Result};
use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Extensions treated as video containers by quick validation.
pub const VIDEO_EXTENSIONS: [&str; 4] = ["mp4", "mov", "avi", "mkv"];

/// One entry of `list`: either a readable suite or the reason it is not.
#[derive(Debug)]
pub struct SuiteListing {
    pub path: PathBuf,
    pub suite: Result<Suite, SuiteError>,
}

/// All `*.json` files in `dir`, sorted by file name. A missing directory
/// yields an empty list.
pub fn suite_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }
    let mut files: Vec<PathBuf> = fs::read_dir(dir)
        .with_context(|| format!("failed to read suites directory: {}", dir.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_file() && p.extension().map_or(false, |e| e == "json"))
        .collect();
    files.sort();
    Ok(files)
}

/// Resolve a suite argument: an existing file path wins, otherwise
/// `<suites_dir>/<name>.json`.
pub fn resolve_suite(suites_dir: &Path, name: &str) -> PathBuf {
    let direct = Path::new(name);
    if direct.is_file() {
        return direct.to_path_buf();
    }
    suites_dir.join(format!("{name}.json"))
}

pub fn list_suites(dir: &Path) -> Result<Vec<SuiteListing>> {
    Ok(suite_files(dir)?
        .into_iter()
        .map(|path| {
            let suite = Suite::load(&path);
            SuiteListing { path, suite }
        })
        .collect())
}

/// Sample suite written by `init`.
pub fn sample_suite(project: &str) -> Suite {
    Suite::new(
        format!("{project}_tests"),
        vec![
            TestDeclaration::new(
                "Sample File Check",
                "file_exists",
                json!({ "path": "/tmp/sample.txt" }),
            ),
            TestDeclaration::new(
                "Sample JSON Validation",
                "json_schema",
                json!({ "path": "/tmp/config.json", "required_keys": ["version", "name"] }),
            ),
        ],
    )
    .with_description(format!("UAT test suite for {project}"))
}

/// Create the suites and reports directories and write a sample suite.
/// Returns the path of the suite file. An existing suite is left untouched.
pub fn init_project(suites_dir: &Path, reports_dir: &Path, project: &str) -> Result<PathBuf> {
    for dir in [suites_dir, reports_dir] {
        fs::create_dir_all(dir)
            .with_context(|| format!("failed to create directory: {}", dir.display()))?;
        info!(path = %dir.display(), "Created directory");
    }

    let suite_path = suites_dir.join(format!("{project}_tests.json"));
    if suite_path.exists() {
        info!(path = %suite_path.display(), "Suite already exists, leaving it in place");
        return Ok(suite_path);
    }

    let content = serde_json::to_string_pretty(&sample_suite(project))?;
    fs::write(&suite_path, content)
        .with_context(|| format!("failed to write suite: {}", suite_path.display()))?;
    info!(path = %suite_path.display(), "Created sample test suite");
    Ok(suite_path)
}

/// Standard checks for a single asset, chosen by its extension.
pub fn quick_validation_suite(asset: &Path) -> Suite {
    let path = asset.display().to_string();
    let mut tests = vec![
        TestDeclaration::new("File Exists", "file_exists", json!({ "path": path })),
        TestDeclaration::new(
            "File Size",
            "file_size",
            json!({ "path": path, "min_bytes": 1 }),
        ),
    ];

    let ext = asset
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    if VIDEO_EXTENSIONS.contains(&ext.as_str()) {
        tests.push(TestDeclaration::new(
            "Video Codec",
            "video_codec",
            json!({ "path": path }),
        ));
        tests.push(TestDeclaration::new(
            "Resolution",
            "resolution",
            json!({ "path": path }),
        ));
    } else if ext == "json" {
        tests.push(TestDeclaration::new(
            "Valid JSON",
            "json_schema",
            json!({ "path": path, "required_keys": [] }),
        ));
    }

    Suite::new("Quick Validation", tests)
        .with_description(format!("Standard checks for {path}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(suite: &Suite) -> Vec<&str> {
        suite.tests.iter().map(|t| t.kind.as_str()).collect()
    }

    #[test]
    fn test_quick_suite_for_video() {
        let suite = quick_validation_suite(Path::new("/deliveries/ep101_final.MOV"));
        assert_eq!(
            kinds(&suite),
            vec!["file_exists", "file_size", "video_codec", "resolution"]
        );
        assert_eq!(suite.tests[1].params["min_bytes"], 1);
    }

    #[test]
    fn test_quick_suite_for_json() {
        let suite = quick_validation_suite(Path::new("shot.json"));
        assert_eq!(kinds(&suite), vec!["file_exists", "file_size", "json_schema"]);
    }

    #[test]
    fn test_quick_suite_for_other() {
        let suite = quick_validation_suite(Path::new("plate.0001.exr"));
        assert_eq!(kinds(&suite), vec!["file_exists", "file_size"]);
    }

    #[test]
    fn test_init_and_list() {
        let dir = tempfile::tempdir().unwrap();
        let suites = dir.path().join("suites");
        let reports = dir.path().join("reports");

        let path = init_project(&suites, &reports, "show").unwrap();
        assert!(reports.is_dir());
        assert_eq!(path, suites.join("show_tests.json"));

        fs::write(suites.join("broken.json"), "{").unwrap();
        fs::write(suites.join("notes.txt"), "ignored").unwrap();

        let listing = list_suites(&suites).unwrap();
        assert_eq!(listing.len(), 2);
        assert!(listing[0].suite.is_err());
        let suite = listing[1].suite.as_ref().unwrap();
        assert_eq!(suite.name, "show_tests");
        assert_eq!(suite.len(), 2);
    }

    #[test]
    fn test_init_keeps_existing_suite() {
        let dir = tempfile::tempdir().unwrap();
        let suites = dir.path().join("suites");
        let reports = dir.path().join("reports");
        let path = init_project(&suites, &reports, "show").unwrap();
        fs::write(&path, "custom").unwrap();

        init_project(&suites, &reports, "show").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "custom");
    }

    #[test]
    fn test_missing_suites_dir_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(suite_files(&dir.path().join("absent")).unwrap().is_empty());
    }

    #[test]
    fn test_resolve_suite_by_name() {
        let dir = tempfile::tempdir().unwrap();
        let resolved = resolve_suite(dir.path(), "nightly");
        assert_eq!(resolved, dir.path().join("nightly.json"));
    }
}
