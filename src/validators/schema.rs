//! JSON sidecar/manifest check: required top-level keys.

use crate::model::{Status, TestResult};
use serde::Deserialize;
use serde_json::{json, Value};
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::time::Instant;

pub const JSON_SCHEMA: &str = "JSON Schema Check";

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JsonSchemaParams {
    pub path: PathBuf,
    #[serde(default)]
    pub required_keys: Vec<String>,
}

/// Pass when every required key is present in the top-level JSON object.
///
/// Unreadable files and malformed JSON are `Error`. A well-formed document
/// whose top level is not an object has none of the required keys.
pub fn json_schema(params: &JsonSchemaParams) -> TestResult {
    let started = Instant::now();
    let path = params.path.display().to_string();

    let file = match File::open(&params.path) {
        Ok(file) => file,
        Err(e) => {
            return TestResult::error(JSON_SCHEMA, started, format!("Cannot open {path}: {e}"))
                .with_details(json!({ "path": path }));
        }
    };

    let data: Value = match serde_json::from_reader(BufReader::new(file)) {
        Ok(data) => data,
        Err(e) if e.is_io() => {
            return TestResult::error(JSON_SCHEMA, started, format!("Cannot read {path}: {e}"))
                .with_details(json!({ "path": path }));
        }
        Err(e) => {
            return TestResult::error(JSON_SCHEMA, started, format!("Invalid JSON: {e}"))
                .with_details(json!({ "path": path }));
        }
    };

    let mut required: Vec<&str> = Vec::with_capacity(params.required_keys.len());
    for key in &params.required_keys {
        if !required.contains(&key.as_str()) {
            required.push(key);
        }
    }

    let missing: Vec<&str> = match data.as_object() {
        Some(object) => required
            .iter()
            .copied()
            .filter(|key| !object.contains_key(*key))
            .collect(),
        None => required.clone(),
    };

    let message = if !missing.is_empty() {
        format!("Missing keys: {}", missing.join(", "))
    } else if data.is_object() {
        "All required keys present".to_string()
    } else {
        "Valid JSON (top level is not an object)".to_string()
    };

    TestResult::since(
        JSON_SCHEMA,
        if missing.is_empty() {
            Status::Passed
        } else {
            Status::Failed
        },
        started,
        message,
    )
    .with_details(json!({
        "path": path,
        "required": required,
        "missing": missing,
    }))
}
