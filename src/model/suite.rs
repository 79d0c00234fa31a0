//! Suite declarations as authored by pipeline engineers.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SuiteError {
    #[error("failed to read suite file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid suite file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// A named request to run one validator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestDeclaration {
    /// Empty when the suite file omits it; the runner then names the result
    /// `Test <n>` by 1-based position.
    #[serde(default)]
    pub name: String,
    /// Validator discriminator, e.g. `"checksum"`. A missing type is an
    /// unknown type at run time.
    #[serde(default, rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub params: Map<String, Value>,
}

impl TestDeclaration {
    /// Result name for the declaration at 0-based `index`.
    pub fn display_name(&self, index: usize) -> String {
        if self.name.is_empty() {
            format!("Test {}", index + 1)
        } else {
            self.name.clone()
        }
    }

    /// Build a declaration from a JSON params object. Non-object params are
    /// treated as empty.
    pub fn new(name: impl Into<String>, kind: impl Into<String>, params: Value) -> Self {
        let params = match params {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        Self {
            name: name.into(),
            kind: kind.into(),
            params,
        }
    }
}

/// Ordered, named collection of declarations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suite {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub tests: Vec<TestDeclaration>,
    #[serde(default = "now_rfc3339")]
    pub created: String,
}

fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339()
}

impl Suite {
    pub fn new(name: impl Into<String>, tests: Vec<TestDeclaration>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            tests,
            created: now_rfc3339(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn from_json(content: &str) -> serde_json::Result<Self> {
        serde_json::from_str(content)
    }

    /// Load a suite from a JSON file.
    pub fn load(path: &Path) -> Result<Self, SuiteError> {
        let content = std::fs::read_to_string(path).map_err(|source| SuiteError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&content).map_err(|source| SuiteError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn len(&self) -> usize {
        self.tests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tests.is_empty()
    }
}
