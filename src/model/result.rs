//! Test outcome records, the status taxonomy, and run summaries.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::time::Instant;

/// Lifecycle status of a single test.
///
/// `Pending` and `Running` are transient; a completed [`TestResult`] always
/// carries one of the four terminal statuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Pending,
    Running,
    Passed,
    Failed,
    Skipped,
    Error,
}

impl Status {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            Status::Passed | Status::Failed | Status::Skipped | Status::Error
        )
    }

    /// Lower-case tag used in reports.
    pub fn as_str(self) -> &'static str {
        match self {
            Status::Pending => "pending",
            Status::Running => "running",
            Status::Passed => "passed",
            Status::Failed => "failed",
            Status::Skipped => "skipped",
            Status::Error => "error",
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Outcome of one declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestResult {
    pub name: String,
    pub status: Status,
    /// Seconds spent inside the validator.
    pub duration: f64,
    pub message: String,
    #[serde(default)]
    pub details: Map<String, Value>,
    pub timestamp: String,
}

impl TestResult {
    /// Build a result stamped with the current time and empty details.
    pub fn new(
        name: impl Into<String>,
        status: Status,
        duration: f64,
        message: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            status,
            duration: duration.max(0.0),
            message: message.into(),
            details: Map::new(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Build a result whose duration is measured from `started`.
    pub fn since(
        name: impl Into<String>,
        status: Status,
        started: Instant,
        message: impl Into<String>,
    ) -> Self {
        Self::new(name, status, started.elapsed().as_secs_f64(), message)
    }

    pub fn error(name: impl Into<String>, started: Instant, message: impl Into<String>) -> Self {
        Self::since(name, Status::Error, started, message)
    }

    /// Attach diagnostic details. Objects are merged key by key; any other
    /// JSON value is stored under `"value"`.
    pub fn with_details(mut self, details: Value) -> Self {
        match details {
            Value::Object(map) => self.details.extend(map),
            Value::Null => {}
            other => {
                self.details.insert("value".to_string(), other);
            }
        }
        self
    }

    pub fn with_timestamp(mut self, timestamp: impl Into<String>) -> Self {
        self.timestamp = timestamp.into();
        self
    }
}

/// Aggregate counts over a completed results sequence.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub total: u64,
    pub passed: u64,
    pub failed: u64,
    pub errors: u64,
    pub skipped: u64,
    /// Wall-clock seconds for the whole run.
    pub duration: f64,
    /// Percentage of passed results, 0 when there are none.
    pub success_rate: f64,
}

impl Summary {
    pub fn from_results(results: &[TestResult], duration: f64) -> Self {
        let mut summary = Summary {
            duration: duration.max(0.0),
            ..Summary::default()
        };

        for result in results {
            match result.status {
                Status::Passed => summary.passed += 1,
                Status::Failed => summary.failed += 1,
                Status::Skipped => summary.skipped += 1,
                // The runner never stores a non-terminal status; count any
                // stray one as an error so the totals still add up.
                Status::Error | Status::Pending | Status::Running => summary.errors += 1,
            }
        }

        summary.total = results.len() as u64;
        summary.success_rate = if summary.total == 0 {
            0.0
        } else {
            summary.passed as f64 / summary.total as f64 * 100.0
        };
        summary
    }

    /// True when nothing failed or errored. Skips do not count against a run.
    pub fn is_success(&self) -> bool {
        self.failed == 0 && self.errors == 0
    }
}
