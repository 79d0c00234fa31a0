//! Machine-readable JSON report.

use super::ReportError;
use crate::model::{Summary, TestResult};
use serde::{Deserialize, Serialize};

/// Parsed form of a JSON report.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Report {
    pub generated: String,
    pub summary: Summary,
    pub results: Vec<TestResult>,
}

#[derive(Serialize)]
struct ReportView<'a> {
    generated: String,
    summary: &'a Summary,
    results: &'a [TestResult],
}

/// Serialize results and summary as a pretty-printed JSON document.
pub fn to_json(results: &[TestResult], summary: &Summary) -> Result<String, ReportError> {
    let view = ReportView {
        generated: super::generated_at(),
        summary,
        results,
    };
    Ok(serde_json::to_string_pretty(&view)?)
}

pub fn parse_json(content: &str) -> serde_json::Result<Report> {
    serde_json::from_str(content)
}
