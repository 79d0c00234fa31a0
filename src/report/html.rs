//! Static HTML report rendered through an askama template.

use super::ReportError;
use crate::model::{Status, Summary, TestResult};
use askama::Template;

const GREEN: &str = "#27ca40";
const RED: &str = "#ff5f56";
const YELLOW: &str = "#ffbd2e";
const GREY: &str = "#888888";
const ACCENT: &str = "#00ffff";

/// Display color for a status: passed green, failed/error red, skipped yellow.
pub fn status_color(status: Status) -> &'static str {
    match status {
        Status::Passed => GREEN,
        Status::Failed | Status::Error => RED,
        Status::Skipped => YELLOW,
        Status::Pending | Status::Running => GREY,
    }
}

struct StatCard {
    label: &'static str,
    value: String,
    color: &'static str,
}

struct Row {
    name: String,
    status: String,
    color: &'static str,
    duration: String,
    message: String,
    details: String,
    timestamp: String,
}

#[derive(Template)]
#[template(path = "report.html")]
struct HtmlReport {
    generated: String,
    cards: Vec<StatCard>,
    rows: Vec<Row>,
}

fn cards(summary: &Summary) -> Vec<StatCard> {
    vec![
        StatCard {
            label: "Total",
            value: summary.total.to_string(),
            color: ACCENT,
        },
        StatCard {
            label: "Passed",
            value: summary.passed.to_string(),
            color: GREEN,
        },
        StatCard {
            label: "Failed",
            value: summary.failed.to_string(),
            color: RED,
        },
        StatCard {
            label: "Errors",
            value: summary.errors.to_string(),
            color: RED,
        },
        StatCard {
            label: "Skipped",
            value: summary.skipped.to_string(),
            color: YELLOW,
        },
        StatCard {
            label: "Duration",
            value: format!("{:.2}s", summary.duration),
            color: ACCENT,
        },
        StatCard {
            label: "Success Rate",
            value: format!("{:.1}%", summary.success_rate),
            color: ACCENT,
        },
    ]
}

fn row(result: &TestResult) -> Row {
    let details = if result.details.is_empty() {
        String::new()
    } else {
        serde_json::to_string(&result.details).unwrap_or_default()
    };
    Row {
        name: result.name.clone(),
        status: result.status.as_str().to_uppercase(),
        color: status_color(result.status),
        duration: format!("{:.3}s", result.duration),
        message: result.message.clone(),
        details,
        timestamp: result.timestamp.clone(),
    }
}

/// Render results and summary as a standalone HTML page.
pub fn to_html(results: &[TestResult], summary: &Summary) -> Result<String, ReportError> {
    let page = HtmlReport {
        generated: super::generated_at(),
        cards: cards(summary),
        rows: results.iter().map(row).collect(),
    };
    Ok(page.render()?)
}
