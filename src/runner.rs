//! Sequential suite execution and summary aggregation.

use crate::model::{Status, Suite, Summary, TestDeclaration, TestResult};
use crate::probe::{FfprobeProbe, Probe};
use crate::validators::ValidatorKind;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Where a runner is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Running,
    Completed,
}

/// Runs suites one declaration at a time and keeps the latest results.
///
/// `run_suite` takes `&mut self`, so one runner can never be driving two
/// runs at once. Results and the summary stay readable until the next run.
pub struct TestRunner {
    probe: Box<dyn Probe>,
    state: RunState,
    results: Vec<TestResult>,
    elapsed: f64,
}

impl Default for TestRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl TestRunner {
    /// Runner probing media with `ffprobe` from `PATH`.
    pub fn new() -> Self {
        Self::with_probe(Box::new(FfprobeProbe::default()))
    }

    pub fn with_probe(probe: Box<dyn Probe>) -> Self {
        Self {
            probe,
            state: RunState::Idle,
            results: Vec::new(),
            elapsed: 0.0,
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    /// Results of the last run, in declaration order.
    pub fn results(&self) -> &[TestResult] {
        &self.results
    }

    /// Consume the runner and hand back its results.
    pub fn into_results(self) -> Vec<TestResult> {
        self.results
    }

    /// Evaluate the declaration at 0-based `index`. The result carries the
    /// declaration's name (`Test <n>` when unnamed) and always has a terminal
    /// status.
    pub fn run_declaration(&self, index: usize, decl: &TestDeclaration) -> TestResult {
        let kind = ValidatorKind::from_tag(&decl.kind);
        let mut result = kind.evaluate(&decl.params, self.probe.as_ref());
        result.name = decl.display_name(index);

        if !result.status.is_terminal() {
            result.message = format!(
                "{} validator returned non-terminal status {}",
                kind.tag(),
                result.status
            );
            result.status = Status::Error;
        }
        result
    }

    /// Run every declaration of `suite` in order. One result per
    /// declaration; no outcome aborts the rest of the suite.
    pub fn run_suite(&mut self, suite: &Suite) -> &[TestResult] {
        info!(
            suite = %suite.name,
            tests = suite.len(),
            description = %suite.description,
            "Running test suite"
        );

        self.state = RunState::Running;
        self.results = Vec::with_capacity(suite.len());
        let started = Instant::now();

        let total = suite.len();
        for (i, decl) in suite.tests.iter().enumerate() {
            debug!(index = i + 1, total, name = %decl.name, kind = %decl.kind, "Running test");
            let result = self.run_declaration(i, decl);
            log_result(i + 1, total, &result);
            self.results.push(result);
        }

        self.elapsed = started.elapsed().as_secs_f64();
        self.state = RunState::Completed;

        let summary = self.summary();
        info!(
            suite = %suite.name,
            total = summary.total,
            passed = summary.passed,
            failed = summary.failed,
            errors = summary.errors,
            skipped = summary.skipped,
            duration = %format!("{:.2}s", summary.duration),
            success_rate = %format!("{:.1}%", summary.success_rate),
            "Test suite complete"
        );

        &self.results
    }

    /// Summary of the last run. Duration is the wall-clock span of the run,
    /// not the sum of per-test durations.
    pub fn summary(&self) -> Summary {
        Summary::from_results(&self.results, self.elapsed)
    }
}

fn log_result(index: usize, total: usize, result: &TestResult) {
    let duration = format!("{:.3}s", result.duration);
    match result.status {
        Status::Failed | Status::Error => warn!(
            index,
            total,
            name = %result.name,
            status = %result.status,
            %duration,
            message = %result.message,
            "Test did not pass"
        ),
        _ => info!(
            index,
            total,
            name = %result.name,
            status = %result.status,
            %duration,
            "Test finished"
        ),
    }
}

/// Run `suite` with the default ffprobe-backed runner.
pub fn run_suite(suite: &Suite) -> (Vec<TestResult>, Summary) {
    let mut runner = TestRunner::new();
    runner.run_suite(suite);
    let summary = runner.summary();
    (runner.into_results(), summary)
}
