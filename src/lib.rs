//! mediauat -- acceptance tests for media and asset pipelines.
//!
//! This crate provides the core library: suite and result models, the
//! validator set, the sequential test runner, and JSON/HTML report
//! generation. The `mediauat` binary is a thin CLI over these pieces.

pub mod config;
pub mod model;
pub mod probe;
pub mod report;
pub mod runner;
pub mod validators;
pub mod workspace;

pub use model::{Status, Suite, Summary, TestDeclaration, TestResult};
pub use report::{ReportError, ReportFormat};
pub use runner::{run_suite, RunState, TestRunner};
