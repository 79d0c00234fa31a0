//! Data model: declarations in, results and summaries out.

pub mod result;
pub mod suite;

pub use result::{Status, Summary, TestResult};
pub use suite::{Suite, SuiteError, TestDeclaration};
