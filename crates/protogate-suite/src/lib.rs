//! Scenario suite for the compatibility gate
//!
//! Runs the gate over a directory of named scenarios, each a baseline and
//! candidate schema with an optional declared expectation, and tracks:
//! - Pass/fail per scenario
//! - Load failures
//! - Finding code frequencies and samples

pub mod harness;
pub mod metrics;
pub mod report;

pub use harness::{ScenarioHarness, ScenarioSpec};
pub use metrics::{Expectation, ScenarioOutcome, ScenarioResult, SuiteMetrics};
pub use report::{AggregateStats, SuiteReport};
