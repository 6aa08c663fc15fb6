//! protogate engine - compatibility analysis
//!
//! This crate implements the backward-compatibility gate:
//! - Type matching across schema versions
//! - Field and enum-constant identity and reservation rules
//! - Verdict aggregation

pub mod analyzer;
pub mod verdict;

pub use analyzer::CompatibilityAnalyzer;
pub use verdict::{FindingPolicy, VerdictAggregator};

use protogate_core::{LoadError, SchemaTree, TypeIndex, Verdict};

/// Index both trees, analyze, and aggregate under `aggregator`'s policy
pub fn check(
    baseline: &SchemaTree,
    candidate: &SchemaTree,
    aggregator: &VerdictAggregator,
) -> Result<Verdict, LoadError> {
    let old = TypeIndex::build(baseline)?;
    let new = TypeIndex::build(candidate)?;

    let verdict = aggregator.aggregate(CompatibilityAnalyzer::findings(&old, &new));

    tracing::info!(
        compatible = verdict.compatible,
        findings = verdict.findings.len(),
        advisories = verdict.advisories.len(),
        "compatibility check finished"
    );

    Ok(verdict)
}
