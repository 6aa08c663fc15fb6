//! Scenario metrics collection and tracking

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use protogate_core::Finding;

/// Declared outcome of a scenario
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Expectation {
    Compatible,
    Incompatible,
}

/// Overall metrics for one suite directory
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteMetrics {
    /// Suite name (directory name)
    pub suite_name: String,

    pub total_scenarios: usize,

    /// Scenarios whose outcome matched the expectation
    pub passed: usize,

    pub failed: usize,

    /// Scenarios where either schema failed to load (counted as failed too)
    pub load_failures: usize,

    /// Individual scenario results
    pub scenario_results: Vec<ScenarioResult>,

    /// Finding code -> occurrences across all scenarios
    pub finding_codes: BTreeMap<String, usize>,

    /// Finding code -> example messages
    pub finding_samples: BTreeMap<String, Vec<String>>,
}

impl SuiteMetrics {
    pub fn new(suite_name: impl Into<String>) -> Self {
        Self {
            suite_name: suite_name.into(),
            total_scenarios: 0,
            passed: 0,
            failed: 0,
            load_failures: 0,
            scenario_results: Vec::new(),
            finding_codes: BTreeMap::new(),
            finding_samples: BTreeMap::new(),
        }
    }

    /// Pass rate (0.0 to 1.0)
    pub fn pass_rate(&self) -> f64 {
        if self.total_scenarios == 0 {
            return 0.0;
        }
        self.passed as f64 / self.total_scenarios as f64
    }

    pub fn all_passed(&self) -> bool {
        self.failed == 0
    }

    /// Get top N finding codes by frequency
    pub fn top_finding_codes(&self, n: usize) -> Vec<(String, usize)> {
        let mut codes: Vec<(String, usize)> = self.finding_codes.iter()
            .map(|(k, v)| (k.clone(), *v))
            .collect();
        // Stable sort keeps code order among equal counts
        codes.sort_by(|a, b| b.1.cmp(&a.1));
        codes.into_iter().take(n).collect()
    }

    /// Add a scenario result and update aggregate metrics
    pub fn add_scenario_result(&mut self, result: ScenarioResult) {
        self.total_scenarios += 1;

        if result.passed {
            self.passed += 1;
        } else {
            self.failed += 1;
        }

        match &result.outcome {
            ScenarioOutcome::Compatible => {}
            ScenarioOutcome::Incompatible { findings } => {
                for finding in findings {
                    self.record_finding(finding);
                }
            }
            ScenarioOutcome::LoadFailed { .. } => {
                self.load_failures += 1;
            }
        }

        self.scenario_results.push(result);
    }

    /// Record a finding code and sample
    fn record_finding(&mut self, finding: &Finding) {
        let code = finding.kind.as_str().to_string();
        *self.finding_codes.entry(code.clone()).or_insert(0) += 1;

        // Up to 3 samples per code
        let samples = self.finding_samples.entry(code).or_default();
        if samples.len() < 3 {
            samples.push(finding.to_string());
        }
    }
}

/// Result for a single scenario
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioResult {
    /// Scenario name (directory name)
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected: Option<Expectation>,

    pub outcome: ScenarioOutcome,

    pub passed: bool,
}

impl ScenarioResult {
    /// Judge an outcome against the expectation. Without one, only a
    /// compatible outcome passes. Load failures never pass.
    pub fn new(
        name: impl Into<String>,
        description: Option<String>,
        expected: Option<Expectation>,
        outcome: ScenarioOutcome,
    ) -> Self {
        let passed = match (&outcome, expected) {
            (ScenarioOutcome::LoadFailed { .. }, _) => false,
            (ScenarioOutcome::Compatible, None | Some(Expectation::Compatible)) => true,
            (ScenarioOutcome::Incompatible { .. }, Some(Expectation::Incompatible)) => true,
            _ => false,
        };

        Self {
            name: name.into(),
            description,
            expected,
            outcome,
            passed,
        }
    }
}

/// Outcome of checking a scenario
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScenarioOutcome {
    /// Candidate is backward compatible with the baseline
    Compatible,

    /// At least one error-severity finding
    Incompatible {
        findings: Vec<Finding>,
    },

    /// Baseline or candidate could not be loaded
    LoadFailed {
        error: String,
    },
}

impl ScenarioOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Compatible => "compatible",
            Self::Incompatible { .. } => "incompatible",
            Self::LoadFailed { .. } => "load failed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use protogate_core::FindingKind;

    fn removed_field() -> Finding {
        Finding::new(FindingKind::RemovedField, "default.Foo", "Field 'b' was removed")
            .with_member("b", 2)
    }

    #[test]
    fn pass_rules() {
        let compatible = |expected| ScenarioResult::new("s", None, expected, ScenarioOutcome::Compatible);
        assert!(compatible(None).passed);
        assert!(compatible(Some(Expectation::Compatible)).passed);
        assert!(!compatible(Some(Expectation::Incompatible)).passed);

        let incompatible = |expected| {
            ScenarioResult::new("s", None, expected, ScenarioOutcome::Incompatible { findings: vec![removed_field()] })
        };
        assert!(!incompatible(None).passed);
        assert!(incompatible(Some(Expectation::Incompatible)).passed);

        let failed = ScenarioResult::new(
            "s",
            None,
            Some(Expectation::Incompatible),
            ScenarioOutcome::LoadFailed { error: "boom".to_string() },
        );
        assert!(!failed.passed);
    }

    #[test]
    fn metrics_tally_outcomes_and_codes() {
        let mut metrics = SuiteMetrics::new("fixtures");
        metrics.add_scenario_result(ScenarioResult::new("a", None, None, ScenarioOutcome::Compatible));
        metrics.add_scenario_result(ScenarioResult::new(
            "b",
            None,
            Some(Expectation::Incompatible),
            ScenarioOutcome::Incompatible { findings: vec![removed_field(), removed_field()] },
        ));
        metrics.add_scenario_result(ScenarioResult::new(
            "c",
            None,
            None,
            ScenarioOutcome::LoadFailed { error: "bad".to_string() },
        ));

        assert_eq!(metrics.total_scenarios, 3);
        assert_eq!(metrics.passed, 2);
        assert_eq!(metrics.failed, 1);
        assert_eq!(metrics.load_failures, 1);
        assert!(!metrics.all_passed());
        assert_eq!(metrics.top_finding_codes(5), vec![("REMOVED_FIELD".to_string(), 2)]);
        assert_eq!(metrics.finding_samples["REMOVED_FIELD"].len(), 2);
        assert!((metrics.pass_rate() - 2.0 / 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn empty_suite_rate_is_zero() {
        assert_eq!(SuiteMetrics::new("empty").pass_rate(), 0.0);
    }
}
