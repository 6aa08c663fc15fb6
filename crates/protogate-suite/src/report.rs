//! Suite report generation

use crate::metrics::{ScenarioOutcome, SuiteMetrics};
use colored::Colorize;
use serde::{Deserialize, Serialize};

/// Scenario suite report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteReport {
    /// Per-suite metrics
    pub suites: Vec<SuiteMetrics>,

    pub aggregate: AggregateStats,
}

/// Aggregate statistics across all suites
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregateStats {
    pub total_suites: usize,
    pub total_scenarios: usize,
    pub total_passed: usize,
    pub total_failed: usize,
    pub total_load_failures: usize,
    pub overall_pass_rate: f64,
}

impl SuiteReport {
    /// Create a new report from suite metrics
    pub fn new(suites: Vec<SuiteMetrics>) -> Self {
        let aggregate = Self::compute_aggregate(&suites);
        Self { suites, aggregate }
    }

    fn compute_aggregate(suites: &[SuiteMetrics]) -> AggregateStats {
        let total_scenarios: usize = suites.iter().map(|s| s.total_scenarios).sum();
        let total_passed: usize = suites.iter().map(|s| s.passed).sum();

        let overall_pass_rate = if total_scenarios > 0 {
            total_passed as f64 / total_scenarios as f64
        } else {
            0.0
        };

        AggregateStats {
            total_suites: suites.len(),
            total_scenarios,
            total_passed,
            total_failed: suites.iter().map(|s| s.failed).sum(),
            total_load_failures: suites.iter().map(|s| s.load_failures).sum(),
            overall_pass_rate,
        }
    }

    /// Whether every scenario in every suite passed
    pub fn is_success(&self) -> bool {
        self.aggregate.total_failed == 0
    }

    /// Generate a human-readable terminal report
    pub fn print_terminal_report(&self) {
        println!("\n{}", "╔══════════════════════════════════════════════════════════════════╗".cyan());
        println!("{}", "║       protogate Scenario Suite Report                            ║".cyan().bold());
        println!("{}", "╚══════════════════════════════════════════════════════════════════╝".cyan());

        println!("\n{}", "Aggregate Statistics:".bold());
        println!("  Total Scenarios:             {}", self.aggregate.total_scenarios);
        println!("  Passed:                      {}", self.aggregate.total_passed);
        println!("  Failed:                      {}", self.aggregate.total_failed);
        println!("  Load Failures:               {}", self.aggregate.total_load_failures);
        println!("  Pass Rate:                   {:.1}%", self.aggregate.overall_pass_rate * 100.0);

        for metrics in &self.suites {
            println!("\n  {}", metrics.suite_name.green());

            for result in &metrics.scenario_results {
                let mark = if result.passed { "✓".green() } else { "✗".red() };
                let expected = result
                    .expected
                    .map(|e| format!("{:?}", e).to_lowercase())
                    .unwrap_or_else(|| "compatible".to_string());

                println!(
                    "    {} {:<48} {} (expected {})",
                    mark,
                    result.name,
                    result.outcome.label(),
                    expected.dimmed()
                );

                if !result.passed {
                    match &result.outcome {
                        ScenarioOutcome::Incompatible { findings } => {
                            for finding in findings {
                                println!("        {}", finding.to_string().dimmed());
                            }
                        }
                        ScenarioOutcome::LoadFailed { error } => {
                            println!("        {}", error.red());
                        }
                        ScenarioOutcome::Compatible => {}
                    }
                }
            }

            let top = metrics.top_finding_codes(5);
            if !top.is_empty() {
                println!("    Top Finding Codes:");
                for (code, count) in top {
                    println!("      {} - {} occurrences", code.yellow(), count);
                }
            }
        }

        println!("\n{}", "Summary:".bold());
        if self.is_success() {
            println!("  {} All scenarios behaved as expected", "✓".green());
        } else {
            println!("  {} {} scenario(s) did not match their expectation", "✗".red(), self.aggregate.total_failed);
        }

        println!();
    }

    /// Export report as JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Export report as JSON to file
    pub fn save_json(&self, path: impl AsRef<std::path::Path>) -> std::io::Result<()> {
        let json = self.to_json()
            .map_err(std::io::Error::other)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}
