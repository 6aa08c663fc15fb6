//! Scenario harness: runs the compatibility gate over a directory of
//! baseline/candidate pairs

use crate::metrics::{Expectation, ScenarioOutcome, ScenarioResult, SuiteMetrics};

use protogate_core::Config;
use protogate_engine::{check, FindingPolicy, VerdictAggregator};
use protogate_loader::SchemaLoader;

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

const BASELINE_DIR: &str = "baseline";
const CANDIDATE_DIR: &str = "candidate";
const SCENARIO_FILE: &str = "scenario.toml";

/// Optional per-scenario metadata (scenario.toml)
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioSpec {
    #[serde(default)]
    pub expect: Option<Expectation>,

    #[serde(default)]
    pub description: Option<String>,
}

impl ScenarioSpec {
    /// Read scenario.toml from a scenario directory, if present
    pub fn load(scenario_dir: &Path) -> Result<Self> {
        let path = scenario_dir.join(SCENARIO_FILE);
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))
    }
}

/// Runs every scenario under a suite root
pub struct ScenarioHarness {
    /// Directory holding one sub-directory per scenario
    suite_root: PathBuf,

    loader: SchemaLoader,

    aggregator: VerdictAggregator,
}

impl ScenarioHarness {
    /// Create a harness for a suite directory
    pub fn new(suite_root: impl Into<PathBuf>, config: &Config) -> Self {
        Self {
            suite_root: suite_root.into(),
            loader: SchemaLoader::from_config(&config.loader),
            aggregator: VerdictAggregator::with_policy(FindingPolicy::from_config(config)),
        }
    }

    /// Scenario directories (those with both baseline/ and candidate/), sorted by name
    pub fn discover_scenarios(&self) -> Result<Vec<PathBuf>> {
        if !self.suite_root.is_dir() {
            anyhow::bail!("Suite directory not found: {}", self.suite_root.display());
        }

        let mut scenarios = Vec::new();

        for entry in WalkDir::new(&self.suite_root)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            let entry = entry
                .with_context(|| format!("Failed to scan {}", self.suite_root.display()))?;
            let path = entry.path();

            if entry.file_type().is_dir()
                && path.join(BASELINE_DIR).is_dir()
                && path.join(CANDIDATE_DIR).is_dir()
            {
                scenarios.push(path.to_path_buf());
            }
        }

        Ok(scenarios)
    }

    /// Run every scenario and collect metrics
    pub fn run(&self) -> Result<SuiteMetrics> {
        let mut metrics = SuiteMetrics::new(
            self.suite_root.file_name()
                .and_then(|s| s.to_str())
                .unwrap_or("suite"),
        );

        let scenarios = self.discover_scenarios()?;
        if scenarios.is_empty() {
            tracing::warn!(root = %self.suite_root.display(), "No scenarios found");
        }

        for scenario in scenarios {
            metrics.add_scenario_result(self.run_scenario(&scenario));
        }

        tracing::info!(
            total = metrics.total_scenarios,
            passed = metrics.passed,
            failed = metrics.failed,
            "Suite finished"
        );

        Ok(metrics)
    }

    /// Check a single scenario directory
    pub fn run_scenario(&self, scenario_dir: &Path) -> ScenarioResult {
        let name = scenario_dir
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("unknown")
            .to_string();

        let spec = match ScenarioSpec::load(scenario_dir) {
            Ok(spec) => spec,
            Err(err) => {
                tracing::warn!(scenario = %name, "Invalid scenario metadata: {:#}", err);
                return ScenarioResult::new(
                    name,
                    None,
                    None,
                    ScenarioOutcome::LoadFailed { error: format!("{:#}", err) },
                );
            }
        };

        let outcome = match self.evaluate(scenario_dir) {
            Ok(outcome) => outcome,
            Err(err) => {
                tracing::warn!(scenario = %name, "Scenario failed to load: {:#}", err);
                ScenarioOutcome::LoadFailed { error: format!("{:#}", err) }
            }
        };

        tracing::info!(scenario = %name, outcome = outcome.label(), "Scenario checked");
        ScenarioResult::new(name, spec.description, spec.expect, outcome)
    }

    fn evaluate(&self, scenario_dir: &Path) -> Result<ScenarioOutcome> {
        let baseline_dir = scenario_dir.join(BASELINE_DIR);
        let candidate_dir = scenario_dir.join(CANDIDATE_DIR);

        let baseline = self.loader.load_path(&baseline_dir)
            .with_context(|| format!("Failed to load baseline {}", baseline_dir.display()))?;
        let candidate = self.loader.load_path(&candidate_dir)
            .with_context(|| format!("Failed to load candidate {}", candidate_dir.display()))?;

        let verdict = check(&baseline.tree, &candidate.tree, &self.aggregator)
            .context("Failed to index schemas")?;

        Ok(if verdict.compatible {
            ScenarioOutcome::Compatible
        } else {
            ScenarioOutcome::Incompatible { findings: verdict.findings }
        })
    }
}
