//! Report schema (stable v1)
//!
//! This schema is STABLE and VERSIONED.
//! Breaking changes require a new version.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use crate::diagnostic::{Finding, Severity};
use crate::verdict::Verdict;

/// Report schema version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportVersion {
    /// Major version (breaking changes)
    pub major: u32,

    /// Minor version (backward-compatible additions)
    pub minor: u32,
}

impl ReportVersion {
    /// Current report schema version
    pub const CURRENT: ReportVersion = ReportVersion { major: 1, minor: 0 };
}

impl std::fmt::Display for ReportVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// Summary statistics for a report
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSummary {
    /// Total number of findings (blocking + advisory)
    pub total: usize,

    /// Number of errors
    pub errors: usize,

    /// Number of warnings
    pub warnings: usize,

    /// Number of info messages
    pub info: usize,

    /// Number of types in the baseline
    pub baseline_types: usize,

    /// Number of types in the candidate
    pub candidate_types: usize,
}

/// An input schema as seen by the report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputDigest {
    /// Path the schema was loaded from
    pub path: String,

    /// SHA-256 of the raw input, hex encoded
    pub sha256: String,
}

impl InputDigest {
    /// Digest raw input bytes
    pub fn from_bytes(path: impl Into<String>, bytes: &[u8]) -> Self {
        Self {
            path: path.into(),
            sha256: hex::encode(Sha256::digest(bytes)),
        }
    }
}

/// Compatibility report (report.json v1)
///
/// This is the stable output format.
/// All fields are versioned and backward-compatible.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompatibilityReport {
    /// Schema version
    pub version: ReportVersion,

    /// Timestamp (ISO 8601)
    pub timestamp: String,

    /// Summary statistics
    pub summary: ReportSummary,

    /// Overall verdict
    pub compatible: bool,

    /// Blocking findings
    pub findings: Vec<Finding>,

    /// Non-blocking findings
    #[serde(default)]
    pub advisories: Vec<Finding>,

    /// Baseline (lock) input
    #[serde(skip_serializing_if = "Option::is_none")]
    pub baseline: Option<InputDigest>,

    /// Candidate input
    #[serde(skip_serializing_if = "Option::is_none")]
    pub candidate: Option<InputDigest>,

    /// Metadata
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

impl CompatibilityReport {
    /// Create a report from a verdict
    pub fn from_verdict(verdict: Verdict) -> Self {
        let all = || verdict.findings.iter().chain(verdict.advisories.iter());

        let summary = ReportSummary {
            total: verdict.findings.len() + verdict.advisories.len(),
            errors: all().filter(|f| f.severity == Severity::Error).count(),
            warnings: all().filter(|f| f.severity == Severity::Warn).count(),
            info: all().filter(|f| f.severity == Severity::Info).count(),
            baseline_types: 0,
            candidate_types: 0,
        };

        Self {
            version: ReportVersion::CURRENT,
            timestamp: chrono::Utc::now().to_rfc3339(),
            summary,
            compatible: verdict.compatible,
            findings: verdict.findings,
            advisories: verdict.advisories,
            baseline: None,
            candidate: None,
            metadata: None,
        }
    }

    /// Record the inputs that were compared
    pub fn with_inputs(mut self, baseline: InputDigest, candidate: InputDigest) -> Self {
        self.baseline = Some(baseline);
        self.candidate = Some(candidate);
        self
    }

    /// Record how many types each side held
    pub fn with_type_counts(mut self, baseline_types: usize, candidate_types: usize) -> Self {
        self.summary.baseline_types = baseline_types;
        self.summary.candidate_types = candidate_types;
        self
    }

    /// Check if the report has any blocking findings
    pub fn has_errors(&self) -> bool {
        !self.compatible
    }

    /// Serialize to JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Save to file
    pub fn save_to_file(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let json = self.to_json()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
        std::fs::write(path, json)
    }

    /// Render as markdown for CI comments
    pub fn to_markdown(&self) -> String {
        let mut md = String::new();

        md.push_str("# Schema Compatibility Report\n\n");
        md.push_str(&format!("**Version:** {}\n\n", self.version));
        md.push_str(&format!("**Timestamp:** {}\n\n", self.timestamp));

        if let (Some(baseline), Some(candidate)) = (&self.baseline, &self.candidate) {
            md.push_str(&format!("**Baseline:** `{}` (`{}`)\n\n", baseline.path, short_digest(&baseline.sha256)));
            md.push_str(&format!("**Candidate:** `{}` (`{}`)\n\n", candidate.path, short_digest(&candidate.sha256)));
        }

        md.push_str("## Summary\n\n");
        md.push_str(&format!("- Types (baseline / candidate): {} / {}\n", self.summary.baseline_types, self.summary.candidate_types));
        md.push_str(&format!("- Breaking findings: {}\n", self.findings.len()));
        md.push_str(&format!("- Advisories: {}\n", self.advisories.len()));
        md.push('\n');

        if self.compatible && self.advisories.is_empty() {
            md.push_str("✅ **Candidate is backward compatible.**\n");
            return md;
        }

        if self.compatible {
            md.push_str("✅ **Candidate is backward compatible** (with advisories).\n\n");
        } else {
            md.push_str("❌ **Candidate breaks backward compatibility.**\n\n");
            md.push_str("## Breaking findings\n\n");
            push_finding_table(&mut md, &self.findings);
        }

        if !self.advisories.is_empty() {
            md.push_str("## Advisories\n\n");
            push_finding_table(&mut md, &self.advisories);
        }

        md
    }
}

fn short_digest(digest: &str) -> &str {
    digest.get(..12).unwrap_or(digest)
}

fn push_finding_table(md: &mut String, findings: &[Finding]) {
    md.push_str("| Code | Type | Member | Message |\n");
    md.push_str("|------|------|--------|---------|\n");
    for finding in findings {
        let member = match (&finding.member, finding.number) {
            (Some(name), Some(number)) => format!("{} = {}", name, number),
            (Some(name), None) => name.clone(),
            _ => String::new(),
        };
        md.push_str(&format!(
            "| `{}` | `{}` | {} | {} |\n",
            finding.kind,
            finding.type_path,
            member,
            finding.message.replace('|', "\\|")
        ));
    }
    md.push('\n');
}
