//! Verdict aggregation
//!
//! Folds analyzer findings into a verdict. With the default policy this is
//! exactly `compatible = findings.is_empty()`; a configured policy may drop
//! findings on allowlisted types or re-grade a finding code so it no longer
//! blocks.

use protogate_core::{AllowlistRules, Config, Finding, Severity, SeverityThreshold, Verdict};

/// Severity overrides and type allowlist applied before folding
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FindingPolicy {
    pub severity: SeverityThreshold,
    pub allowlist: AllowlistRules,
}

impl FindingPolicy {
    /// Policy described by a config file
    pub fn from_config(config: &Config) -> Self {
        Self {
            severity: config.severity.clone(),
            allowlist: config.allowlist.clone(),
        }
    }

    /// True when the policy changes nothing
    pub fn is_default(&self) -> bool {
        self.severity.overrides.is_empty() && self.allowlist.skip_types.is_empty()
    }
}

/// Reduces findings to a verdict
#[derive(Debug, Clone, Default)]
pub struct VerdictAggregator {
    policy: FindingPolicy,
}

impl VerdictAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(policy: FindingPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &FindingPolicy {
        &self.policy
    }

    /// Apply the policy, then fold
    pub fn aggregate(&self, findings: Vec<Finding>) -> Verdict {
        if self.policy.is_default() {
            return Verdict::from_findings(findings);
        }

        let mut blocking = Vec::new();
        let mut advisories = Vec::new();

        for mut finding in findings {
            if self.policy.allowlist.is_type_skipped(&finding.type_path) {
                tracing::debug!(
                    code = %finding.kind,
                    path = %finding.type_path,
                    "finding dropped by allowlist"
                );
                continue;
            }

            finding.severity = self.policy.severity.get_severity(finding.kind, finding.severity);
            if finding.severity == Severity::Error {
                blocking.push(finding);
            } else {
                advisories.push(finding);
            }
        }

        Verdict::from_findings(blocking).with_advisories(advisories)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use protogate_core::FindingKind;

    fn findings() -> Vec<Finding> {
        vec![
            Finding::new(FindingKind::RemovedType, "legacy.Old", "Message 'legacy.Old' was removed"),
            Finding::new(FindingKind::RemovedField, "api.User", "Field 'email' removed").with_member("email", 3),
            Finding::new(FindingKind::ReservedTagReuse, "api.User", "New field 'x': tag 4 reserved").with_member("x", 4),
        ]
    }

    #[test]
    fn default_policy_is_pure_fold() {
        let verdict = VerdictAggregator::new().aggregate(findings());
        assert!(!verdict.compatible);
        assert_eq!(verdict.findings, findings());
        assert!(verdict.advisories.is_empty());

        assert!(VerdictAggregator::new().aggregate(Vec::new()).compatible);
    }

    #[test]
    fn allowlist_drops_findings() {
        let policy = FindingPolicy {
            allowlist: AllowlistRules { skip_types: vec!["legacy.*".to_string()] },
            ..Default::default()
        };
        let verdict = VerdictAggregator::with_policy(policy).aggregate(findings());
        assert_eq!(verdict.findings.len(), 2);
        assert!(verdict.findings.iter().all(|f| f.type_path == "api.User"));
    }

    #[test]
    fn downgraded_findings_become_advisories() {
        let mut severity = SeverityThreshold::default();
        severity.set_override(FindingKind::RemovedType, Severity::Warn);
        severity.set_override(FindingKind::RemovedField, Severity::Info);
        severity.set_override(FindingKind::ReservedTagReuse, Severity::Warn);

        let policy = FindingPolicy { severity, ..Default::default() };
        let verdict = VerdictAggregator::with_policy(policy).aggregate(findings());

        assert!(verdict.compatible);
        assert!(verdict.findings.is_empty());
        assert_eq!(verdict.advisories.len(), 3);
        assert_eq!(verdict.advisories[1].severity, Severity::Info);
    }

    #[test]
    fn policy_from_config() {
        let config = Config::from_toml(
            r#"
            [allowlist]
            skip_types = ["legacy.*"]
            "#,
        )
        .unwrap();
        let policy = FindingPolicy::from_config(&config);
        assert!(!policy.is_default());
        assert!(FindingPolicy::from_config(&Config::default()).is_default());
    }
}
