//! Verdict: the outcome of one analysis run

use serde::{Deserialize, Serialize};
use crate::diagnostic::Finding;

/// Overall compatible/incompatible result plus its findings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    /// True iff `findings` is empty
    pub compatible: bool,

    /// Blocking findings, in stable report order
    pub findings: Vec<Finding>,

    /// Findings re-graded below `error` by policy; never blocking
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub advisories: Vec<Finding>,
}

impl Verdict {
    /// Pure fold over the finding list
    pub fn from_findings(findings: Vec<Finding>) -> Self {
        Self {
            compatible: findings.is_empty(),
            findings,
            advisories: Vec::new(),
        }
    }

    /// Attach non-blocking findings
    pub fn with_advisories(mut self, advisories: Vec<Finding>) -> Self {
        self.advisories = advisories;
        self
    }

    pub fn is_compatible(&self) -> bool {
        self.compatible
    }
}
