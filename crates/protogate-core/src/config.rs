//! Configuration schema (protogate.toml)

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use crate::diagnostic::{FindingKind, Severity};

/// Input format of a schema file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SchemaFormat {
    /// Pick by extension, then by content
    Auto,

    /// JSON lock file (protolock-compatible subset)
    Lock,

    /// Binary `FileDescriptorSet` written by `protoc --descriptor_set_out`
    DescriptorSet,
}

impl Default for SchemaFormat {
    fn default() -> Self {
        Self::Auto
    }
}

impl std::str::FromStr for SchemaFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "lock" | "json" => Ok(Self::Lock),
            "descriptor-set" | "descriptor" | "pb" => Ok(Self::DescriptorSet),
            other => Err(ConfigError::ParseError(format!(
                "Unknown schema format '{}'. Valid options: auto, lock, descriptor-set",
                other
            ))),
        }
    }
}

/// Severity overrides for specific finding codes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeverityThreshold {
    /// Map of finding code to severity override
    #[serde(default)]
    pub overrides: HashMap<String, Severity>,
}

impl SeverityThreshold {
    /// Get severity for a finding code, or default
    pub fn get_severity(&self, kind: FindingKind, default: Severity) -> Severity {
        self.overrides
            .get(kind.as_str())
            .copied()
            .unwrap_or(default)
    }

    /// Set severity override for a code
    pub fn set_override(&mut self, kind: FindingKind, severity: Severity) {
        self.overrides.insert(kind.as_str().to_string(), severity);
    }

    /// Override keys that are not known finding codes
    pub fn unknown_codes(&self) -> Vec<&str> {
        let mut unknown: Vec<&str> = self
            .overrides
            .keys()
            .map(String::as_str)
            .filter(|code| FindingKind::from_code(code).is_none())
            .collect();
        unknown.sort_unstable();
        unknown
    }
}

/// Allowlist rules for type paths
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AllowlistRules {
    /// Drop findings on these type paths (glob patterns)
    #[serde(default)]
    pub skip_types: Vec<String>,
}

impl AllowlistRules {
    /// Check if a type path matches any pattern in the list
    fn matches_pattern(path: &str, patterns: &[String]) -> bool {
        patterns.iter().any(|pattern| {
            if pattern.contains('*') {
                glob_match(pattern, path)
            } else {
                pattern == path
            }
        })
    }

    /// Check if findings on a type path should be dropped
    pub fn is_type_skipped(&self, type_path: &str) -> bool {
        Self::matches_pattern(type_path, &self.skip_types)
    }
}

/// Loader settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoaderConfig {
    /// Schema input format
    #[serde(default)]
    pub format: SchemaFormat,

    /// Run load-time validation on both schemas
    #[serde(default = "default_true")]
    pub validate: bool,
}

fn default_true() -> bool {
    true
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            format: SchemaFormat::Auto,
            validate: true,
        }
    }
}

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Severity overrides
    #[serde(default)]
    pub severity: SeverityThreshold,

    /// Allowlist rules
    #[serde(default)]
    pub allowlist: AllowlistRules,

    /// Loader settings
    #[serde(default)]
    pub loader: LoaderConfig,
}

impl Config {
    /// Load config from TOML file
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::IoError(e.to_string()))?;

        Self::from_toml(&contents)
    }

    /// Load config from TOML string
    pub fn from_toml(toml: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(toml)
            .map_err(|e| ConfigError::ParseError(e.to_string()))?;

        let unknown = config.severity.unknown_codes();
        if !unknown.is_empty() {
            return Err(ConfigError::UnknownCode(unknown.join(", ")));
        }

        Ok(config)
    }
}

/// Glob matching over dotted type paths
///
/// `*` matches any run of characters, dots included, so `**` behaves like `*`.
fn glob_match(pattern: &str, text: &str) -> bool {
    let mut parts = pattern.split('*');
    let first = parts.next().unwrap_or_default();
    let Some(mut rest) = text.strip_prefix(first) else {
        return false;
    };

    let middle: Vec<&str> = parts.collect();
    let Some((last, inner)) = middle.split_last() else {
        // No star at all
        return rest.is_empty();
    };

    for part in inner.iter().filter(|p| !p.is_empty()) {
        match rest.find(part) {
            Some(pos) => rest = &rest[pos + part.len()..],
            None => return false,
        }
    }

    rest.ends_with(last)
}

/// Config error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Unknown finding code in severity overrides: {0}")]
    UnknownCode(String),
}
