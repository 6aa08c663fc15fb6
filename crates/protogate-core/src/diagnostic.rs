//! Finding codes and violation records
//!
//! IMPORTANT: Finding codes are versioned and stable.
//! NEVER rename or remove codes - they are part of the public API.
//! Add new codes with new names only.

use serde::{Deserialize, Serialize};

/// Finding code registry (v1)
///
/// These codes are STABLE and VERSIONED.
/// Do NOT rename or remove codes - only add new ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FindingKind {
    // Type presence
    /// A message or enum present in the baseline is missing from the candidate
    RemovedType,

    // Message fields
    /// A field was removed (or renamed) without reserving both its tag and name
    RemovedField,

    /// A retained field's new tag is reserved or used by another live field
    TagConflict,

    /// A new field uses a tag reserved in either version or held by a live field
    ReservedTagReuse,

    // Enum constants
    /// An enum constant was removed (or renamed) without reserving both its value and name
    RemovedEnumConstant,

    /// A retained constant's new value is reserved or used by another live constant
    ValueConflict,

    /// A new constant uses a value reserved in either version or held by a live constant
    ReservedValueReuse,

    // Shared
    /// A new field or constant uses a reserved name
    ReservedNameReuse,
}

impl FindingKind {
    /// All codes, in registry order
    pub const ALL: [FindingKind; 8] = [
        Self::RemovedType,
        Self::RemovedField,
        Self::TagConflict,
        Self::ReservedTagReuse,
        Self::RemovedEnumConstant,
        Self::ValueConflict,
        Self::ReservedValueReuse,
        Self::ReservedNameReuse,
    ];

    /// Get the finding code as a stable string identifier
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RemovedType => "REMOVED_TYPE",
            Self::RemovedField => "REMOVED_FIELD",
            Self::TagConflict => "TAG_CONFLICT",
            Self::ReservedTagReuse => "RESERVED_TAG_REUSE",
            Self::RemovedEnumConstant => "REMOVED_ENUM_CONSTANT",
            Self::ValueConflict => "VALUE_CONFLICT",
            Self::ReservedValueReuse => "RESERVED_VALUE_REUSE",
            Self::ReservedNameReuse => "RESERVED_NAME_REUSE",
        }
    }

    /// Parse a stable code string (as used in config overrides)
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|kind| kind.as_str() == code)
    }
}

impl std::fmt::Display for FindingKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Finding severity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational message
    Info,

    /// Warning - should be reviewed but not blocking
    Warn,

    /// Error - breaking change that should fail CI
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Warn => write!(f, "warn"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Logical schema file a type was declared in
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    /// Logical file path (e.g. `default/default.proto`)
    pub file: String,
}

impl Location {
    /// Create a new location with just a file path
    pub fn new(file: impl Into<String>) -> Self {
        Self { file: file.into() }
    }
}

/// One detected compatibility violation between two schema versions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    /// Stable finding code
    pub kind: FindingKind,

    /// Severity level
    pub severity: Severity,

    /// Fully-qualified path of the containing type
    pub type_path: String,

    /// Field or constant name involved, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub member: Option<String>,

    /// Tag or value involved, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number: Option<i64>,

    /// Human-readable message
    pub message: String,

    /// Baseline value (for comparison findings)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected: Option<String>,

    /// Candidate value (for comparison findings)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual: Option<String>,

    /// Source location (best-effort)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
}

impl Finding {
    /// Create a new breaking finding against a type
    pub fn new(kind: FindingKind, type_path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            severity: Severity::Error,
            type_path: type_path.into(),
            member: None,
            number: None,
            message: message.into(),
            expected: None,
            actual: None,
            location: None,
        }
    }

    /// Set the field/constant name and its tag/value
    pub fn with_member(mut self, member: impl Into<String>, number: i64) -> Self {
        self.member = Some(member.into());
        self.number = Some(number);
        self
    }

    /// Set expected/actual values
    pub fn with_comparison(mut self, expected: impl Into<String>, actual: impl Into<String>) -> Self {
        self.expected = Some(expected.into());
        self.actual = Some(actual.into());
        self
    }

    /// Set the location
    pub fn with_location(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    /// Override the severity
    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }
}

impl std::fmt::Display for Finding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.kind, self.type_path)?;
        if let Some(member) = &self.member {
            write!(f, ".{}", member)?;
        }
        write!(f, ": {}", self.message)
    }
}
