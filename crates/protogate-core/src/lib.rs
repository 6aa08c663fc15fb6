//! protogate core
//!
//! Schema model, type index and the stable output types.
//! Never rename finding codes - they are part of the public API.

pub mod config;
pub mod diagnostic;
pub mod error;
pub mod index;
pub mod report;
pub mod schema;
pub mod verdict;

pub use config::{AllowlistRules, Config, ConfigError, LoaderConfig, SchemaFormat, SeverityThreshold};
pub use diagnostic::{Finding, FindingKind, Location, Severity};
pub use error::{LoadError, ValidationIssue};
pub use index::{IndexedType, TypeDef, TypeIndex};
pub use report::{CompatibilityReport, InputDigest, ReportSummary, ReportVersion};
pub use schema::{
    EnumConstant, EnumType, FieldDef, MessageType, OneofGroup, ReservedRange, Reservations,
    SchemaFile, SchemaTree,
};
pub use verdict::Verdict;
