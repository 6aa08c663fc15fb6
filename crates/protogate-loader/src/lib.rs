//! Schema loading
//!
//! This crate handles:
//! - Parsing protolock-style lock files (JSON)
//! - Decoding binary `FileDescriptorSet`s
//! - Load-time validation of the resulting schema tree
//! - Snapshotting a schema tree back to a lock file

pub mod descriptor;
pub mod loader;
pub mod lockfile;
pub mod validate;

pub use descriptor::decode_descriptor_set;
pub use loader::{detect_format, sniff_format, LoadedSchema, SchemaLoader};
pub use lockfile::{LockDefinition, LockEntry, LockEnum, LockField, LockFile, LockMessage};
pub use validate::{collect_issues, validate};
