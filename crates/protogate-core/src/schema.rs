//! Schema model: packages, messages, fields, oneofs, enums and reservations
//!
//! The model is passive. Loaders build it once per run and nothing mutates it
//! afterwards.

use serde::{Deserialize, Serialize};

/// Highest legal field tag
pub const MAX_FIELD_TAG: i32 = 536_870_911;

/// Tags reserved by the protobuf implementation itself
pub const IMPLEMENTATION_RESERVED_TAGS: std::ops::RangeInclusive<i32> = 19_000..=19_999;

/// Inclusive interval of reserved tags or enum values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ReservedRange {
    pub start: i32,
    pub end: i32,
}

impl ReservedRange {
    /// Reserve `start..=end`
    pub fn new(start: i32, end: i32) -> Self {
        Self { start, end }
    }

    /// Reserve a single tag or value
    pub fn single(value: i32) -> Self {
        Self { start: value, end: value }
    }

    /// Whether `value` falls inside the interval
    pub fn contains(&self, value: i64) -> bool {
        i64::from(self.start) <= value && value <= i64::from(self.end)
    }
}

impl std::fmt::Display for ReservedRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.start == self.end {
            write!(f, "{}", self.start)
        } else if self.end == MAX_FIELD_TAG || self.end == i32::MAX {
            write!(f, "{} to max", self.start)
        } else {
            write!(f, "{} to {}", self.start, self.end)
        }
    }
}

/// Reserved tags/values and names declared by a message or enum
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservations {
    #[serde(default)]
    pub ranges: Vec<ReservedRange>,

    #[serde(default)]
    pub names: Vec<String>,
}

impl Reservations {
    /// First reserved range containing `value`
    pub fn range_containing(&self, value: i64) -> Option<&ReservedRange> {
        self.ranges.iter().find(|r| r.contains(value))
    }

    /// Whether `value` is reserved
    pub fn reserves_number(&self, value: i64) -> bool {
        self.range_containing(value).is_some()
    }

    /// Whether `name` is reserved
    pub fn reserves_name(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty() && self.names.is_empty()
    }
}

/// A field of a message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDef {
    /// Field name (unique within its message)
    pub name: String,

    /// Wire tag (unique within its message)
    pub tag: u32,

    /// Type reference, opaque to the analyzer
    pub type_name: String,

    /// Repeated label
    #[serde(default)]
    pub repeated: bool,

    /// Name of the oneof this field belongs to, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oneof: Option<String>,
}

impl FieldDef {
    /// Create a singular field
    pub fn new(name: impl Into<String>, tag: u32, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tag,
            type_name: type_name.into(),
            repeated: false,
            oneof: None,
        }
    }

    /// Mark the field repeated
    pub fn repeated(mut self) -> Self {
        self.repeated = true;
        self
    }

    /// Place the field in a oneof
    pub fn in_oneof(mut self, oneof: impl Into<String>) -> Self {
        self.oneof = Some(oneof.into());
        self
    }
}

/// A named group of mutually exclusive fields
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OneofGroup {
    pub name: String,

    /// Member field names
    pub members: Vec<String>,
}

impl OneofGroup {
    pub fn new(name: impl Into<String>, members: Vec<String>) -> Self {
        Self {
            name: name.into(),
            members,
        }
    }
}

/// A message type, possibly containing nested types
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageType {
    /// Local (unqualified) name
    pub name: String,

    /// Fields in declaration order
    #[serde(default)]
    pub fields: Vec<FieldDef>,

    #[serde(default)]
    pub oneofs: Vec<OneofGroup>,

    /// Nested message types
    #[serde(default)]
    pub messages: Vec<MessageType>,

    /// Nested enum types
    #[serde(default)]
    pub enums: Vec<EnumType>,

    #[serde(default)]
    pub reserved: Reservations,
}

impl MessageType {
    /// Create an empty message
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Add a field. Fields carrying a oneof name are also registered as
    /// members of that oneof.
    pub fn with_field(mut self, field: FieldDef) -> Self {
        if let Some(oneof) = &field.oneof {
            match self.oneofs.iter_mut().find(|o| &o.name == oneof) {
                Some(group) => group.members.push(field.name.clone()),
                None => self
                    .oneofs
                    .push(OneofGroup::new(oneof.clone(), vec![field.name.clone()])),
            }
        }
        self.fields.push(field);
        self
    }

    /// Add a nested message
    pub fn with_message(mut self, message: MessageType) -> Self {
        self.messages.push(message);
        self
    }

    /// Add a nested enum
    pub fn with_enum(mut self, enum_type: EnumType) -> Self {
        self.enums.push(enum_type);
        self
    }

    /// Reserve an inclusive tag range
    pub fn with_reserved_range(mut self, start: i32, end: i32) -> Self {
        self.reserved.ranges.push(ReservedRange::new(start, end));
        self
    }

    /// Reserve a field name
    pub fn with_reserved_name(mut self, name: impl Into<String>) -> Self {
        self.reserved.names.push(name.into());
        self
    }

    /// Find a field by name
    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Find a field by tag
    pub fn field_by_tag(&self, tag: u32) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.tag == tag)
    }
}

/// A constant of an enum
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumConstant {
    pub name: String,
    pub value: i32,
}

impl EnumConstant {
    pub fn new(name: impl Into<String>, value: i32) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// An enum type
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumType {
    /// Local (unqualified) name
    pub name: String,

    /// Constants in declaration order
    #[serde(default)]
    pub constants: Vec<EnumConstant>,

    /// `option allow_alias = true`
    #[serde(default)]
    pub allow_alias: bool,

    #[serde(default)]
    pub reserved: Reservations,
}

impl EnumType {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_constant(mut self, name: impl Into<String>, value: i32) -> Self {
        self.constants.push(EnumConstant::new(name, value));
        self
    }

    pub fn with_reserved_range(mut self, start: i32, end: i32) -> Self {
        self.reserved.ranges.push(ReservedRange::new(start, end));
        self
    }

    pub fn with_reserved_name(mut self, name: impl Into<String>) -> Self {
        self.reserved.names.push(name.into());
        self
    }

    pub fn with_allow_alias(mut self, allow_alias: bool) -> Self {
        self.allow_alias = allow_alias;
        self
    }

    pub fn constant(&self, name: &str) -> Option<&EnumConstant> {
        self.constants.iter().find(|c| c.name == name)
    }
}

/// One schema file: a package plus its top-level definitions
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaFile {
    /// Logical path, e.g. `default/default.proto`
    pub path: String,

    /// Package segments (empty for the root package)
    #[serde(default)]
    pub package: Vec<String>,

    #[serde(default)]
    pub messages: Vec<MessageType>,

    #[serde(default)]
    pub enums: Vec<EnumType>,
}

impl SchemaFile {
    /// Create a file in the given dotted package (`""` for the root package)
    pub fn new(path: impl Into<String>, package: &str) -> Self {
        Self {
            path: path.into(),
            package: package
                .split('.')
                .filter(|segment| !segment.is_empty())
                .map(str::to_string)
                .collect(),
            messages: Vec::new(),
            enums: Vec::new(),
        }
    }

    pub fn with_message(mut self, message: MessageType) -> Self {
        self.messages.push(message);
        self
    }

    pub fn with_enum(mut self, enum_type: EnumType) -> Self {
        self.enums.push(enum_type);
        self
    }

    /// Dotted package name
    pub fn package_name(&self) -> String {
        self.package.join(".")
    }
}

/// Root container of a loaded schema
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaTree {
    pub files: Vec<SchemaFile>,
}

impl SchemaTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tree holding a single file
    pub fn from_file(file: SchemaFile) -> Self {
        Self { files: vec![file] }
    }

    pub fn with_file(mut self, file: SchemaFile) -> Self {
        self.files.push(file);
        self
    }

    /// Append another tree's files
    pub fn merge(&mut self, other: SchemaTree) {
        self.files.extend(other.files);
    }

    /// Find a file by logical path
    pub fn file(&self, path: &str) -> Option<&SchemaFile> {
        self.files.iter().find(|f| f.path == path)
    }

    pub fn is_empty(&self) -> bool {
        self.files
            .iter()
            .all(|f| f.messages.is_empty() && f.enums.is_empty())
    }
}
