//! Lock file parsing
//!
//! The lock file is the JSON snapshot of a released schema (the baseline).
//! Its layout follows protolock's `proto.lock`; only the parts that matter
//! for compatibility are read, unknown keys are ignored.

use serde::{Deserialize, Serialize};
use protogate_core::{
    EnumType, FieldDef, LoadError, MessageType, ReservedRange, SchemaFile, SchemaTree,
};

/// proto.lock structure (subset of fields we care about)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LockFile {
    /// One definition per .proto file
    #[serde(default)]
    pub definitions: Vec<LockDefinition>,
}

/// A locked .proto file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LockDefinition {
    /// `dir:/:file.proto` style path
    pub protopath: String,

    pub def: LockEntry,
}

/// Contents of a locked file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LockEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package: Option<LockPackage>,

    #[serde(default)]
    pub messages: Vec<LockMessage>,

    #[serde(default)]
    pub enums: Vec<LockEnum>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LockPackage {
    pub name: String,
}

/// A reserved id: either a single number or an inclusive range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ReservedId {
    Single(i32),
    Range { start: i32, end: i32 },
}

impl From<ReservedId> for ReservedRange {
    fn from(id: ReservedId) -> Self {
        match id {
            ReservedId::Single(value) => ReservedRange::single(value),
            ReservedId::Range { start, end } => ReservedRange::new(start, end),
        }
    }
}

impl From<ReservedRange> for ReservedId {
    fn from(range: ReservedRange) -> Self {
        if range.start == range.end {
            ReservedId::Single(range.start)
        } else {
            ReservedId::Range { start: range.start, end: range.end }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LockField {
    pub id: i64,

    pub name: String,

    #[serde(rename = "type")]
    pub type_name: String,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_repeated: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oneof_parent: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LockMap {
    pub key_type: String,
    pub field: LockField,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LockMessage {
    pub name: String,

    #[serde(default)]
    pub fields: Vec<LockField>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub maps: Vec<LockMap>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reserved_ids: Vec<ReservedId>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reserved_names: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub messages: Vec<LockMessage>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub enums: Vec<LockEnum>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LockEnumField {
    pub name: String,

    #[serde(default)]
    pub integer: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LockEnum {
    pub name: String,

    #[serde(default)]
    pub enum_fields: Vec<LockEnumField>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reserved_ids: Vec<ReservedId>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reserved_names: Vec<String>,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub allow_alias: bool,
}

/// Normalize `dir:/:file.proto` to `dir/file.proto`
pub fn normalize_protopath(protopath: &str) -> String {
    protopath.replace(":/:", "/")
}

impl LockFile {
    /// Parse a lock file from JSON
    pub fn from_str(json: &str) -> Result<Self, LoadError> {
        serde_json::from_str(json)
            .map_err(|e| LoadError::ParseError(e.to_string()))
    }

    /// Serialize as pretty JSON
    pub fn to_json(&self) -> Result<String, LoadError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| LoadError::ParseError(e.to_string()))
    }

    /// Convert to the schema model
    pub fn into_tree(self) -> Result<SchemaTree, LoadError> {
        let mut tree = SchemaTree::new();

        for definition in self.definitions {
            let package = definition
                .def
                .package
                .as_ref()
                .map(|p| p.name.as_str())
                .unwrap_or_default();
            let mut file = SchemaFile::new(normalize_protopath(&definition.protopath), package);

            for message in definition.def.messages {
                file.messages.push(convert_message(message)?);
            }
            for enum_type in definition.def.enums {
                file.enums.push(convert_enum(enum_type));
            }

            tree.files.push(file);
        }

        Ok(tree)
    }

    /// Snapshot a schema model as a lock file
    pub fn from_tree(tree: &SchemaTree) -> Self {
        let definitions = tree
            .files
            .iter()
            .map(|file| LockDefinition {
                protopath: lock_protopath(&file.path),
                def: LockEntry {
                    package: (!file.package.is_empty()).then(|| LockPackage { name: file.package_name() }),
                    messages: file.messages.iter().map(lock_message).collect(),
                    enums: file.enums.iter().map(lock_enum).collect(),
                },
            })
            .collect();

        Self { definitions }
    }
}

/// `dir/file.proto` -> `dir:/:file.proto`
fn lock_protopath(path: &str) -> String {
    match path.rsplit_once('/') {
        Some((dir, file)) => format!("{}:/:{}", dir, file),
        None => path.to_string(),
    }
}

fn convert_field(message: &str, field: LockField) -> Result<FieldDef, LoadError> {
    let tag = u32::try_from(field.id).map_err(|_| {
        LoadError::ParseError(format!(
            "field '{}' in message '{}' has invalid id {}",
            field.name, message, field.id
        ))
    })?;

    let mut def = FieldDef::new(field.name, tag, field.type_name);
    def.repeated = field.is_repeated;
    def.oneof = field.oneof_parent.filter(|parent| !parent.is_empty());
    Ok(def)
}

fn convert_message(lock: LockMessage) -> Result<MessageType, LoadError> {
    let mut message = MessageType::new(lock.name.clone());

    for field in lock.fields {
        message = message.with_field(convert_field(&lock.name, field)?);
    }

    for map in lock.maps {
        let mut field = convert_field(&lock.name, map.field)?;
        field.type_name = format!("map<{}, {}>", map.key_type, field.type_name);
        message = message.with_field(field);
    }

    message.reserved.ranges = lock.reserved_ids.into_iter().map(ReservedRange::from).collect();
    message.reserved.names = lock.reserved_names;

    for nested in lock.messages {
        message.messages.push(convert_message(nested)?);
    }
    message.enums = lock.enums.into_iter().map(convert_enum).collect();

    Ok(message)
}

fn convert_enum(lock: LockEnum) -> EnumType {
    let mut enum_type = EnumType::new(lock.name).with_allow_alias(lock.allow_alias);

    for constant in lock.enum_fields {
        enum_type = enum_type.with_constant(constant.name, constant.integer);
    }

    enum_type.reserved.ranges = lock.reserved_ids.into_iter().map(ReservedRange::from).collect();
    enum_type.reserved.names = lock.reserved_names;
    enum_type
}

fn lock_message(message: &MessageType) -> LockMessage {
    let (maps, fields): (Vec<&FieldDef>, Vec<&FieldDef>) = message
        .fields
        .iter()
        .partition(|f| f.type_name.starts_with("map<"));

    LockMessage {
        name: message.name.clone(),
        fields: fields.into_iter().map(lock_field).collect(),
        maps: maps
            .into_iter()
            .map(|f| {
                let (key, value) = split_map_type(&f.type_name);
                let mut field = lock_field(f);
                field.type_name = value;
                LockMap { key_type: key, field }
            })
            .collect(),
        reserved_ids: message.reserved.ranges.iter().copied().map(ReservedId::from).collect(),
        reserved_names: message.reserved.names.clone(),
        messages: message.messages.iter().map(lock_message).collect(),
        enums: message.enums.iter().map(lock_enum).collect(),
    }
}

fn lock_field(field: &FieldDef) -> LockField {
    LockField {
        id: i64::from(field.tag),
        name: field.name.clone(),
        type_name: field.type_name.clone(),
        is_repeated: field.repeated,
        oneof_parent: field.oneof.clone(),
    }
}

fn split_map_type(type_name: &str) -> (String, String) {
    let inner = type_name
        .trim_start_matches("map<")
        .trim_end_matches('>');
    match inner.split_once(',') {
        Some((key, value)) => (key.trim().to_string(), value.trim().to_string()),
        None => (String::new(), inner.trim().to_string()),
    }
}

fn lock_enum(enum_type: &EnumType) -> LockEnum {
    LockEnum {
        name: enum_type.name.clone(),
        enum_fields: enum_type
            .constants
            .iter()
            .map(|c| LockEnumField { name: c.name.clone(), integer: c.value })
            .collect(),
        reserved_ids: enum_type.reserved.ranges.iter().copied().map(ReservedId::from).collect(),
        reserved_names: enum_type.reserved.names.clone(),
        allow_alias: enum_type.allow_alias,
    }
}
