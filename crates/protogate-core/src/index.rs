//! Type index: fully-qualified path -> message/enum definition
//!
//! Flattens every level of nesting so the analyzer can match types across
//! schema versions with a single lookup per path.

use std::collections::BTreeMap;

use crate::error::LoadError;
use crate::schema::{EnumType, MessageType, SchemaTree};

/// Protobuf scalar type names, always resolvable
pub const SCALAR_TYPES: [&str; 15] = [
    "double", "float", "int32", "int64", "uint32", "uint64", "sint32", "sint64",
    "fixed32", "fixed64", "sfixed32", "sfixed64", "bool", "string", "bytes",
];

/// Join a scope and a local name into a qualified path
pub fn qualify(scope: &str, name: &str) -> String {
    if scope.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", scope, name)
    }
}

/// Borrowed definition stored in the index
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeDef<'a> {
    Message(&'a MessageType),
    Enum(&'a EnumType),
}

impl<'a> TypeDef<'a> {
    /// "message" or "enum"
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Message(_) => "message",
            Self::Enum(_) => "enum",
        }
    }
}

/// One index entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedType<'a> {
    /// Fully-qualified path
    pub path: String,

    pub def: TypeDef<'a>,

    /// Logical file the type was declared in
    pub file: &'a str,
}

/// Mapping from fully-qualified path to definition, ordered by path
#[derive(Debug, Clone, Default)]
pub struct TypeIndex<'a> {
    types: BTreeMap<String, IndexedType<'a>>,
}

impl<'a> TypeIndex<'a> {
    /// Build the index with a single recursive walk of the tree
    ///
    /// Fails only when two definitions share a qualified path.
    pub fn build(tree: &'a SchemaTree) -> Result<Self, LoadError> {
        let mut index = Self::default();

        for file in &tree.files {
            let scope = file.package_name();
            for message in &file.messages {
                index.insert_message(&scope, message, &file.path)?;
            }
            for enum_type in &file.enums {
                index.insert(qualify(&scope, &enum_type.name), TypeDef::Enum(enum_type), &file.path)?;
            }
        }

        Ok(index)
    }

    fn insert_message(
        &mut self,
        scope: &str,
        message: &'a MessageType,
        file: &'a str,
    ) -> Result<(), LoadError> {
        let path = qualify(scope, &message.name);

        for nested in &message.messages {
            self.insert_message(&path, nested, file)?;
        }
        for enum_type in &message.enums {
            self.insert(qualify(&path, &enum_type.name), TypeDef::Enum(enum_type), file)?;
        }

        self.insert(path, TypeDef::Message(message), file)
    }

    fn insert(&mut self, path: String, def: TypeDef<'a>, file: &'a str) -> Result<(), LoadError> {
        if self.types.contains_key(&path) {
            return Err(LoadError::DuplicateTypePath(path));
        }

        self.types.insert(path.clone(), IndexedType { path, def, file });
        Ok(())
    }

    /// Look up an entry by exact qualified path
    pub fn get(&self, path: &str) -> Option<&IndexedType<'a>> {
        self.types.get(path)
    }

    /// Look up a message by exact qualified path
    pub fn message(&self, path: &str) -> Option<&'a MessageType> {
        match self.types.get(path)?.def {
            TypeDef::Message(message) => Some(message),
            TypeDef::Enum(_) => None,
        }
    }

    /// Look up an enum by exact qualified path
    pub fn enum_type(&self, path: &str) -> Option<&'a EnumType> {
        match self.types.get(path)?.def {
            TypeDef::Enum(enum_type) => Some(enum_type),
            TypeDef::Message(_) => None,
        }
    }

    pub fn contains(&self, path: &str) -> bool {
        self.types.contains_key(path)
    }

    /// Entries in qualified-path order
    pub fn iter(&self) -> impl Iterator<Item = &IndexedType<'a>> {
        self.types.values()
    }

    /// Qualified paths in order
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.types.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Resolve a field type reference as seen from `scope`
    ///
    /// A leading `.` means fully qualified. Otherwise the first segment is
    /// looked up in each enclosing scope, innermost first, and the rest of a
    /// dotted name must resolve under the first scope that declares it.
    /// Scalars resolve to themselves.
    pub fn resolve(&self, reference: &str, scope: &str) -> Option<String> {
        let reference = reference.trim();

        if SCALAR_TYPES.contains(&reference) {
            return Some(reference.to_string());
        }

        if let Some(absolute) = reference.strip_prefix('.') {
            return self.contains(absolute).then(|| absolute.to_string());
        }

        let segments: Vec<&str> = scope.split('.').filter(|s| !s.is_empty()).collect();
        let mut candidates = (0..=segments.len())
            .rev()
            .map(|depth| segments[..depth].join("."));

        match reference.split_once('.') {
            None => candidates
                .map(|outer| qualify(&outer, reference))
                .find(|candidate| self.contains(candidate)),
            Some((head, rest)) => {
                let anchor = candidates
                    .map(|outer| qualify(&outer, head))
                    .find(|candidate| self.declares(candidate))?;
                let resolved = format!("{}.{}", anchor, rest);
                self.contains(&resolved).then_some(resolved)
            }
        }
    }

    /// Whether `path` names a type or a package prefix of one
    fn declares(&self, path: &str) -> bool {
        let nested = format!("{}.", path);
        self.contains(path)
            || self
                .types
                .range(nested.clone()..)
                .next()
                .is_some_and(|(key, _)| key.starts_with(&nested))
    }

    /// Whether a type reference (including `map<K, V>`) resolves from `scope`
    pub fn is_resolvable(&self, reference: &str, scope: &str) -> bool {
        match parse_map_reference(reference) {
            Some((key, value)) => {
                self.resolve(key, scope).is_some() && self.resolve(value, scope).is_some()
            }
            None => self.resolve(reference, scope).is_some(),
        }
    }
}

/// Split `map<K, V>` into its key and value references
fn parse_map_reference(reference: &str) -> Option<(&str, &str)> {
    let inner = reference
        .trim()
        .strip_prefix("map<")?
        .strip_suffix('>')?;
    let (key, value) = inner.split_once(',')?;
    Some((key.trim(), value.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{EnumType, FieldDef, MessageType, SchemaFile, SchemaTree};

    fn sample_tree() -> SchemaTree {
        SchemaTree::from_file(
            SchemaFile::new("default/default.proto", "acme.v1")
                .with_message(
                    MessageType::new("Outer")
                        .with_field(FieldDef::new("inner", 1, "Inner"))
                        .with_message(
                            MessageType::new("Inner")
                                .with_enum(EnumType::new("Kind").with_constant("UNKNOWN", 0)),
                        ),
                )
                .with_enum(EnumType::new("Status").with_constant("OK", 0)),
        )
    }

    #[test]
    fn indexes_every_nesting_level() {
        let tree = sample_tree();
        let index = TypeIndex::build(&tree).unwrap();

        let paths: Vec<&str> = index.paths().collect();
        assert_eq!(
            paths,
            vec![
                "acme.v1.Outer",
                "acme.v1.Outer.Inner",
                "acme.v1.Outer.Inner.Kind",
                "acme.v1.Status",
            ]
        );
        assert!(index.message("acme.v1.Outer.Inner").is_some());
        assert!(index.enum_type("acme.v1.Outer.Inner.Kind").is_some());
        assert!(index.enum_type("acme.v1.Outer").is_none());
        assert_eq!(index.get("acme.v1.Status").unwrap().file, "default/default.proto");
    }

    #[test]
    fn lookup_is_exact() {
        let tree = sample_tree();
        let index = TypeIndex::build(&tree).unwrap();
        assert!(index.get("Outer").is_none());
        assert!(index.get("v1.Outer").is_none());
    }

    #[test]
    fn duplicate_paths_fail() {
        let tree = SchemaTree::new()
            .with_file(SchemaFile::new("a.proto", "p").with_message(MessageType::new("Dup")))
            .with_file(SchemaFile::new("b.proto", "p").with_enum(EnumType::new("Dup")));

        match TypeIndex::build(&tree) {
            Err(LoadError::DuplicateTypePath(path)) => assert_eq!(path, "p.Dup"),
            other => panic!("expected duplicate path error, got {:?}", other),
        }
    }

    #[test]
    fn root_package_has_no_leading_dot() {
        let tree = SchemaTree::from_file(SchemaFile::new("x.proto", "").with_message(MessageType::new("Foo")));
        let index = TypeIndex::build(&tree).unwrap();
        assert!(index.contains("Foo"));
    }

    #[test]
    fn resolves_relative_and_absolute_references() {
        let tree = sample_tree();
        let index = TypeIndex::build(&tree).unwrap();

        assert_eq!(index.resolve("Inner", "acme.v1.Outer").as_deref(), Some("acme.v1.Outer.Inner"));
        assert_eq!(index.resolve("Status", "acme.v1.Outer.Inner").as_deref(), Some("acme.v1.Status"));
        assert_eq!(index.resolve(".acme.v1.Status", "").as_deref(), Some("acme.v1.Status"));
        assert_eq!(index.resolve("Outer.Inner.Kind", "acme.v1").as_deref(), Some("acme.v1.Outer.Inner.Kind"));
        assert_eq!(index.resolve("string", "anything").as_deref(), Some("string"));
        assert!(index.resolve("Missing", "acme.v1.Outer").is_none());
        assert!(index.resolve(".Status", "").is_none());
    }

    #[test]
    fn dotted_reference_stops_at_first_matching_scope() {
        let tree = SchemaTree::from_file(
            SchemaFile::new("scope.proto", "acme")
                .with_message(
                    MessageType::new("Inner").with_enum(EnumType::new("Kind").with_constant("UNKNOWN", 0)),
                )
                .with_message(MessageType::new("Outer").with_message(MessageType::new("Inner"))),
        );
        let index = TypeIndex::build(&tree).unwrap();

        // Outer.Inner shadows acme.Inner and has no Kind
        assert!(index.resolve("Inner.Kind", "acme.Outer").is_none());
        assert_eq!(index.resolve("Inner.Kind", "acme").as_deref(), Some("acme.Inner.Kind"));
        assert_eq!(index.resolve("Inner", "acme.Outer").as_deref(), Some("acme.Outer.Inner"));
        assert_eq!(index.resolve("acme.Inner.Kind", "acme.Outer").as_deref(), Some("acme.Inner.Kind"));
    }

    #[test]
    fn resolves_map_references() {
        let tree = sample_tree();
        let index = TypeIndex::build(&tree).unwrap();

        assert!(index.is_resolvable("map<string, Status>", "acme.v1.Outer"));
        assert!(!index.is_resolvable("map<string, Nope>", "acme.v1.Outer"));
    }
}
