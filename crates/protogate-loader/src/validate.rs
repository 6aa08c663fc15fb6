//! Load-time validation
//!
//! Structural checks that a schema must pass before it is compared. Every
//! violation is collected so a broken schema is reported in one go.

use std::collections::{BTreeSet, HashMap};
use std::sync::LazyLock;

use regex::Regex;
use protogate_core::index::qualify;
use protogate_core::schema::{MAX_FIELD_TAG, IMPLEMENTATION_RESERVED_TAGS};
use protogate_core::{
    EnumType, LoadError, MessageType, Reservations, SchemaTree, TypeIndex, ValidationIssue,
};

static IDENTIFIER: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").ok());

fn is_identifier(name: &str) -> bool {
    IDENTIFIER.as_ref().map_or(true, |regex| regex.is_match(name))
}

/// Validate a schema tree, failing with every issue found
pub fn validate(tree: &SchemaTree) -> Result<(), LoadError> {
    let issues = collect_issues(tree);

    if issues.is_empty() {
        Ok(())
    } else {
        tracing::debug!(issues = issues.len(), "Schema failed validation");
        Err(LoadError::Invalid(issues))
    }
}

/// Collect every validation issue in the tree
pub fn collect_issues(tree: &SchemaTree) -> Vec<ValidationIssue> {
    let mut validator = Validator::default();

    for file in &tree.files {
        for segment in &file.package {
            validator.check_identifier(&file.path, "package segment", segment);
        }

        let scope = file.package_name();
        for message in &file.messages {
            validator.message(&scope, message);
        }
        for enum_type in &file.enums {
            validator.enumeration(&scope, enum_type);
        }
    }

    // Reference resolution needs an index, which needs unique paths
    if validator.duplicates.is_empty() {
        if let Ok(index) = TypeIndex::build(tree) {
            validator.references(&index);
        }
    }

    validator.issues
}

#[derive(Default)]
struct Validator<'a> {
    issues: Vec<ValidationIssue>,
    paths: BTreeSet<String>,
    duplicates: BTreeSet<String>,
    /// (message path, field name, type reference) awaiting resolution
    references: Vec<(String, &'a str, &'a str)>,
}

impl<'a> Validator<'a> {
    fn check_identifier(&mut self, type_path: &str, what: &str, name: &str) {
        if !is_identifier(name) {
            self.issues.push(
                ValidationIssue::new(type_path, format!("'{}' is not a valid identifier", name))
                    .for_member(format!("{} {}", what, name)),
            );
        }
    }

    fn check_ranges(&mut self, type_path: &str, reserved: &Reservations) {
        for range in reserved.ranges.iter().filter(|r| r.start > r.end) {
            self.issues.push(ValidationIssue::new(
                type_path,
                format!("reserved range {} to {} is empty", range.start, range.end),
            ));
        }
    }

    fn register(&mut self, path: &str) {
        if !self.paths.insert(path.to_string()) && self.duplicates.insert(path.to_string()) {
            self.issues.push(ValidationIssue::new(path, "type path is declared more than once"));
        }
    }

    fn message(&mut self, scope: &str, message: &'a MessageType) {
        let path = qualify(scope, &message.name);
        self.register(&path);
        self.check_identifier(&path, "message", &message.name);
        self.check_ranges(&path, &message.reserved);

        let mut by_tag: HashMap<u32, &str> = HashMap::new();
        let mut names: BTreeSet<&str> = BTreeSet::new();

        for field in &message.fields {
            let member = format!("field {}", field.name);
            self.check_identifier(&path, "field", &field.name);

            let tag = i64::from(field.tag);
            if tag < 1 || tag > i64::from(MAX_FIELD_TAG) {
                self.issues.push(
                    ValidationIssue::new(&path, format!("tag {} is out of range 1 to {}", field.tag, MAX_FIELD_TAG))
                        .for_member(&member),
                );
            } else if i32::try_from(field.tag).is_ok_and(|t| IMPLEMENTATION_RESERVED_TAGS.contains(&t)) {
                self.issues.push(
                    ValidationIssue::new(&path, format!("tag {} is reserved for the protobuf implementation", field.tag))
                        .for_member(&member),
                );
            }

            if let Some(other) = by_tag.insert(field.tag, &field.name) {
                self.issues.push(
                    ValidationIssue::new(&path, format!("tag {} is already used by field '{}'", field.tag, other))
                        .for_member(&member),
                );
            }
            if !names.insert(&field.name) {
                self.issues.push(ValidationIssue::new(&path, "field name is declared more than once").for_member(&member));
            }

            if let Some(range) = message.reserved.range_containing(tag) {
                self.issues.push(
                    ValidationIssue::new(&path, format!("tag {} is reserved ({})", field.tag, range))
                        .for_member(&member),
                );
            }
            if message.reserved.reserves_name(&field.name) {
                self.issues.push(ValidationIssue::new(&path, "field name is reserved").for_member(&member));
            }

            self.references.push((path.clone(), field.name.as_str(), field.type_name.as_str()));
        }

        for oneof in &message.oneofs {
            self.check_identifier(&path, "oneof", &oneof.name);
            for member in &oneof.members {
                if message.field(member).is_none() {
                    self.issues.push(
                        ValidationIssue::new(&path, format!("oneof member '{}' is not a field", member))
                            .for_member(format!("oneof {}", oneof.name)),
                    );
                }
            }
        }

        for nested in &message.messages {
            self.message(&path, nested);
        }
        for enum_type in &message.enums {
            self.enumeration(&path, enum_type);
        }
    }

    fn enumeration(&mut self, scope: &str, enum_type: &EnumType) {
        let path = qualify(scope, &enum_type.name);
        self.register(&path);
        self.check_identifier(&path, "enum", &enum_type.name);
        self.check_ranges(&path, &enum_type.reserved);

        let mut by_value: HashMap<i32, &str> = HashMap::new();
        let mut names: BTreeSet<&str> = BTreeSet::new();

        for constant in &enum_type.constants {
            let member = format!("constant {}", constant.name);
            self.check_identifier(&path, "constant", &constant.name);

            if let Some(other) = by_value.insert(constant.value, &constant.name) {
                if !enum_type.allow_alias {
                    self.issues.push(
                        ValidationIssue::new(&path, format!("value {} is already used by constant '{}'", constant.value, other))
                            .for_member(&member),
                    );
                }
            }
            if !names.insert(&constant.name) {
                self.issues.push(ValidationIssue::new(&path, "constant name is declared more than once").for_member(&member));
            }

            if let Some(range) = enum_type.reserved.range_containing(i64::from(constant.value)) {
                self.issues.push(
                    ValidationIssue::new(&path, format!("value {} is reserved ({})", constant.value, range))
                        .for_member(&member),
                );
            }
            if enum_type.reserved.reserves_name(&constant.name) {
                self.issues.push(ValidationIssue::new(&path, "constant name is reserved").for_member(&member));
            }
        }
    }

    fn references(&mut self, index: &TypeIndex<'_>) {
        for (path, field, reference) in std::mem::take(&mut self.references) {
            if !index.is_resolvable(reference, &path) {
                self.issues.push(
                    ValidationIssue::new(&path, format!("type '{}' cannot be resolved", reference))
                        .for_member(format!("field {}", field)),
                );
            }
        }
    }
}
