//! Compatibility analyzer
//!
//! Matches types across two schema versions by qualified path, then matches
//! fields (and enum constants) by name. Name is the durable identity: a tag
//! or value may change between versions, a name may not.
//!
//! Reservations are side predicates evaluated during matching. Oneof
//! membership and declaration order are never part of identity.

use std::collections::BTreeMap;

use protogate_core::{
    EnumConstant, EnumType, FieldDef, Finding, FindingKind, Location, MessageType, Reservations,
    TypeDef, TypeIndex, Verdict,
};

/// Something matched by name inside a message or enum
trait Member {
    fn name(&self) -> &str;
    fn number(&self) -> i64;
}

impl Member for FieldDef {
    fn name(&self) -> &str {
        &self.name
    }

    fn number(&self) -> i64 {
        i64::from(self.tag)
    }
}

impl Member for EnumConstant {
    fn name(&self) -> &str {
        &self.name
    }

    fn number(&self) -> i64 {
        i64::from(self.value)
    }
}

/// Wording and finding codes for one member kind
struct Rules {
    member: &'static str,
    number: &'static str,
    removed: FindingKind,
    conflict: FindingKind,
    number_reuse: FindingKind,
}

const FIELD_RULES: Rules = Rules {
    member: "Field",
    number: "tag",
    removed: FindingKind::RemovedField,
    conflict: FindingKind::TagConflict,
    number_reuse: FindingKind::ReservedTagReuse,
};

const CONSTANT_RULES: Rules = Rules {
    member: "Constant",
    number: "value",
    removed: FindingKind::RemovedEnumConstant,
    conflict: FindingKind::ValueConflict,
    number_reuse: FindingKind::ReservedValueReuse,
};

/// One version of a message/enum as seen by the member matcher
struct Side<'a, M> {
    members: &'a [M],
    reserved: &'a Reservations,
    /// Duplicate numbers are legal (enum `allow_alias`)
    allow_alias: bool,
}

impl<'a, M: Member> Side<'a, M> {
    fn by_name(&self) -> BTreeMap<&'a str, &'a M> {
        self.members.iter().map(|m| (m.name(), m)).collect()
    }

    /// Another live member (not `name`) holding `number`
    fn live_holder(&self, number: i64, name: &str) -> Option<&'a M> {
        if self.allow_alias {
            return None;
        }
        self.members
            .iter()
            .find(|m| m.number() == number && m.name() != name)
    }
}

/// Outcome of matching one member name across versions
enum MemberMatch<'a, M> {
    /// Removed with both its number and name reserved in the candidate
    Retired { old: &'a M },

    /// Removed or renamed without full reservation
    Removed {
        old: &'a M,
        number_reserved: bool,
        name_reserved: bool,
    },

    /// Present in both versions
    Retained { old: &'a M, new: &'a M },

    /// Present only in the candidate
    Added { new: &'a M },
}

/// Where a reserved number was declared
enum ReservedIn {
    Baseline,
    Candidate,
}

impl std::fmt::Display for ReservedIn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Baseline => write!(f, "baseline"),
            Self::Candidate => write!(f, "candidate"),
        }
    }
}

fn reserved_in(number: i64, old: &Reservations, new: &Reservations) -> Option<(ReservedIn, String)> {
    if let Some(range) = old.range_containing(number) {
        return Some((ReservedIn::Baseline, range.to_string()));
    }
    new.range_containing(number)
        .map(|range| (ReservedIn::Candidate, range.to_string()))
}

/// The compatibility analysis engine
///
/// Deterministic and pure: no I/O, no shared state. The same pair of indexes
/// always yields the same verdict.
#[derive(Debug, Clone, Copy, Default)]
pub struct CompatibilityAnalyzer;

impl CompatibilityAnalyzer {
    /// Analyze a baseline index against a candidate index
    pub fn analyze(old: &TypeIndex<'_>, new: &TypeIndex<'_>) -> Verdict {
        Verdict::from_findings(Self::findings(old, new))
    }

    /// Every violation, ordered by type path, rule step, then member name
    pub fn findings(old: &TypeIndex<'_>, new: &TypeIndex<'_>) -> Vec<Finding> {
        let mut findings = Vec::new();

        tracing::debug!(
            baseline_types = old.len(),
            candidate_types = new.len(),
            "analyzing schema compatibility"
        );

        for entry in old.iter() {
            let location = Location::new(entry.file);
            let before = findings.len();

            match (entry.def, new.get(&entry.path).map(|e| e.def)) {
                (def, None) => {
                    findings.push(
                        Finding::new(
                            FindingKind::RemovedType,
                            &entry.path,
                            format!("{} '{}' was removed", capitalize(def.kind_name()), entry.path),
                        )
                        .with_location(location.clone()),
                    );
                }
                (TypeDef::Message(old_msg), Some(TypeDef::Message(new_msg))) => {
                    compare_messages(&entry.path, old_msg, new_msg, &mut findings);
                }
                (TypeDef::Enum(old_enum), Some(TypeDef::Enum(new_enum))) => {
                    compare_enums(&entry.path, old_enum, new_enum, &mut findings);
                }
                (old_def, Some(new_def)) => {
                    findings.push(
                        Finding::new(
                            FindingKind::RemovedType,
                            &entry.path,
                            format!(
                                "{} '{}' changed kind from {} to {}",
                                capitalize(old_def.kind_name()),
                                entry.path,
                                old_def.kind_name(),
                                new_def.kind_name()
                            ),
                        )
                        .with_comparison(old_def.kind_name(), new_def.kind_name()),
                    );
                }
            }

            for finding in &mut findings[before..] {
                if finding.location.is_none() {
                    finding.location = Some(location.clone());
                }
            }

            tracing::trace!(
                path = %entry.path,
                findings = findings.len() - before,
                "compared type"
            );
        }

        findings
    }
}

fn compare_messages(path: &str, old: &MessageType, new: &MessageType, findings: &mut Vec<Finding>) {
    // Oneof groups are structural only. Wrapping fields into a oneof,
    // moving them between groups or reordering members changes nothing here.
    compare_members(
        path,
        &FIELD_RULES,
        Side { members: &old.fields, reserved: &old.reserved, allow_alias: false },
        Side { members: &new.fields, reserved: &new.reserved, allow_alias: false },
        findings,
    );
}

fn compare_enums(path: &str, old: &EnumType, new: &EnumType, findings: &mut Vec<Finding>) {
    compare_members(
        path,
        &CONSTANT_RULES,
        Side { members: &old.constants, reserved: &old.reserved, allow_alias: old.allow_alias },
        Side { members: &new.constants, reserved: &new.reserved, allow_alias: new.allow_alias },
        findings,
    );
}

/// Name-keyed set reconciliation of two member lists
fn compare_members<M: Member>(
    path: &str,
    rules: &Rules,
    old: Side<'_, M>,
    new: Side<'_, M>,
    findings: &mut Vec<Finding>,
) {
    let old_by_name = old.by_name();
    let new_by_name = new.by_name();

    let removed_or_retained = old_by_name.iter().map(|(name, &old_member)| {
        match new_by_name.get(name) {
            Some(&new_member) => MemberMatch::Retained { old: old_member, new: new_member },
            None => {
                let number_reserved = new.reserved.reserves_number(old_member.number());
                let name_reserved = new.reserved.reserves_name(name);
                if number_reserved && name_reserved {
                    MemberMatch::Retired { old: old_member }
                } else {
                    MemberMatch::Removed { old: old_member, number_reserved, name_reserved }
                }
            }
        }
    });

    let added = new_by_name
        .iter()
        .filter(|(name, _)| !old_by_name.contains_key(*name))
        .map(|(_, &new_member)| MemberMatch::Added { new: new_member });

    let outcomes: Vec<MemberMatch<'_, M>> = removed_or_retained.chain(added).collect();

    // Removed first, then retained, then added; each group already name-ordered.
    let rank = |outcome: &MemberMatch<'_, M>| match outcome {
        MemberMatch::Retired { .. } | MemberMatch::Removed { .. } => 0,
        MemberMatch::Retained { .. } => 1,
        MemberMatch::Added { .. } => 2,
    };
    let mut ordered: Vec<&MemberMatch<'_, M>> = outcomes.iter().collect();
    ordered.sort_by_key(|outcome| rank(*outcome));

    for outcome in ordered {
        match *outcome {
            MemberMatch::Retired { old: member } => {
                tracing::debug!(
                    path,
                    member = member.name(),
                    number = member.number(),
                    "member retired with full reservation"
                );
            }
            MemberMatch::Removed { old: member, number_reserved, name_reserved } => {
                let missing = if number_reserved {
                    "its name is not reserved".to_string()
                } else if name_reserved {
                    format!("its {} is not reserved", rules.number)
                } else {
                    format!("neither its {} nor its name is reserved", rules.number)
                };
                findings.push(
                    Finding::new(
                        rules.removed,
                        path,
                        format!(
                            "{} '{}' ({} {}) was removed or renamed and {}",
                            rules.member,
                            member.name(),
                            rules.number,
                            member.number(),
                            missing
                        ),
                    )
                    .with_member(member.name(), member.number()),
                );
            }
            MemberMatch::Retained { old: before, new: member } => {
                let number = member.number();
                let conflict = reserved_in(number, old.reserved, new.reserved)
                    .map(|(side, range)| {
                        format!("{} {} is reserved in the {} (reserved {})", rules.number, number, side, range)
                    })
                    .or_else(|| {
                        new.live_holder(number, member.name()).map(|holder| {
                            format!("{} {} is also used by '{}'", rules.number, number, holder.name())
                        })
                    });

                if let Some(reason) = conflict {
                    findings.push(
                        Finding::new(
                            rules.conflict,
                            path,
                            format!("{} '{}': {}", rules.member, member.name(), reason),
                        )
                        .with_member(member.name(), number)
                        .with_comparison(before.number().to_string(), number.to_string()),
                    );
                } else if before.number() != number {
                    tracing::debug!(
                        path,
                        member = member.name(),
                        from = before.number(),
                        to = number,
                        "{} changed, identity kept by name",
                        rules.number
                    );
                }
            }
            MemberMatch::Added { new: member } => {
                let number = member.number();
                let reuse = reserved_in(number, old.reserved, new.reserved)
                    .map(|(side, range)| {
                        format!("{} {} is reserved in the {} (reserved {})", rules.number, number, side, range)
                    })
                    .or_else(|| {
                        new.live_holder(number, member.name()).map(|holder| {
                            format!("{} {} is already used by '{}'", rules.number, number, holder.name())
                        })
                    });

                if let Some(reason) = reuse {
                    findings.push(
                        Finding::new(
                            rules.number_reuse,
                            path,
                            format!("New {} '{}': {}", rules.member.to_lowercase(), member.name(), reason),
                        )
                        .with_member(member.name(), number),
                    );
                }

                let side = if old.reserved.reserves_name(member.name()) {
                    Some(ReservedIn::Baseline)
                } else if new.reserved.reserves_name(member.name()) {
                    Some(ReservedIn::Candidate)
                } else {
                    None
                };

                if let Some(side) = side {
                    findings.push(
                        Finding::new(
                            FindingKind::ReservedNameReuse,
                            path,
                            format!(
                                "New {} '{}': name is reserved in the {}",
                                rules.member.to_lowercase(),
                                member.name(),
                                side
                            ),
                        )
                        .with_member(member.name(), number),
                    );
                }
            }
        }
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use protogate_core::{SchemaFile, SchemaTree};

    fn tree(message: MessageType) -> SchemaTree {
        SchemaTree::from_file(SchemaFile::new("default/default.proto", "default").with_message(message))
    }

    fn enum_tree(enum_type: EnumType) -> SchemaTree {
        SchemaTree::from_file(SchemaFile::new("default/default.proto", "default").with_enum(enum_type))
    }

    fn run(old: &SchemaTree, new: &SchemaTree) -> Verdict {
        let old_index = TypeIndex::build(old).unwrap();
        let new_index = TypeIndex::build(new).unwrap();
        CompatibilityAnalyzer::analyze(&old_index, &new_index)
    }

    fn kinds(verdict: &Verdict) -> Vec<FindingKind> {
        verdict.findings.iter().map(|f| f.kind).collect()
    }

    fn foo() -> MessageType {
        MessageType::new("Foo")
    }

    #[test]
    fn pure_addition_is_compatible() {
        let old = tree(foo().with_field(FieldDef::new("a", 1, "string")));
        let new = tree(
            foo()
                .with_field(FieldDef::new("a", 1, "string"))
                .with_field(FieldDef::new("b", 2, "string")),
        );

        let verdict = run(&old, &new);
        assert!(verdict.compatible);
        assert!(verdict.findings.is_empty());
    }

    #[test]
    fn unreserved_removal_is_breaking() {
        let old = tree(
            foo()
                .with_field(FieldDef::new("a", 1, "string"))
                .with_field(FieldDef::new("b", 2, "string")),
        );
        let new = tree(foo().with_field(FieldDef::new("a", 1, "string")));

        let verdict = run(&old, &new);
        assert!(!verdict.compatible);
        assert_eq!(kinds(&verdict), vec![FindingKind::RemovedField]);

        let finding = &verdict.findings[0];
        assert_eq!(finding.type_path, "default.Foo");
        assert_eq!(finding.member.as_deref(), Some("b"));
        assert_eq!(finding.number, Some(2));
        assert_eq!(finding.location, Some(Location::new("default/default.proto")));
    }

    #[test]
    fn fully_reserved_removal_is_compatible() {
        let old = tree(
            foo()
                .with_field(FieldDef::new("a", 1, "string"))
                .with_field(FieldDef::new("b", 2, "string")),
        );
        let new = tree(
            foo()
                .with_field(FieldDef::new("a", 1, "string"))
                .with_reserved_range(2, 2)
                .with_reserved_name("b"),
        );

        assert!(run(&old, &new).compatible);
    }

    #[test]
    fn half_reserved_removal_is_breaking() {
        let old = tree(
            foo()
                .with_field(FieldDef::new("a", 1, "string"))
                .with_field(FieldDef::new("b", 2, "string")),
        );

        let tag_only = tree(foo().with_field(FieldDef::new("a", 1, "string")).with_reserved_range(2, 5));
        let verdict = run(&old, &tag_only);
        assert_eq!(kinds(&verdict), vec![FindingKind::RemovedField]);
        assert!(verdict.findings[0].message.contains("its name is not reserved"));

        let name_only = tree(foo().with_field(FieldDef::new("a", 1, "string")).with_reserved_name("b"));
        let verdict = run(&old, &name_only);
        assert_eq!(kinds(&verdict), vec![FindingKind::RemovedField]);
        assert!(verdict.findings[0].message.contains("its tag is not reserved"));
    }

    #[test]
    fn reservation_in_baseline_only_does_not_retire() {
        // Only the candidate's reservations retire a removed field
        let old = tree(
            foo()
                .with_field(FieldDef::new("a", 1, "string"))
                .with_field(FieldDef::new("b", 2, "string"))
                .with_reserved_range(9, 9),
        );
        let new = tree(foo().with_field(FieldDef::new("a", 1, "string")));
        assert_eq!(kinds(&run(&old, &new)), vec![FindingKind::RemovedField]);
    }

    #[test]
    fn reserved_tag_reuse_is_breaking() {
        let old = tree(foo().with_field(FieldDef::new("a", 1, "string")).with_reserved_range(2, 2));
        let new = tree(
            foo()
                .with_field(FieldDef::new("a", 1, "string"))
                .with_field(FieldDef::new("b", 2, "string")),
        );

        let verdict = run(&old, &new);
        assert!(!verdict.compatible);
        assert_eq!(kinds(&verdict), vec![FindingKind::ReservedTagReuse]);
        assert_eq!(verdict.findings[0].number, Some(2));
        assert!(verdict.findings[0].message.contains("reserved in the baseline"));
    }

    #[test]
    fn reserved_tag_reuse_inside_range_regardless_of_name() {
        let old = tree(foo().with_field(FieldDef::new("a", 1, "string")).with_reserved_range(10, 20));
        let new = tree(
            foo()
                .with_field(FieldDef::new("a", 1, "string"))
                .with_field(FieldDef::new("anything", 15, "int32")),
        );
        assert_eq!(kinds(&run(&old, &new)), vec![FindingKind::ReservedTagReuse]);
    }

    #[test]
    fn reserved_name_reuse_is_breaking() {
        let old = tree(foo().with_field(FieldDef::new("a", 1, "string")).with_reserved_name("gone"));
        let new = tree(
            foo()
                .with_field(FieldDef::new("a", 1, "string"))
                .with_field(FieldDef::new("gone", 7, "string")),
        );

        let verdict = run(&old, &new);
        assert_eq!(kinds(&verdict), vec![FindingKind::ReservedNameReuse]);
    }

    #[test]
    fn tag_change_alone_is_compatible() {
        let old = tree(foo().with_field(FieldDef::new("a", 1, "string")));
        let new = tree(foo().with_field(FieldDef::new("a", 5, "string")));

        let verdict = run(&old, &new);
        assert!(verdict.compatible);
        assert!(verdict.findings.is_empty());
    }

    #[test]
    fn tag_change_into_reserved_range_conflicts() {
        let old = tree(
            foo()
                .with_field(FieldDef::new("a", 1, "string"))
                .with_reserved_range(4, 6),
        );
        let new = tree(foo().with_field(FieldDef::new("a", 5, "string")));

        let verdict = run(&old, &new);
        assert_eq!(kinds(&verdict), vec![FindingKind::TagConflict]);
        assert_eq!(verdict.findings[0].expected.as_deref(), Some("1"));
        assert_eq!(verdict.findings[0].actual.as_deref(), Some("5"));
    }

    #[test]
    fn retained_tag_colliding_with_live_field_conflicts() {
        let old = tree(
            foo()
                .with_field(FieldDef::new("a", 1, "string"))
                .with_field(FieldDef::new("b", 2, "string")),
        );
        // Candidate built without load validation: two live fields share tag 2
        let new = tree(
            foo()
                .with_field(FieldDef::new("a", 2, "string"))
                .with_field(FieldDef::new("b", 2, "string")),
        );

        assert_eq!(
            kinds(&run(&old, &new)),
            vec![FindingKind::TagConflict, FindingKind::TagConflict]
        );
    }

    #[test]
    fn rename_is_breaking() {
        let old = tree(foo().with_field(FieldDef::new("a", 1, "string")));
        let new = tree(foo().with_field(FieldDef::new("renamed", 1, "string")));

        let verdict = run(&old, &new);
        assert!(!verdict.compatible);
        assert_eq!(kinds(&verdict), vec![FindingKind::RemovedField]);
        assert_eq!(verdict.findings[0].member.as_deref(), Some("a"));
    }

    #[test]
    fn rename_into_reserved_tag_reports_both() {
        let old = tree(
            foo()
                .with_field(FieldDef::new("a", 1, "string"))
                .with_reserved_range(3, 3),
        );
        let new = tree(foo().with_field(FieldDef::new("renamed", 3, "string")));

        assert_eq!(
            kinds(&run(&old, &new)),
            vec![FindingKind::RemovedField, FindingKind::ReservedTagReuse]
        );
    }

    #[test]
    fn oneof_wrapping_is_neutral() {
        let old = tree(
            foo()
                .with_field(FieldDef::new("a", 1, "string"))
                .with_field(FieldDef::new("b", 2, "string")),
        );
        let new = tree(
            foo()
                .with_field(FieldDef::new("b", 2, "string").in_oneof("x"))
                .with_field(FieldDef::new("a", 1, "string").in_oneof("x")),
        );

        let verdict = run(&old, &new);
        assert!(verdict.compatible);
        assert!(verdict.findings.is_empty());
    }

    #[test]
    fn removed_type_reports_nested_types_individually() {
        let old = tree(
            foo()
                .with_message(MessageType::new("Inner").with_field(FieldDef::new("x", 1, "int32")))
                .with_enum(EnumType::new("Kind").with_constant("UNKNOWN", 0)),
        );
        let new = SchemaTree::from_file(SchemaFile::new("default/default.proto", "default"));

        let verdict = run(&old, &new);
        let paths: Vec<&str> = verdict.findings.iter().map(|f| f.type_path.as_str()).collect();
        assert_eq!(paths, vec!["default.Foo", "default.Foo.Inner", "default.Foo.Kind"]);
        assert!(verdict.findings.iter().all(|f| f.kind == FindingKind::RemovedType));
    }

    #[test]
    fn added_types_are_compatible() {
        let old = tree(foo());
        let new = tree(foo().with_message(MessageType::new("Added")))
            .with_file(SchemaFile::new("extra.proto", "other").with_enum(EnumType::new("E")));
        assert!(run(&old, &new).compatible);
    }

    #[test]
    fn nested_change_does_not_leak_into_parent() {
        let old = tree(
            foo()
                .with_field(FieldDef::new("a", 1, "string"))
                .with_message(MessageType::new("Inner").with_field(FieldDef::new("x", 1, "int32"))),
        );
        let new = tree(
            foo()
                .with_field(FieldDef::new("a", 1, "string"))
                .with_message(MessageType::new("Inner")),
        );

        let verdict = run(&old, &new);
        assert_eq!(verdict.findings.len(), 1);
        assert_eq!(verdict.findings[0].type_path, "default.Foo.Inner");
    }

    #[test]
    fn message_replaced_by_enum_is_removed() {
        let old = tree(foo());
        let new = enum_tree(EnumType::new("Foo").with_constant("A", 0));

        let verdict = run(&old, &new);
        assert_eq!(kinds(&verdict), vec![FindingKind::RemovedType]);
        assert!(verdict.findings[0].message.contains("changed kind from message to enum"));
    }

    #[test]
    fn enum_rules_mirror_field_rules() {
        let base = || EnumType::new("Color").with_constant("RED", 0).with_constant("GREEN", 1);

        // addition
        let verdict = run(&enum_tree(base()), &enum_tree(base().with_constant("BLUE", 2)));
        assert!(verdict.compatible);

        // removal
        let verdict = run(&enum_tree(base()), &enum_tree(EnumType::new("Color").with_constant("RED", 0)));
        assert_eq!(kinds(&verdict), vec![FindingKind::RemovedEnumConstant]);

        // retired removal
        let retired = EnumType::new("Color")
            .with_constant("RED", 0)
            .with_reserved_range(1, 1)
            .with_reserved_name("GREEN");
        assert!(run(&enum_tree(base()), &enum_tree(retired)).compatible);

        // value change
        let renumbered = EnumType::new("Color").with_constant("RED", 0).with_constant("GREEN", 7);
        assert!(run(&enum_tree(base()), &enum_tree(renumbered)).compatible);

        // rename
        let renamed = EnumType::new("Color").with_constant("RED", 0).with_constant("LIME", 1);
        assert_eq!(
            kinds(&run(&enum_tree(base()), &enum_tree(renamed))),
            vec![FindingKind::RemovedEnumConstant]
        );

        // reserved value reuse
        let reserved = base().with_reserved_range(5, 9);
        let reused = base().with_constant("BLUE", 6);
        assert_eq!(
            kinds(&run(&enum_tree(reserved), &enum_tree(reused))),
            vec![FindingKind::ReservedValueReuse]
        );
    }

    #[test]
    fn enum_aliases_are_not_collisions() {
        let old = EnumType::new("Mode").with_allow_alias(true).with_constant("ON", 1);
        let new = EnumType::new("Mode")
            .with_allow_alias(true)
            .with_constant("ON", 1)
            .with_constant("ENABLED", 1);
        assert!(run(&enum_tree(old), &enum_tree(new)).compatible);

        let old = EnumType::new("Mode").with_constant("ON", 1);
        let new = EnumType::new("Mode").with_constant("ON", 1).with_constant("ENABLED", 1);
        assert_eq!(
            kinds(&run(&enum_tree(old), &enum_tree(new))),
            vec![FindingKind::ValueConflict, FindingKind::ReservedValueReuse]
        );
    }

    #[test]
    fn findings_do_not_depend_on_declaration_order() {
        let old_a = tree(
            foo()
                .with_field(FieldDef::new("a", 1, "string"))
                .with_field(FieldDef::new("b", 2, "string"))
                .with_field(FieldDef::new("c", 3, "string")),
        );
        let old_b = tree(
            foo()
                .with_field(FieldDef::new("c", 3, "string"))
                .with_field(FieldDef::new("a", 1, "string"))
                .with_field(FieldDef::new("b", 2, "string")),
        );
        let new = tree(foo().with_field(FieldDef::new("z", 9, "string")));

        let first = run(&old_a, &new);
        let second = run(&old_b, &new);
        assert_eq!(first, second);
        assert_eq!(run(&old_a, &new), first);

        let members: Vec<&str> = first.findings.iter().filter_map(|f| f.member.as_deref()).collect();
        assert_eq!(members, vec!["a", "b", "c"]);
    }

    #[test]
    fn capitalize_words() {
        assert_eq!(capitalize("message"), "Message");
        assert_eq!(capitalize(""), "");
    }
}
