//! Benchmarks for the compatibility analyzer
//!
//! Measures indexing and analysis over large generated schemas, the shape
//! produced when a big XML schema is converted to protobuf.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use protogate_core::{EnumType, FieldDef, MessageType, SchemaFile, SchemaTree, TypeIndex};
use protogate_engine::CompatibilityAnalyzer;

/// Generate a schema with N messages, each with a nested message and enum
fn generate_schema(num_messages: usize, fields_per_message: u32, shift_tags: bool) -> SchemaTree {
    let mut file = SchemaFile::new("generated/generated.proto", "bench.generated");

    for i in 0..num_messages {
        let mut message = MessageType::new(format!("Message{}", i)).with_reserved_range(1000, 1999);

        for f in 0..fields_per_message {
            let tag = if shift_tags { f + 2 } else { f + 1 };
            message = message.with_field(FieldDef::new(format!("field_{}", f), tag, "string"));
        }

        let nested = MessageType::new("Nested")
            .with_field(FieldDef::new("value", 1, "int64"))
            .with_field(FieldDef::new("label", 2, "string").in_oneof("kind"));

        let status = EnumType::new("Status")
            .with_constant("STATUS_UNSPECIFIED", 0)
            .with_constant("STATUS_ACTIVE", 1)
            .with_constant("STATUS_RETIRED", 2);

        file = file.with_message(message.with_message(nested).with_enum(status));
    }

    SchemaTree::from_file(file)
}

fn bench_type_index(c: &mut Criterion) {
    let mut group = c.benchmark_group("type_index");

    for size in [100, 1_000, 5_000].iter() {
        let tree = generate_schema(*size, 20, false);
        group.bench_with_input(BenchmarkId::from_parameter(size), &tree, |b, tree| {
            b.iter(|| TypeIndex::build(black_box(tree)).map(|index| index.len()))
        });
    }

    group.finish();
}

fn bench_analyze_identical(c: &mut Criterion) {
    let mut group = c.benchmark_group("analyze_identical");

    for size in [100, 1_000, 5_000].iter() {
        let tree = generate_schema(*size, 20, false);
        let Ok(old) = TypeIndex::build(&tree) else { continue };
        let Ok(new) = TypeIndex::build(&tree) else { continue };

        group.bench_with_input(BenchmarkId::from_parameter(size), &(old, new), |b, (old, new)| {
            b.iter(|| CompatibilityAnalyzer::analyze(black_box(old), black_box(new)))
        });
    }

    group.finish();
}

fn bench_analyze_renumbered(c: &mut Criterion) {
    let mut group = c.benchmark_group("analyze_renumbered");

    for size in [100, 1_000].iter() {
        let old_tree = generate_schema(*size, 50, false);
        let new_tree = generate_schema(*size, 50, true);
        let Ok(old) = TypeIndex::build(&old_tree) else { continue };
        let Ok(new) = TypeIndex::build(&new_tree) else { continue };

        group.bench_with_input(BenchmarkId::from_parameter(size), &(old, new), |b, (old, new)| {
            b.iter(|| CompatibilityAnalyzer::analyze(black_box(old), black_box(new)))
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_type_index,
    bench_analyze_identical,
    bench_analyze_renumbered
);
criterion_main!(benches);
