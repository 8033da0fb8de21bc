use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use dalgen::schema::{
    Attribute, AttributeKind, Format, HighCardinality, LowCardinality, Method, MethodImplementation,
    Relationship,
};
use dalgen::{ClassInfoMap, Emitter, Generator, GeneratorConfig, RuntimeContract, Schema, SchemaClass};

/// Chain of classes, each inheriting from the previous one and referencing its neighbours.
fn synthetic_schema(size: usize) -> Schema {
    let classes = (0..size).map(|i| {
        let mut class = SchemaClass::new(format!("Class{i}"))
            .with_description(format!("Synthetic class number {i}"))
            .with_attribute(Attribute::new("id", AttributeKind::U64).with_format(Format::Hex))
            .with_attribute(Attribute::new("tags", AttributeKind::String).multi_value())
            .with_attribute(Attribute::new("state", AttributeKind::Enum).with_range("on,off,standby"))
            .with_method(Method::new("lookup").with_implementation(MethodImplementation::cpp(
                format!("const Class{}* lookup() const", (i + 1) % size),
                "ADD_ALGO_1\nBEGIN_PRIVATE_SECTION\nmutable int m_hits = 0;\nEND_PRIVATE_SECTION\nreturn nullptr;",
            )));
        if i > 0 {
            class = class
                .with_superclass(format!("Class{}", i - 1))
                .with_relationship(
                    Relationship::new("previous", format!("Class{}", i - 1))
                        .with_cardinality(LowCardinality::One, HighCardinality::One),
                );
        }
        if i + 1 < size {
            class = class.with_relationship(
                Relationship::new("next", format!("Class{}", i + 1))
                    .with_cardinality(LowCardinality::Zero, HighCardinality::Many),
            );
        }
        class
    });
    Schema::from_classes(classes).unwrap()
}

fn config_for(size: usize) -> GeneratorConfig {
    (0..size).fold(
        GeneratorConfig::new()
            .with_schema_file("synthetic.json")
            .with_namespace("bench")
            .with_include_prefix("bench/dal"),
        |config, i| config.with_class(format!("Class{i}")),
    )
}

fn bench_emit_class(c: &mut Criterion) {
    let schema = synthetic_schema(50);
    let map = ClassInfoMap::new();
    let runtime = RuntimeContract::default();
    let emitter = Emitter::new(&schema, &map, "bench", "bench/dal", &runtime);
    let class = schema.find_class("Class25").unwrap();

    c.bench_function("emit_class", |b| {
        b.iter(|| black_box(emitter.emit_class(black_box(class))));
    });
}

fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("render");

    for size in [10, 100, 500].iter() {
        let schema = synthetic_schema(*size);

        let sequential = Generator::new(config_for(*size));
        group.bench_with_input(BenchmarkId::new("sequential", size), size, |b, _| {
            b.iter(|| black_box(sequential.render(&schema).unwrap()));
        });

        let parallel = Generator::new(config_for(*size).with_parallel(None));
        group.bench_with_input(BenchmarkId::new("parallel", size), size, |b, _| {
            b.iter(|| black_box(parallel.render(&schema).unwrap()));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_emit_class, bench_render);
criterion_main!(benches);
