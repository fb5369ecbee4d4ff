use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use dynvar::{Identifier, PropertyObject, Value};
use std::sync::Arc;

fn bench_copy(c: &mut Criterion) {
    let mut group = c.benchmark_group("copy");

    let int = Value::from(42);
    group.bench_function("int", |b| b.iter(|| black_box(&int).clone()));

    let text = Value::from("a moderately long piece of text");
    group.bench_function("string", |b| b.iter(|| black_box(&text).clone()));

    let object = Value::object(Arc::new(PropertyObject::new()));
    group.bench_function("object", |b| b.iter(|| black_box(&object).clone()));

    group.finish();
}

fn bench_coercion(c: &mut Criterion) {
    let values = [
        ("int", Value::from(12345)),
        ("double", Value::from(1234.5678)),
        ("string", Value::from("  -9876.5e-1")),
    ];

    let mut group = c.benchmark_group("coerce");
    for (name, v) in &values {
        group.bench_with_input(BenchmarkId::new("to_double", name), v, |b, v| {
            b.iter(|| black_box(v).to_double())
        });
        group.bench_with_input(BenchmarkId::new("to_string", name), v, |b, v| {
            b.iter(|| black_box(v).to_string())
        });
    }
    group.finish();
}

fn bench_equality(c: &mut Criterion) {
    let a = Value::from(5);
    let b = Value::from("5");

    c.bench_function("equals_int_string", |bench| {
        bench.iter(|| black_box(&a).equals(black_box(&b)))
    });
}

fn bench_codec(c: &mut Criterion) {
    let mut group = c.benchmark_group("codec");

    for len in [8usize, 256, 4096] {
        let v = Value::from("x".repeat(len));
        let bytes = v.to_bytes().unwrap();
        group.throughput(Throughput::Bytes(bytes.len() as u64));

        group.bench_with_input(BenchmarkId::new("write_string", len), &v, |b, v| {
            b.iter(|| {
                let mut out = Vec::with_capacity(len + 8);
                v.write_to_stream(&mut out).unwrap();
                out
            })
        });
        group.bench_with_input(BenchmarkId::new("read_string", len), &bytes, |b, bytes| {
            b.iter(|| Value::from_bytes(black_box(bytes)).unwrap())
        });
    }

    group.finish();
}

fn bench_property_lookup(c: &mut Criterion) {
    let object = Arc::new(PropertyObject::new());
    for i in 0..16 {
        object.set_method(&Identifier::new(&format!("m{}", i)), |_, _| Value::null());
    }
    object.set_property(&Identifier::new("target"), Value::from(1));
    let v = Value::object(object);
    let name = Identifier::new("target");

    c.bench_function("get_property", |b| b.iter(|| v.get_property(black_box(&name))));
}

criterion_group!(
    benches,
    bench_copy,
    bench_coercion,
    bench_equality,
    bench_codec,
    bench_property_lookup
);
criterion_main!(benches);
