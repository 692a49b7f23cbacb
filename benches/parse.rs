use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use strata::{strata, Value};

fn flat_document(entries: usize) -> String {
    let mut text = String::new();
    for i in 0..entries {
        text.push_str(&format!("key_{i}: value_{i}\n"));
    }
    text
}

fn nested_document(rows: usize) -> String {
    let mut text = String::from("rows\n");
    for i in 0..rows {
        text.push_str(&format!("  - sku: A{i}\n    price: {i}.99\n    n: {i}\n"));
    }
    text
}

fn record_document(items: usize) -> String {
    let mut text = String::from(
        "$struct Demo.Point\n  int32 x\n  int32 y\n[Demo.Point] p\n  - 1\n  - 2\n",
    );
    for i in 0..items {
        text.push_str(&format!("extra_{i}: ({i}, {i})\n"));
    }
    text
}

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");
    for size in [10usize, 100, 1000] {
        let flat = flat_document(size);
        group.bench_with_input(BenchmarkId::new("flat", size), &flat, |b, text| {
            b.iter(|| strata::from_str(black_box(text)).unwrap());
        });

        let nested = nested_document(size);
        group.bench_with_input(BenchmarkId::new("nested", size), &nested, |b, text| {
            b.iter(|| strata::from_str(black_box(text)).unwrap());
        });

        let typed = record_document(size);
        group.bench_with_input(BenchmarkId::new("typed", size), &typed, |b, text| {
            b.iter(|| strata::from_str(black_box(text)).unwrap());
        });
    }
    group.finish();
}

fn bench_write(c: &mut Criterion) {
    let mut group = c.benchmark_group("write");
    for size in [10usize, 100, 1000] {
        let doc = strata::from_str(&nested_document(size)).unwrap();
        let value = doc.into_value();
        group.bench_with_input(BenchmarkId::new("nested", size), &value, |b, value| {
            b.iter(|| strata::to_string(black_box(value)).unwrap());
        });
    }

    let small = strata!({
        "name": "demo",
        "point": { "x": 1, "y": 2 },
        "tags": ["a", "b", "c"]
    });
    group.bench_function("small", |b| {
        b.iter(|| strata::to_string(black_box(&small)).unwrap());
    });
    group.finish();
}

fn bench_conversions(c: &mut Criterion) {
    let doc = strata::from_str("a: 12345\nb: 1.25\nc: true").unwrap();
    let value = Value::Map(doc.into_root());
    c.bench_function("scalar_conversions", |b| {
        b.iter(|| {
            let a = black_box(&value).get("a").unwrap().to_i64().unwrap();
            let f = value.get("b").unwrap().to_f64().unwrap();
            let t = value.get("c").unwrap().to_bool().unwrap();
            (a, f, t)
        });
    });
}

criterion_group!(benches, bench_parse, bench_write, bench_conversions);
criterion_main!(benches);
