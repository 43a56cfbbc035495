use criterion::{criterion_group, criterion_main, Criterion};

use lightmark::{parse, Extensions};

fn short_inlines(c: &mut Criterion) {
    let mut group = c.benchmark_group("inlines");
    group.bench_function("lightmark", |b| {
        b.iter(|| {
            let content = "*this ***has some* various things* that** [create multiple elements](while/inline \"but without\") taking _too_ much ![effort] to parse, and should `be a decent` test` ``of ``whether this works quickly.";
            parse(content, Extensions::all())
        })
    });
    group.finish();
}

fn mixed_document(c: &mut Criterion) {
    let mut group = c.benchmark_group("documents");
    group.bench_function("lightmark", |b| {
        b.iter(|| {
            let content = include_str!("./sample.md");
            parse(content, Extensions::all())
        })
    });
    group.finish();
}

criterion_group!(benches, short_inlines, mixed_document);
criterion_main!(benches);
