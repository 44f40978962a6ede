use criterion::{criterion_group, criterion_main, Criterion};
use fuzz_component::{Body, Component, Query, Request};
use http::Method;

fn request() -> Request {
    let pairs: Vec<String> = (0..32).map(|i| format!("p{}=v{}", i, i)).collect();
    let members: Vec<String> = (0..32).map(|i| format!("\"k{}\":{}", i, i)).collect();
    Request::new(
        Method::POST,
        &format!("http://bench.example/items?{}", pairs.join("&")),
    )
    .unwrap()
    .with_header("Content-Type", "application/json")
    .unwrap()
    .with_body(format!("{{{}}}", members.join(",")))
}

fn rebuild_benchmark(c: &mut Criterion) {
    let request = request();

    c.bench_function("query_parse_set_rebuild", |b| {
        b.iter(|| {
            let mut query = Query::new();
            query.parse(&request).unwrap();
            query.set_value("p16", "FUZZ").unwrap();
            let _rebuilt = query.rebuild().unwrap();
        });
    });

    c.bench_function("json_body_parse_set_rebuild", |b| {
        b.iter(|| {
            let mut body = Body::new();
            body.parse(&request).unwrap();
            body.set_value("k16", "FUZZ").unwrap();
            let _rebuilt = body.rebuild().unwrap();
        });
    });
}

criterion_group!(benches, rebuild_benchmark);
criterion_main!(benches);
