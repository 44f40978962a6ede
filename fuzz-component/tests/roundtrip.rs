use fuzz_component::{components, Component, ComponentKind, Error, Node, Path, Query, Request};
use http::Method;

fn sample() -> Request {
    Request::new(
        Method::POST,
        "http://shop.example.com:8080/api/v1/items?sort=price&limit=20&tag=a&tag=b",
    )
    .unwrap()
    .with_header("User-Agent", "fuzzer/0.1")
    .unwrap()
    .with_header("Cookie", "session=deadbeef; lang=en")
    .unwrap()
    .with_header("Content-Type", "application/json")
    .unwrap()
    .with_body(r#"{"name":"lamp","price":12.5,"stock":{"warehouse":3}}"#)
}

fn keys(component: &dyn Component<'_>) -> Vec<(String, Node)> {
    let mut out = Vec::new();
    component
        .iterate(&mut |k, v| {
            out.push((k.to_string(), v.clone()));
            Ok(())
        })
        .unwrap();
    out
}

#[test]
fn unmodified_rebuild_is_identity() {
    let request = sample();
    for mut component in components() {
        assert!(component.parse(&request).unwrap(), "{}", component.name());
        let rebuilt = component.rebuild().unwrap();
        assert_eq!(rebuilt, request, "{} changed the request", component.name());
    }
}

#[test]
fn mutations_only_touch_their_part() {
    let request = sample();
    let mut query = Query::new();
    query.parse(&request).unwrap();
    query.set_value("limit", "-1").unwrap();
    let rebuilt = query.rebuild().unwrap();

    assert_eq!(rebuilt.query(), Some("sort=price&limit=-1&tag=a&tag=b"));
    assert_eq!(rebuilt.path(), request.path());
    assert_eq!(rebuilt.headers(), request.headers());
    assert_eq!(rebuilt.body(), request.body());
}

#[test]
fn every_key_can_be_fuzzed_in_turn() {
    let request = sample();
    let mut rebuilt = Vec::new();
    for kind in ComponentKind::ALL {
        let mut component = fuzz_component::new_component(kind);
        if !component.parse(&request).unwrap() {
            continue;
        }
        for (key, _) in keys(component.as_ref()) {
            // Each mutation starts from a clean parse of the same request.
            component.parse(&request).unwrap();
            component.set_value(&key, "FUZZ").unwrap();
            let mutated = component.rebuild().unwrap();
            assert_ne!(mutated, request, "{} {}", kind, key);
            rebuilt.push(format!("{}:{}", kind, key));
        }
    }
    assert_eq!(
        rebuilt,
        vec![
            "query:sort",
            "query:limit",
            "query:tag",
            "header:user-agent",
            "header:cookie",
            "header:content-type",
            "cookie:session",
            "cookie:lang",
            "body:name",
            "body:price",
            "body:stock",
        ]
    );
}

#[test]
fn nested_json_member_is_replaced_whole() {
    let request = sample();
    let mut body = fuzz_component::Body::new();
    body.parse(&request).unwrap();
    body.set_value("stock", "none").unwrap();
    body.set_value("price", "0").unwrap();
    assert_eq!(
        body.rebuild().unwrap().body(),
        r#"{"name":"lamp","price":0,"stock":"none"}"#
    );
}

#[test]
fn delete_missing_is_idempotent() {
    let request = sample();
    let mut query = Query::new();
    query.parse(&request).unwrap();
    let before = keys(&query);
    for _ in 0..3 {
        assert!(matches!(query.delete("nope"), Err(Error::KeyNotFound(_))));
    }
    assert_eq!(keys(&query), before);
}

#[test]
fn path_component_is_pass_through() {
    let request = Request::get("http://example.com/a/b").unwrap();
    let mut path = Path::new();
    assert!(path.parse(&request).unwrap());
    assert!(keys(&path).is_empty());
    assert!(matches!(
        path.set_value("missing", "x"),
        Err(Error::KeyNotFound(_))
    ));
    assert_eq!(path.rebuild().unwrap().path(), "/a/b");
}

#[test]
fn rebuilt_request_renders() {
    let request = Request::get("http://example.com/search?q=1").unwrap();
    let mut query = Query::new();
    query.parse(&request).unwrap();
    query.set_value("q", "a&b").unwrap();
    assert_eq!(
        query.rebuild().unwrap().to_string(),
        "GET /search?q=a%26b HTTP/1.1\r\nHost: example.com\r\n\r\n"
    );
}
