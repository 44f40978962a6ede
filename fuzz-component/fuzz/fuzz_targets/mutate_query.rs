#![no_main]

use fuzz_component::{Component, Query, Request};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        let request = Request::get("http://example.com/?a=1&b=2").unwrap();
        let mut query = Query::new();
        query.parse(&request).unwrap();
        query.set_value("a", s).unwrap();
        let rebuilt = query.rebuild().unwrap();

        let mut reparsed = Query::new();
        reparsed.parse(&rebuilt).unwrap();
        assert_eq!(
            reparsed.value().parsed().get("a"),
            Some(&fuzz_component::Node::String(s.to_string()))
        );
    }
});
