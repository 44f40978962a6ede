#![no_main]

use fuzz_component::{Component, Path, Request};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        let request = Request::get("http://example.com/").unwrap();
        let mut base = request.clone();
        base.set_raw_path(Some(s.to_string()));

        let mut path = Path::new();
        path.parse(&base).unwrap();
        // Whatever path went in must come back out unchanged.
        let rebuilt = path.rebuild().unwrap();
        assert_eq!(rebuilt.path(), s);
    }
});
