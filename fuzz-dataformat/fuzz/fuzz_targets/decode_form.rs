#![no_main]

use fuzz_dataformat::{DataFormat, Form};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        if let Ok(kv) = Form.decode(s) {
            // Untouched pairs go back out exactly; only empty segments are dropped.
            let encoded = Form.encode(&kv).unwrap();
            let expected: Vec<&str> = s.split('&').filter(|p| !p.is_empty()).collect();
            assert_eq!(encoded, expected.join("&"));

            let again = Form.decode(&encoded).unwrap();
            assert_eq!(again.as_map(), kv.as_map());
        }
    }
});
