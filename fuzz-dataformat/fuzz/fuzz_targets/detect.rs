#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        if let Some((format, kv)) = fuzz_dataformat::detect(s) {
            // Whatever was detected must encode again.
            let _ = format.encode(&kv).unwrap();
        }
    }
});
