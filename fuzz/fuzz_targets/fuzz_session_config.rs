#![no_main]

use std::path::Path;

use libfuzzer_sys::fuzz_target;
use vague::config::parse_config;

fuzz_target!(|data: &[u8]| {
    if let Ok(yaml) = std::str::from_utf8(data) {
        // We don't care about the result, just that it doesn't panic
        let _ = parse_config(yaml, Path::new("fuzz.yaml"));
    }
});
