#![no_main]

use libfuzzer_sys::fuzz_target;
use vague::pattern::Pattern;
use vague::phase::clock::locate;

fuzz_target!(|data: &[u8]| {
    if let Ok(text) = std::str::from_utf8(data) {
        if let Ok(pattern) = text.parse::<Pattern>() {
            // Accepted patterns must be drivable and round-trip through Display
            assert!(pattern.cycle_ms() > 0);
            let reparsed: Pattern = pattern.to_string().parse().unwrap();
            assert_eq!(reparsed, pattern);

            let loc = locate(pattern.cycle_ms() / 2, &pattern);
            assert!((0.0..1.0).contains(&loc.phase_fraction));
        }
    }
});
