#![no_main]

use libfuzzer_sys::fuzz_target;
use vague::config::Preferences;
use vague::localization::Language;

fuzz_target!(|data: &[u8]| {
    if let Ok(raw) = std::str::from_utf8(data) {
        // Decoding never fails; whatever comes out must encode again
        let prefs = Preferences::decode(raw, Language::En);
        let encoded = prefs.encode().unwrap();
        assert_eq!(Preferences::decode(&encoded, Language::Fr), prefs);
    }
});
