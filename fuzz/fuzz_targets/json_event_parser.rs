#![no_main]

use libfuzzer_sys::fuzz_target;
use runwatch_core::pipeline::EventParser;
use runwatch_matcher::parser::JsonEventParser;

fuzz_target!(|data: &[u8]| {
    let parser = JsonEventParser::default();
    if let Ok(event) = parser.parse(data) {
        assert!(!event.id.is_empty());
    }
});
