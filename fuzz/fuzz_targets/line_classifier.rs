#![no_main]

use libfuzzer_sys::fuzz_target;
use runwatch_matcher::{Classification, LineClassifier};

fuzz_target!(|data: &[u8]| {
    let mut classifier = LineClassifier::default();
    let mut accepted = 0usize;
    for line in data.split(|b| *b == b'\n') {
        if classifier.classify_bytes(line) != Classification::Dropped {
            accepted += 1;
        }
    }

    // 모든 라인은 정확히 한 곳에만 반영됨
    let events = classifier.into_events();
    assert_eq!(events.started().len() + events.finished().len(), accepted);
    assert_eq!(
        events.lines_read(),
        accepted as u64 + events.lines_dropped()
    );
    assert!(events.started().iter().all(|e| e.is_started()));
    assert!(events.finished().iter().all(|e| !e.is_started()));
});
