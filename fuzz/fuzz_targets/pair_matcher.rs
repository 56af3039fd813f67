#![no_main]

use arbitrary::Arbitrary;
use chrono::DateTime;
use libfuzzer_sys::fuzz_target;

use runwatch_core::types::JobEvent;
use runwatch_matcher::PairMatcher;

/// 퍼저용 구조적 입력
#[derive(Arbitrary, Debug)]
struct FuzzInput {
    started: FuzzEvent,
    /// 종료 이벤트 후보 (최대 32개로 제한)
    finished: Vec<FuzzEvent>,
}

#[derive(Arbitrary, Debug)]
struct FuzzEvent {
    /// 작은 id 공간에서 골라 충돌을 유도
    id: u8,
    job_type: String,
    host: String,
    /// 초 단위 (약 ±68년)
    timestamp: i32,
}

impl FuzzEvent {
    fn to_event(&self, state: &str) -> JobEvent {
        JobEvent {
            id: format!("job-{}", self.id % 4),
            state: state.to_owned(),
            job_type: self.job_type.clone(),
            host: self.host.clone(),
            timestamp: DateTime::from_timestamp_millis(i64::from(self.timestamp) * 1_000)
                .unwrap_or_default(),
        }
    }
}

fuzz_target!(|input: FuzzInput| {
    let started = input.started.to_event("STARTED");
    let finished: Vec<JobEvent> = input
        .finished
        .iter()
        .take(32)
        .map(|e| e.to_event("FINISHED"))
        .collect();

    let matcher = PairMatcher::new();
    match matcher.pair(&started, &finished) {
        Ok(pair) => {
            // 선택된 이벤트는 조건을 만족하는 첫 번째 후보
            assert!(PairMatcher::is_candidate(&started, pair.finished));
            let first = finished
                .iter()
                .position(|f| PairMatcher::is_candidate(&started, f));
            assert!(first.is_some_and(|i| std::ptr::eq(&finished[i], pair.finished)));
            assert_eq!(
                pair.duration_ms,
                pair.finished.timestamp.timestamp_millis() - started.timestamp.timestamp_millis()
            );
        }
        Err(_) => {
            assert!(!finished.iter().any(|f| PairMatcher::is_candidate(&started, f)));
        }
    }
});
