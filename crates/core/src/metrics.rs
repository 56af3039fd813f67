//! 메트릭 상수 및 설명 등록
//!
//! 모든 메트릭의 이름과 설명을 중앙에서 정의합니다.
//! 각 모듈은 이 상수를 사용하여 `metrics::counter!()` 매크로를 호출합니다.
//!
//! # 네이밍 컨벤션
//!
//! - 접두어: `runwatch_`
//! - 단계명: `classifier_`, `matcher_`, `recorder_`
//! - 접미어: `_total` (counter)
//!
//! # 사용 예시
//!
//! ```ignore
//! use metrics::counter;
//!
//! counter!(runwatch_core::metrics::CLASSIFIER_LINES_DROPPED_TOTAL).increment(1);
//! ```

// ─── 레이블 키 상수 ────────────────────────────────────────────────

/// 분류 결과 레이블 키 (started, finished)
pub const LABEL_STATE: &str = "state";

// ─── Classifier 메트릭 ──────────────────────────────────────────────

/// Classifier: 읽은 전체 라인 수 (counter)
pub const CLASSIFIER_LINES_READ_TOTAL: &str = "runwatch_classifier_lines_read_total";

/// Classifier: 분류된 이벤트 수 (counter, label: state)
pub const CLASSIFIER_EVENTS_TOTAL: &str = "runwatch_classifier_events_total";

/// Classifier: 디코딩 실패로 드롭된 라인 수 (counter)
pub const CLASSIFIER_LINES_DROPPED_TOTAL: &str = "runwatch_classifier_lines_dropped_total";

// ─── Matcher 메트릭 ────────────────────────────────────────────────

/// Matcher: 매칭에 성공한 시작 이벤트 수 (counter)
pub const MATCHER_MATCHED_TOTAL: &str = "runwatch_matcher_matched_total";

/// Matcher: 매칭 실패한 시작 이벤트 수 (counter)
pub const MATCHER_UNMATCHED_TOTAL: &str = "runwatch_matcher_unmatched_total";

// ─── Recorder 메트릭 ───────────────────────────────────────────────

/// Recorder: 저장된 알림 레코드 수 (counter)
pub const RECORDER_RECORDS_WRITTEN_TOTAL: &str = "runwatch_recorder_records_written_total";

/// Recorder: 임계값을 초과한 레코드 수 (counter)
pub const RECORDER_ALERTS_RAISED_TOTAL: &str = "runwatch_recorder_alerts_raised_total";

/// Recorder: 저장 실패 수 (counter)
pub const RECORDER_WRITE_FAILURES_TOTAL: &str = "runwatch_recorder_write_failures_total";

// ─── 설명 등록 함수 ─────────────────────────────────────────────────

/// 모든 메트릭의 설명(description)을 등록합니다.
///
/// 레코더가 설치되지 않은 경우 아무 동작도 하지 않습니다.
pub fn describe_all() {
    use metrics::describe_counter;

    describe_counter!(
        CLASSIFIER_LINES_READ_TOTAL,
        "Total number of input lines read"
    );
    describe_counter!(
        CLASSIFIER_EVENTS_TOTAL,
        "Decoded job events by state bucket (started, finished)"
    );
    describe_counter!(
        CLASSIFIER_LINES_DROPPED_TOTAL,
        "Input lines dropped because they failed to decode"
    );
    describe_counter!(
        MATCHER_MATCHED_TOTAL,
        "Started events paired with a finished event"
    );
    describe_counter!(
        MATCHER_UNMATCHED_TOTAL,
        "Started events without a qualifying finished event"
    );
    describe_counter!(
        RECORDER_RECORDS_WRITTEN_TOTAL,
        "Alert records persisted to the sink"
    );
    describe_counter!(
        RECORDER_ALERTS_RAISED_TOTAL,
        "Persisted records whose duration exceeded the threshold"
    );
    describe_counter!(
        RECORDER_WRITE_FAILURES_TOTAL,
        "Alert records the sink rejected"
    );
}
