//! 알림 판정 및 기록 -- 매칭 결과를 `Alert` 테이블의 한 행으로 저장합니다.
//!
//! [`AlertPolicy`]는 실행 시간이 임계값을 초과하는지 판정하고,
//! [`AlertRecorder`]는 매칭된 종료 이벤트의 id/type/host로 레코드를 만들어
//! [`AlertSink`]에 한 번 삽입합니다. 저장 실패는 로그로만 남깁니다.

use std::sync::Arc;

use metrics::counter;

use runwatch_core::metrics as m;
use runwatch_core::pipeline::AlertSink;
use runwatch_core::types::{AlertRecord, JobEvent};

use crate::matcher::PairMatcher;

/// 기본 알림 임계값 (밀리초)
pub const DEFAULT_ALERT_THRESHOLD_MS: i64 = 4;

/// 알림 임계값 정책
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlertPolicy {
    /// 이 값을 초과하면 알림
    threshold_ms: i64,
}

impl AlertPolicy {
    pub fn new(threshold_ms: i64) -> Self {
        Self { threshold_ms }
    }

    /// 실행 시간이 임계값을 초과하면 `true`를 반환합니다.
    pub fn is_alert(&self, duration_ms: i64) -> bool {
        duration_ms > self.threshold_ms
    }

    pub fn threshold_ms(&self) -> i64 {
        self.threshold_ms
    }
}

impl Default for AlertPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_ALERT_THRESHOLD_MS)
    }
}

/// 시작 이벤트 하나의 처리 결과
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    /// 매칭 후 저장 성공
    Recorded { alert: bool },
    /// 매칭은 되었으나 저장 실패
    WriteFailed,
    /// 대응하는 종료 이벤트 없음
    Unmatched,
}

/// 알림 기록기
///
/// 여러 워커가 `Arc<AlertRecorder<S>>`를 공유해 동시에 호출합니다.
pub struct AlertRecorder<S: AlertSink> {
    /// 저장소
    sink: Arc<S>,
    /// 임계값 정책
    policy: AlertPolicy,
    /// 매처
    matcher: PairMatcher,
}

impl<S: AlertSink> AlertRecorder<S> {
    /// 새 기록기를 생성합니다.
    pub fn new(sink: Arc<S>, policy: AlertPolicy) -> Self {
        Self {
            sink,
            policy,
            matcher: PairMatcher::new(),
        }
    }

    pub fn policy(&self) -> AlertPolicy {
        self.policy
    }

    pub fn sink(&self) -> &Arc<S> {
        &self.sink
    }

    /// 알림 레코드 한 건을 저장합니다.
    ///
    /// 레코드의 id/type/host는 `matched`(매칭된 종료 이벤트)에서 가져옵니다.
    /// `matched`가 없거나 저장소가 거부하면 `false`를 반환합니다.
    pub fn record(&self, matched: Option<&JobEvent>, duration_ms: i64, alert: bool) -> bool {
        let Some(event) = matched else {
            tracing::warn!(duration_ms, alert, "cannot save alert without a matched event");
            return false;
        };

        let record = AlertRecord::from_event(event, duration_ms, alert);
        match self.sink.insert(&record) {
            Ok(()) => {
                counter!(m::RECORDER_RECORDS_WRITTEN_TOTAL).increment(1);
                if alert {
                    counter!(m::RECORDER_ALERTS_RAISED_TOTAL).increment(1);
                }
                tracing::debug!(
                    id = %record.id,
                    duration_ms,
                    alert,
                    sink = self.sink.name(),
                    "alert record saved"
                );
                true
            }
            Err(e) => {
                counter!(m::RECORDER_WRITE_FAILURES_TOTAL).increment(1);
                tracing::warn!(
                    id = %record.id,
                    sink = self.sink.name(),
                    error = %e,
                    "failed to save alert record"
                );
                false
            }
        }
    }

    /// 시작 이벤트 하나를 매칭하고, 짝이 있으면 판정 후 기록합니다.
    pub fn process(&self, started: &JobEvent, finished: &[JobEvent]) -> RecordOutcome {
        let pair = match self.matcher.pair(started, finished) {
            Ok(pair) => pair,
            Err(e) => {
                counter!(m::MATCHER_UNMATCHED_TOTAL).increment(1);
                tracing::warn!(id = %started.id, error = %e, "skipping unmatched started event");
                return RecordOutcome::Unmatched;
            }
        };
        counter!(m::MATCHER_MATCHED_TOTAL).increment(1);

        let alert = self.policy.is_alert(pair.duration_ms);
        if self.record(Some(pair.finished), pair.duration_ms, alert) {
            RecordOutcome::Recorded { alert }
        } else {
            RecordOutcome::WriteFailed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::SqliteAlertSink;
    use chrono::DateTime;
    use runwatch_core::error::{RunwatchError, StorageError};

    /// 항상 삽입을 거부하는 저장소
    struct RejectingSink;

    impl AlertSink for RejectingSink {
        fn name(&self) -> &str {
            "rejecting"
        }

        fn ensure_schema(&self) -> Result<(), RunwatchError> {
            Ok(())
        }

        fn insert(&self, _record: &AlertRecord) -> Result<(), RunwatchError> {
            Err(StorageError::Query("write rejected".to_owned()).into())
        }

        fn count(&self) -> Result<u64, RunwatchError> {
            Ok(0)
        }
    }

    fn event(id: &str, state: &str, job_type: &str, host: &str, ts: i64) -> JobEvent {
        JobEvent {
            id: id.to_owned(),
            state: state.to_owned(),
            job_type: job_type.to_owned(),
            host: host.to_owned(),
            timestamp: DateTime::from_timestamp_millis(ts).unwrap(),
        }
    }

    fn sqlite_recorder() -> AlertRecorder<SqliteAlertSink> {
        let sink = SqliteAlertSink::open_in_memory().unwrap();
        sink.ensure_schema().unwrap();
        AlertRecorder::new(Arc::new(sink), AlertPolicy::default())
    }

    #[test]
    fn threshold_boundary() {
        let policy = AlertPolicy::default();
        assert!(!policy.is_alert(-5));
        assert!(!policy.is_alert(0));
        assert!(!policy.is_alert(4));
        assert!(policy.is_alert(5));
        assert!(policy.is_alert(1_000_000));
    }

    #[test]
    fn custom_threshold() {
        let policy = AlertPolicy::new(100);
        assert!(!policy.is_alert(100));
        assert!(policy.is_alert(101));
    }

    #[test]
    fn record_valid_event_succeeds() {
        let recorder = sqlite_recorder();
        let started = event("scsmbstgrc", "STARTED", "", "", 1_491_377_495_218);
        assert!(recorder.record(Some(&started), 1, true));
        assert!(recorder.record(Some(&started), 1, false));
        assert!(recorder.record(Some(&started), 1_000_000, true));
        assert!(recorder.record(Some(&started), 1_000_000, false));
        assert_eq!(recorder.sink().count().unwrap(), 4);
    }

    #[test]
    fn record_without_event_fails() {
        let recorder = sqlite_recorder();
        assert!(!recorder.record(None, 1, true));
        assert!(!recorder.record(None, 1, false));
        assert!(!recorder.record(None, 1_000_000, true));
        assert!(!recorder.record(None, 1_000_000, false));
        assert_eq!(recorder.sink().count().unwrap(), 0);
    }

    #[test]
    fn record_reports_sink_failure() {
        let recorder = AlertRecorder::new(Arc::new(RejectingSink), AlertPolicy::default());
        let finished = event("a", "FINISHED", "", "", 0);
        assert!(!recorder.record(Some(&finished), 10, true));
    }

    #[test]
    fn process_uses_matched_finished_fields() {
        let recorder = sqlite_recorder();
        let started = event("job", "STARTED", "x", "a", 0);
        let finished = vec![event("job", "FINISHED", "y", "b", 10)];

        let outcome = recorder.process(&started, &finished);
        assert_eq!(outcome, RecordOutcome::Recorded { alert: true });

        let rows = recorder.sink().records().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].job_type, "y");
        assert_eq!(rows[0].host, "b");
        assert_eq!(rows[0].duration_ms, 10);
    }

    #[test]
    fn process_short_run_is_not_alert() {
        let recorder = sqlite_recorder();
        let started = event("job", "STARTED", "", "", 100);
        let finished = vec![event("job", "FINISHED", "", "", 104)];
        assert_eq!(
            recorder.process(&started, &finished),
            RecordOutcome::Recorded { alert: false }
        );
    }

    #[test]
    fn process_negative_duration_is_recorded_unmodified() {
        let recorder = sqlite_recorder();
        let started = event("job", "STARTED", "", "", 100);
        let finished = vec![event("job", "FINISHED", "", "", 40)];
        assert_eq!(
            recorder.process(&started, &finished),
            RecordOutcome::Recorded { alert: false }
        );
        let rows = recorder.sink().records().unwrap();
        assert_eq!(rows[0].duration_ms, -60);
        assert!(!rows[0].alert);
    }

    #[test]
    fn process_unmatched_writes_nothing() {
        let recorder = sqlite_recorder();
        let started = event("lonely", "STARTED", "", "", 0);
        let finished = vec![event("other", "FINISHED", "", "", 10)];
        assert_eq!(
            recorder.process(&started, &finished),
            RecordOutcome::Unmatched
        );
        assert_eq!(recorder.sink().count().unwrap(), 0);
    }

    #[test]
    fn process_write_failure_is_reported() {
        let recorder = AlertRecorder::new(Arc::new(RejectingSink), AlertPolicy::default());
        let started = event("job", "STARTED", "", "", 0);
        let finished = vec![event("job", "FINISHED", "", "", 10)];
        assert_eq!(
            recorder.process(&started, &finished),
            RecordOutcome::WriteFailed
        );
    }
}
