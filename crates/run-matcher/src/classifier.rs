//! 라인 분류기 -- 원시 라인을 시작/종료 이벤트 목록으로 나눕니다.
//!
//! [`LineClassifier`]는 라인마다 파서를 호출하고, 성공한 이벤트를
//! `state`가 정확히 `"STARTED"`이면 시작 목록에, 그 외에는 종료 목록에 추가합니다.
//! 디코딩에 실패한 라인은 경고 로그를 남기고 버립니다.

use metrics::counter;

use runwatch_core::metrics as m;
use runwatch_core::pipeline::EventParser;
use runwatch_core::types::JobEvent;

use crate::parser::JsonEventParser;

/// 드롭 로그에 남길 라인 미리보기 최대 길이 (문자 수)
const LINE_PREVIEW_CHARS: usize = 256;

/// 한 라인의 분류 결과
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// 시작 목록에 추가됨
    Started,
    /// 종료 목록에 추가됨
    Finished,
    /// 디코딩 실패로 버려짐
    Dropped,
}

/// 분류된 이벤트 목록
///
/// 1단계에서만 변경되며, 2단계에서는 `Arc`로 감싸 읽기 전용으로 공유합니다.
#[derive(Debug, Clone, Default)]
pub struct ClassifiedEvents {
    /// 시작 이벤트 (입력 순서)
    started: Vec<JobEvent>,
    /// 종료 이벤트 (입력 순서)
    finished: Vec<JobEvent>,
    /// 읽은 라인 수
    lines_read: u64,
    /// 버린 라인 수
    lines_dropped: u64,
}

impl ClassifiedEvents {
    /// 빈 목록을 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 이벤트를 상태에 따라 시작 또는 종료 목록에 추가합니다.
    pub fn push(&mut self, event: JobEvent) -> Classification {
        if event.is_started() {
            self.started.push(event);
            Classification::Started
        } else {
            self.finished.push(event);
            Classification::Finished
        }
    }

    pub fn started(&self) -> &[JobEvent] {
        &self.started
    }

    pub fn finished(&self) -> &[JobEvent] {
        &self.finished
    }

    pub fn lines_read(&self) -> u64 {
        self.lines_read
    }

    pub fn lines_dropped(&self) -> u64 {
        self.lines_dropped
    }
}

/// 라인 분류기
pub struct LineClassifier {
    /// 라인 디코더
    parser: Box<dyn EventParser>,
    /// 분류 결과
    events: ClassifiedEvents,
}

impl LineClassifier {
    /// 지정한 파서로 분류기를 생성합니다.
    pub fn new(parser: Box<dyn EventParser>) -> Self {
        Self {
            parser,
            events: ClassifiedEvents::new(),
        }
    }

    /// 원시 라인 하나를 분류합니다.
    ///
    /// 실패는 치명적이지 않으며 재시도하지 않습니다.
    pub fn classify(&mut self, line: &str) -> Classification {
        self.classify_bytes(line.as_bytes())
    }

    /// 바이트 라인 하나를 분류합니다. UTF-8이 아닌 라인은 버려집니다.
    pub fn classify_bytes(&mut self, raw: &[u8]) -> Classification {
        self.events.lines_read += 1;
        counter!(m::CLASSIFIER_LINES_READ_TOTAL).increment(1);

        match self.parser.parse(raw) {
            Ok(event) => {
                let outcome = self.events.push(event);
                let state = if outcome == Classification::Started {
                    "started"
                } else {
                    "finished"
                };
                counter!(m::CLASSIFIER_EVENTS_TOTAL, m::LABEL_STATE => state).increment(1);
                outcome
            }
            Err(e) => {
                self.events.lines_dropped += 1;
                counter!(m::CLASSIFIER_LINES_DROPPED_TOTAL).increment(1);
                let preview: String = String::from_utf8_lossy(raw)
                    .chars()
                    .take(LINE_PREVIEW_CHARS)
                    .collect();
                tracing::warn!(
                    line_no = self.events.lines_read,
                    line = %preview,
                    error = %e,
                    "dropping line that failed to decode"
                );
                Classification::Dropped
            }
        }
    }

    /// 현재까지의 분류 결과를 반환합니다.
    pub fn events(&self) -> &ClassifiedEvents {
        &self.events
    }

    /// 분류를 마치고 결과를 꺼냅니다.
    pub fn into_events(self) -> ClassifiedEvents {
        self.events
    }
}

impl Default for LineClassifier {
    fn default() -> Self {
        Self::new(Box::new(JsonEventParser::default()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sizes(classifier: &LineClassifier) -> (usize, usize) {
        (
            classifier.events().started().len(),
            classifier.events().finished().len(),
        )
    }

    #[test]
    fn valid_json_missing_required_field_is_dropped() {
        let mut classifier = LineClassifier::default();
        assert_eq!(sizes(&classifier), (0, 0));

        let outcome = classifier.classify(r#"{"state":"STARTED", "timestamp":1491377495218}"#);

        assert_eq!(outcome, Classification::Dropped);
        assert_eq!(sizes(&classifier), (0, 0));
        assert_eq!(classifier.events().lines_dropped(), 1);
    }

    #[test]
    fn invalid_json_is_dropped() {
        let mut classifier = LineClassifier::default();
        classifier.classify("invalid json object");
        assert_eq!(sizes(&classifier), (0, 0));
    }

    #[test]
    fn started_goes_to_started() {
        let mut classifier = LineClassifier::default();
        let outcome =
            classifier.classify(r#"{"id":"scsmbstgrc", "state":"STARTED", "timestamp":1491377495218}"#);
        assert_eq!(outcome, Classification::Started);
        assert_eq!(sizes(&classifier), (1, 0));
    }

    #[test]
    fn finished_goes_to_finished() {
        let mut classifier = LineClassifier::default();
        classifier.classify(r#"{"id":"scsmbstgrc", "state":"FINISHED", "timestamp":1491377495218}"#);
        assert_eq!(sizes(&classifier), (0, 1));
    }

    #[test]
    fn started_with_additional_fields_goes_to_started() {
        let mut classifier = LineClassifier::default();
        classifier.classify(
            r#"{"id":"scsmbstgra", "state":"STARTED", "type":"APPLICATION_LOG", "host":"12345", "timestamp":1491377495212}"#,
        );
        assert_eq!(sizes(&classifier), (1, 0));
    }

    #[test]
    fn case_variant_finished_goes_to_finished() {
        let mut classifier = LineClassifier::default();
        classifier.classify(
            r#"{"id":"scsmbstgra", "state":"Finished", "type":"APPLICATION_LOG", "host":"12345", "timestamp":1491377495212}"#,
        );
        assert_eq!(sizes(&classifier), (0, 1));
    }

    #[test]
    fn lowercase_started_is_not_started() {
        let mut classifier = LineClassifier::default();
        let outcome = classifier.classify(r#"{"id":"a","state":"started","timestamp":1}"#);
        assert_eq!(outcome, Classification::Finished);
        assert_eq!(sizes(&classifier), (0, 1));
    }

    #[test]
    fn arbitrary_state_is_treated_as_finished() {
        let mut classifier = LineClassifier::default();
        classifier.classify(r#"{"id":"a","state":"CANCELLED","timestamp":1}"#);
        classifier.classify(r#"{"id":"b","state":"","timestamp":1}"#);
        assert_eq!(sizes(&classifier), (0, 2));
    }

    #[test]
    fn preserves_input_order() {
        let mut classifier = LineClassifier::default();
        classifier.classify(r#"{"id":"first","state":"FINISHED","timestamp":1}"#);
        classifier.classify(r#"{"id":"skip","state":"STARTED","timestamp":1}"#);
        classifier.classify(r#"{"id":"second","state":"FINISHED","timestamp":2}"#);

        let events = classifier.into_events();
        let ids: Vec<&str> = events.finished().iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["first", "second"]);
        assert_eq!(events.lines_read(), 3);
        assert_eq!(events.lines_dropped(), 0);
    }

    #[test]
    fn invalid_utf8_line_is_dropped() {
        let mut classifier = LineClassifier::default();
        let raw = b"{\"id\":\"a\xff\",\"state\":\"STARTED\",\"timestamp\":1}";
        assert_eq!(classifier.classify_bytes(raw), Classification::Dropped);
        assert_eq!(sizes(&classifier), (0, 0));
        assert_eq!(classifier.events().lines_dropped(), 1);
    }

    #[test]
    fn long_dropped_line_does_not_panic() {
        let mut classifier = LineClassifier::default();
        let line = "é".repeat(LINE_PREVIEW_CHARS * 2);
        assert_eq!(classifier.classify(&line), Classification::Dropped);
    }
}
