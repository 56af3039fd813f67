//! JSON 이벤트 파서
//!
//! 한 줄짜리 JSON 객체를 [`JobEvent`]로 디코딩합니다.
//!
//! # 입력 형식
//! ```text
//! {"id": string, "state": string, "type"?: string, "host"?: string, "timestamp": epoch-millis}
//! ```
//! - `id`, `state`, `timestamp`는 필수이며 `id`는 비어 있으면 안 됩니다.
//! - `type`, `host`는 없거나 `null`이면 빈 문자열이 됩니다.
//! - `timestamp`는 Unix 밀리초 정수 또는 RFC 3339 문자열을 받습니다.
//! - 알 수 없는 필드는 무시합니다.
//!
//! # 사용 예시
//! ```ignore
//! use runwatch_core::pipeline::EventParser;
//! use runwatch_matcher::parser::JsonEventParser;
//!
//! let parser = JsonEventParser::default();
//! let event = parser.parse(br#"{"id":"scsmbstgra","state":"STARTED","timestamp":1491377495212}"#)?;
//! assert!(event.is_started());
//! ```

use chrono::{DateTime, Utc};
use serde::Deserialize;

use runwatch_core::error::RunwatchError;
use runwatch_core::pipeline::EventParser;
use runwatch_core::types::JobEvent;

use crate::error::RunMatcherError;

/// 기본 최대 입력 크기 (1MB)
pub const DEFAULT_MAX_INPUT_SIZE: usize = 1024 * 1024;

/// 디코딩 직후의 원시 레코드
#[derive(Debug, Deserialize)]
struct RawJobEvent {
    id: String,
    state: String,
    #[serde(default, rename = "type")]
    job_type: Option<String>,
    #[serde(default)]
    host: Option<String>,
    timestamp: RawTimestamp,
}

/// 타임스탬프 표현 (정수 밀리초 또는 RFC 3339 문자열)
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawTimestamp {
    Millis(i64),
    Text(String),
}

/// JSON 이벤트 파서
pub struct JsonEventParser {
    /// 최대 허용 입력 크기 (바이트)
    max_input_size: usize,
}

impl JsonEventParser {
    /// 새 파서를 생성합니다.
    pub fn new() -> Self {
        Self {
            max_input_size: DEFAULT_MAX_INPUT_SIZE,
        }
    }

    /// 최대 입력 크기를 설정합니다.
    pub fn with_max_input_size(mut self, size: usize) -> Self {
        self.max_input_size = size;
        self
    }

    fn parse_error(column: usize, reason: impl Into<String>) -> RunMatcherError {
        RunMatcherError::Parse {
            format: "json".to_owned(),
            column,
            reason: reason.into(),
        }
    }

    /// JSON 바이트를 디코딩하여 `JobEvent`를 생성합니다.
    fn decode(&self, raw: &[u8]) -> Result<JobEvent, RunMatcherError> {
        if raw.len() > self.max_input_size {
            return Err(RunMatcherError::TooLarge {
                size: raw.len(),
                max: self.max_input_size,
            });
        }

        // 최상위가 JSON 객체여야 합니다 (serde는 배열 형태의 struct도 받아들임)
        match raw.iter().find(|b| !b.is_ascii_whitespace()) {
            Some(b'{') => {}
            Some(_) => return Err(Self::parse_error(0, "expected JSON object at top level")),
            None => return Err(Self::parse_error(0, "empty line")),
        }

        let record: RawJobEvent =
            serde_json::from_slice(raw).map_err(|e| Self::parse_error(e.column(), e.to_string()))?;

        if record.id.is_empty() {
            return Err(Self::parse_error(0, "field `id` must not be empty"));
        }

        let timestamp = Self::parse_timestamp(&record.timestamp)?;

        Ok(JobEvent {
            id: record.id,
            state: record.state,
            job_type: record.job_type.unwrap_or_default(),
            host: record.host.unwrap_or_default(),
            timestamp,
        })
    }

    /// 타임스탬프를 UTC 시각으로 변환합니다.
    ///
    /// 밀리초 미만 정밀도는 버립니다.
    ///
    /// 지원 형식:
    /// - Unix timestamp (밀리초): `1491377495212`
    /// - RFC 3339 (ISO 8601): `2017-04-05T07:31:35.212Z`
    fn parse_timestamp(timestamp: &RawTimestamp) -> Result<DateTime<Utc>, RunMatcherError> {
        match timestamp {
            RawTimestamp::Millis(ms) => DateTime::from_timestamp_millis(*ms).ok_or_else(|| {
                Self::parse_error(0, format!("timestamp out of range: {}", ms))
            }),
            RawTimestamp::Text(text) => {
                let parsed = DateTime::parse_from_rfc3339(text).map_err(|e| {
                    Self::parse_error(0, format!("invalid timestamp format '{}': {}", text, e))
                })?;
                let ms = parsed.timestamp_millis();
                DateTime::from_timestamp_millis(ms).ok_or_else(|| {
                    Self::parse_error(0, format!("timestamp out of range: {}", text))
                })
            }
        }
    }
}

impl Default for JsonEventParser {
    fn default() -> Self {
        Self::new()
    }
}

impl EventParser for JsonEventParser {
    fn format_name(&self) -> &str {
        "json"
    }

    fn parse(&self, raw: &[u8]) -> Result<JobEvent, RunwatchError> {
        self.decode(raw).map_err(RunwatchError::from)
    }
}
