//! 매칭 파이프라인 에러 타입
//!
//! [`RunMatcherError`]는 분류/매칭/기록 과정에서 발생하는 모든 에러를 표현합니다.
//! `From<RunMatcherError> for RunwatchError` 변환이 구현되어 있어
//! 상위 레이어에서 `?` 연산자로 자연스럽게 전파할 수 있습니다.

use runwatch_core::error::{ConfigError, ParseError, RunwatchError, StorageError};

/// 매칭 파이프라인 도메인 에러
#[derive(Debug, thiserror::Error)]
pub enum RunMatcherError {
    /// 라인 디코딩 실패
    #[error("parse error: {format} at column {column}: {reason}")]
    Parse {
        /// 파서 형식 (json 등)
        format: String,
        /// 실패 위치 (컬럼)
        column: usize,
        /// 실패 사유
        reason: String,
    },

    /// 라인 크기 초과
    #[error("line too large: {size} bytes (max: {max})")]
    TooLarge {
        /// 라인 크기 (바이트)
        size: usize,
        /// 허용 최대 크기
        max: usize,
    },

    /// 시작 이벤트에 대응하는 종료 이벤트 없음
    #[error("no finished event matches started event '{id}'")]
    NoMatch {
        /// 시작 이벤트 ID
        id: String,
    },

    /// 저장소 에러
    #[error("sink error: {0}")]
    Sink(String),

    /// 설정 에러
    #[error("config error: {field}: {reason}")]
    Config {
        /// 설정 필드명
        field: String,
        /// 에러 사유
        reason: String,
    },

    /// 워커 태스크 실패
    #[error("worker error: {0}")]
    Worker(String),

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<RunMatcherError> for RunwatchError {
    fn from(err: RunMatcherError) -> Self {
        match err {
            RunMatcherError::Parse { column, reason, .. } => {
                RunwatchError::Parse(ParseError::InvalidRecord { column, reason })
            }
            RunMatcherError::TooLarge { size, max } => {
                RunwatchError::Parse(ParseError::TooLarge { size, max })
            }
            RunMatcherError::Config { field, reason } => {
                RunwatchError::Config(ConfigError::InvalidValue { field, reason })
            }
            RunMatcherError::Sink(reason) => RunwatchError::Storage(StorageError::Query(reason)),
            RunMatcherError::Io(e) => RunwatchError::Io(e),
            other @ (RunMatcherError::NoMatch { .. } | RunMatcherError::Worker(_)) => {
                RunwatchError::Match(other.to_string())
            }
        }
    }
}
