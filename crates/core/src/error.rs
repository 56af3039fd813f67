//! 에러 타입 — 도메인별 에러 정의

/// runwatch 최상위 에러 타입
#[derive(Debug, thiserror::Error)]
pub enum RunwatchError {
    /// 설정 관련 에러
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// 파싱 에러
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// 스토리지 에러
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// 매칭 단계 에러
    #[error("match error: {0}")]
    Match(String),

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// 설정 관련 에러
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// 설정 파일을 찾을 수 없음
    #[error("config file not found: {path}")]
    FileNotFound { path: String },

    /// 설정 파싱 실패
    #[error("failed to parse config: {reason}")]
    ParseFailed { reason: String },

    /// 유효하지 않은 설정 값
    #[error("invalid config value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// 파싱 에러
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// 필수 필드 누락 또는 타입 불일치
    #[error("invalid record at column {column}: {reason}")]
    InvalidRecord { column: usize, reason: String },

    /// 입력 데이터 초과
    #[error("input too large: {size} bytes (max: {max})")]
    TooLarge { size: usize, max: usize },
}

/// 스토리지 에러
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// 연결 실패
    #[error("connection failed: {0}")]
    Connection(String),

    /// 스키마 생성 실패
    #[error("schema setup failed: {0}")]
    Schema(String),

    /// 쿼리 실패
    #[error("query failed: {0}")]
    Query(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_converts_to_top_level() {
        let err: RunwatchError = ConfigError::InvalidValue {
            field: "matcher.workers".to_owned(),
            reason: "too many".to_owned(),
        }
        .into();
        assert!(matches!(err, RunwatchError::Config(_)));
        assert!(err.to_string().contains("matcher.workers"));
    }

    #[test]
    fn storage_error_display() {
        let err: RunwatchError = StorageError::Query("disk I/O error".to_owned()).into();
        assert_eq!(err.to_string(), "storage error: query failed: disk I/O error");
    }

    #[test]
    fn too_large_display() {
        let err = ParseError::TooLarge { size: 2048, max: 1024 };
        let msg = err.to_string();
        assert!(msg.contains("2048"));
        assert!(msg.contains("1024"));
    }
}
