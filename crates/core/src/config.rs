//! 설정 관리 — runwatch.toml 파싱 및 런타임 설정
//!
//! [`RunwatchConfig`]는 모든 모듈의 설정을 담는 최상위 구조체입니다.
//!
//! # 설정 로딩 우선순위
//! 1. 환경변수 (`RUNWATCH_MATCHER_WORKERS=8` 형식)
//! 2. 설정 파일 (`runwatch.toml`)
//! 3. 기본값 (`Default` 구현)
//!
//! # 사용 예시
//! ```no_run
//! # async fn example() -> Result<(), runwatch_core::error::RunwatchError> {
//! use runwatch_core::config::RunwatchConfig;
//!
//! // 파일이 없으면 기본값 + 환경변수 오버라이드
//! let config = RunwatchConfig::load_or_default("runwatch.toml").await?;
//!
//! // TOML 문자열에서 직접 파싱
//! let config = RunwatchConfig::parse("[general]\nlog_level = \"debug\"")?;
//! # Ok(())
//! # }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ConfigError, RunwatchError};

/// 설정 파일 경로를 지정하는 환경변수
pub const CONFIG_PATH_ENV: &str = "RUNWATCH_CONFIG";

/// 기본 설정 파일 경로
pub const DEFAULT_CONFIG_PATH: &str = "runwatch.toml";

/// runwatch 통합 설정
///
/// `runwatch.toml` 파일의 최상위 구조를 나타냅니다.
/// 각 모듈은 자기 섹션만 읽어 사용합니다.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunwatchConfig {
    /// 일반 설정
    #[serde(default)]
    pub general: GeneralConfig,
    /// 매칭/알림 설정
    #[serde(default)]
    pub matcher: MatcherConfig,
    /// 스토리지 설정
    #[serde(default)]
    pub storage: StorageConfig,
}

impl RunwatchConfig {
    /// TOML 파일에서 설정을 로드하고 환경변수 오버라이드를 적용합니다.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, RunwatchError> {
        let mut config = Self::from_file(path).await?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// 설정 파일이 있으면 로드하고, 없으면 기본값에 환경변수 오버라이드만 적용합니다.
    pub async fn load_or_default(path: impl AsRef<Path>) -> Result<Self, RunwatchError> {
        match Self::load(path.as_ref()).await {
            Err(RunwatchError::Config(ConfigError::FileNotFound { .. })) => {
                let mut config = Self::default();
                config.apply_env_overrides();
                config.validate()?;
                Ok(config)
            }
            other => other,
        }
    }

    /// TOML 파일에서 설정을 로드합니다 (환경변수 오버라이드 없음).
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, RunwatchError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                RunwatchError::Config(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                })
            } else {
                RunwatchError::Io(e)
            }
        })?;
        let config = Self::parse(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// TOML 문자열에서 설정을 파싱합니다.
    pub fn parse(toml_str: &str) -> Result<Self, RunwatchError> {
        toml::from_str(toml_str).map_err(|e| {
            RunwatchError::Config(ConfigError::ParseFailed {
                reason: e.to_string(),
            })
        })
    }

    /// 환경변수로 설정값을 오버라이드합니다.
    ///
    /// 환경변수 네이밍 규칙: `RUNWATCH_{SECTION}_{FIELD}`
    /// 예: `RUNWATCH_STORAGE_DATABASE_PATH=/var/lib/runwatch/alerts.db`
    pub fn apply_env_overrides(&mut self) {
        // General
        override_string(&mut self.general.log_level, "RUNWATCH_GENERAL_LOG_LEVEL");
        override_string(&mut self.general.log_format, "RUNWATCH_GENERAL_LOG_FORMAT");

        // Matcher
        override_i64(
            &mut self.matcher.alert_threshold_ms,
            "RUNWATCH_MATCHER_ALERT_THRESHOLD_MS",
        );
        override_usize(&mut self.matcher.workers, "RUNWATCH_MATCHER_WORKERS");
        override_usize(
            &mut self.matcher.max_line_bytes,
            "RUNWATCH_MATCHER_MAX_LINE_BYTES",
        );

        // Storage
        override_string(
            &mut self.storage.database_path,
            "RUNWATCH_STORAGE_DATABASE_PATH",
        );
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), RunwatchError> {
        // log_level 검증
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.general.log_level.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_level".to_owned(),
                reason: format!("must be one of: {}", valid_levels.join(", ")),
            }
            .into());
        }

        // log_format 검증
        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&self.general.log_format.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_format".to_owned(),
                reason: format!("must be one of: {}", valid_formats.join(", ")),
            }
            .into());
        }

        if self.storage.database_path.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "storage.database_path".to_owned(),
                reason: "database path must not be empty".to_owned(),
            }
            .into());
        }

        Ok(())
    }
}

/// 일반 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// 로그 레벨 (trace, debug, info, warn, error)
    pub log_level: String,
    /// 로그 형식 (json, pretty)
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_owned(),
            log_format: "json".to_owned(),
        }
    }
}

/// 매칭/알림 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MatcherConfig {
    /// 알림 임계값 (밀리초). 실행 시간이 이 값을 초과하면 알림
    pub alert_threshold_ms: i64,
    /// 매칭 워커 수 (0 = 사용 가능한 병렬성)
    pub workers: usize,
    /// 한 라인의 최대 크기 (바이트)
    pub max_line_bytes: usize,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            alert_threshold_ms: 4,
            workers: 0,
            max_line_bytes: 1024 * 1024, // 1MB
        }
    }
}

/// 스토리지 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// SQLite 데이터베이스 파일 경로
    pub database_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: "runwatch.db".to_owned(),
        }
    }
}

// --- 환경변수 오버라이드 헬퍼 ---

fn override_string(target: &mut String, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val;
    }
}

fn override_usize(target: &mut usize, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<usize>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse usize from env var, ignoring"
            ),
        }
    }
}

fn override_i64(target: &mut i64, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<i64>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse i64 from env var, ignoring"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn default_config_has_sane_values() {
        let config = RunwatchConfig::default();
        assert_eq!(config.general.log_level, "info");
        assert_eq!(config.general.log_format, "json");
        assert_eq!(config.matcher.alert_threshold_ms, 4);
        assert_eq!(config.matcher.workers, 0);
        assert_eq!(config.storage.database_path, "runwatch.db");
    }

    #[test]
    fn default_config_passes_validation() {
        let config = RunwatchConfig::default();
        config.validate().unwrap();
    }

    #[test]
    fn from_str_empty_toml_uses_defaults() {
        let config = RunwatchConfig::parse("").unwrap();
        assert_eq!(config.general.log_level, "info");
        assert_eq!(config.matcher.alert_threshold_ms, 4);
    }

    #[test]
    fn from_str_partial_toml_merges_with_defaults() {
        let toml = r#"
[general]
log_level = "debug"

[matcher]
workers = 8
"#;
        let config = RunwatchConfig::parse(toml).unwrap();
        assert_eq!(config.general.log_level, "debug");
        // log_format은 기본값 유지
        assert_eq!(config.general.log_format, "json");
        assert_eq!(config.matcher.workers, 8);
        assert_eq!(config.matcher.alert_threshold_ms, 4);
    }

    #[test]
    fn from_str_invalid_toml_returns_error() {
        let result = RunwatchConfig::parse("invalid = [[[toml");
        let err = result.unwrap_err();
        assert!(matches!(
            err,
            RunwatchError::Config(ConfigError::ParseFailed { .. })
        ));
    }

    #[test]
    fn validate_rejects_invalid_log_level() {
        let mut config = RunwatchConfig::default();
        config.general.log_level = "verbose".to_owned();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("log_level"));
    }

    #[test]
    fn validate_rejects_invalid_log_format() {
        let mut config = RunwatchConfig::default();
        config.general.log_format = "xml".to_owned();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("log_format"));
    }

    #[test]
    fn validate_rejects_empty_database_path() {
        let mut config = RunwatchConfig::default();
        config.storage.database_path = "  ".to_owned();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("database_path"));
    }

    #[test]
    #[serial]
    fn env_override_string() {
        let mut val = "original".to_owned();
        // SAFETY: serial 테스트로 실행되어 다른 스레드가 환경변수를 읽지 않습니다.
        unsafe { std::env::set_var("TEST_RUNWATCH_STR", "overridden") };
        override_string(&mut val, "TEST_RUNWATCH_STR");
        assert_eq!(val, "overridden");
        unsafe { std::env::remove_var("TEST_RUNWATCH_STR") };
    }

    #[test]
    #[serial]
    fn env_override_i64_negative() {
        let mut val = 4;
        // SAFETY: serial 테스트로 실행되어 다른 스레드가 환경변수를 읽지 않습니다.
        unsafe { std::env::set_var("TEST_RUNWATCH_I64", "-10") };
        override_i64(&mut val, "TEST_RUNWATCH_I64");
        assert_eq!(val, -10);
        unsafe { std::env::remove_var("TEST_RUNWATCH_I64") };
    }

    #[test]
    #[serial]
    fn env_override_usize_invalid_keeps_original() {
        let mut val = 3;
        // SAFETY: serial 테스트로 실행되어 다른 스레드가 환경변수를 읽지 않습니다.
        unsafe { std::env::set_var("TEST_RUNWATCH_USIZE_BAD", "many") };
        override_usize(&mut val, "TEST_RUNWATCH_USIZE_BAD");
        assert_eq!(val, 3); // 원래 값 유지
        unsafe { std::env::remove_var("TEST_RUNWATCH_USIZE_BAD") };
    }

    #[test]
    fn env_override_missing_var_keeps_original() {
        let mut val = "original".to_owned();
        override_string(&mut val, "TEST_RUNWATCH_NONEXISTENT_12345");
        assert_eq!(val, "original");
    }

    #[test]
    fn config_serialize_roundtrip() {
        let config = RunwatchConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed = RunwatchConfig::parse(&toml_str).unwrap();
        assert_eq!(config.general.log_level, parsed.general.log_level);
        assert_eq!(
            config.matcher.alert_threshold_ms,
            parsed.matcher.alert_threshold_ms
        );
        assert_eq!(config.storage.database_path, parsed.storage.database_path);
    }

    #[tokio::test]
    async fn from_file_not_found() {
        let result = RunwatchConfig::from_file("/nonexistent/path/runwatch.toml").await;
        let err = result.unwrap_err();
        assert!(matches!(
            err,
            RunwatchError::Config(ConfigError::FileNotFound { .. })
        ));
    }

    #[tokio::test]
    #[serial]
    async fn load_or_default_without_file_uses_defaults() {
        let config = RunwatchConfig::load_or_default("/nonexistent/path/runwatch.toml")
            .await
            .unwrap();
        assert_eq!(config.matcher.alert_threshold_ms, 4);
    }
}
