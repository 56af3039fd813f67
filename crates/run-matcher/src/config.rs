//! 실행 설정
//!
//! [`RunConfig`]는 core의 [`RunwatchConfig`](runwatch_core::config::RunwatchConfig)에서
//! 파생되며, 한 번의 실행(run)에 필요한 값만 담습니다.
//!
//! # 사용 예시
//! ```ignore
//! use runwatch_core::config::RunwatchConfig;
//! use runwatch_matcher::config::RunConfig;
//!
//! let core_config = RunwatchConfig::default();
//! let config = RunConfig::from_core(&core_config);
//! config.validate()?;
//! ```

use serde::{Deserialize, Serialize};

use crate::error::RunMatcherError;

/// 워커 수 상한
const MAX_WORKERS: usize = 1024;

/// 라인 크기 상한 (64MB)
const MAX_LINE_BYTES_LIMIT: usize = 64 * 1024 * 1024;

/// 실행 설정
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunConfig {
    /// 알림 임계값 (밀리초)
    pub alert_threshold_ms: i64,
    /// 매칭 워커 수 (0 = 사용 가능한 병렬성)
    pub workers: usize,
    /// 한 라인의 최대 크기 (바이트)
    pub max_line_bytes: usize,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            alert_threshold_ms: 4,
            workers: 0,
            max_line_bytes: 1024 * 1024,
        }
    }
}

impl RunConfig {
    /// core 설정에서 실행 설정을 생성합니다.
    pub fn from_core(core: &runwatch_core::config::RunwatchConfig) -> Self {
        Self {
            alert_threshold_ms: core.matcher.alert_threshold_ms,
            workers: core.matcher.workers,
            max_line_bytes: core.matcher.max_line_bytes,
        }
    }

    /// 실제로 사용할 워커 수를 반환합니다.
    ///
    /// `workers`가 0이면 `available_parallelism`을 따르며, 최소 1입니다.
    pub fn effective_workers(&self) -> usize {
        if self.workers > 0 {
            return self.workers;
        }
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), RunMatcherError> {
        if self.workers > MAX_WORKERS {
            return Err(RunMatcherError::Config {
                field: "workers".to_owned(),
                reason: format!("must be 0-{}", MAX_WORKERS),
            });
        }

        if self.max_line_bytes == 0 || self.max_line_bytes > MAX_LINE_BYTES_LIMIT {
            return Err(RunMatcherError::Config {
                field: "max_line_bytes".to_owned(),
                reason: format!("must be 1-{}", MAX_LINE_BYTES_LIMIT),
            });
        }

        Ok(())
    }
}
