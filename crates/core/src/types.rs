//! 도메인 타입 — 시스템 전역에서 사용되는 공통 타입
//!
//! 작업(job) 실행의 시작/종료 이벤트와, 매칭 결과로 저장되는
//! 알림 레코드를 정의합니다.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 시작 이벤트를 나타내는 상태 문자열
///
/// 대소문자를 구분하여 정확히 일치해야 합니다. 그 외의 모든 상태 값은
/// 종료 이벤트로 취급합니다.
pub const STARTED_STATE: &str = "STARTED";

/// 작업 실행 이벤트
///
/// 로그 한 줄에서 디코딩된 레코드입니다. `id`, `state`, `timestamp`는 필수이며
/// `job_type`과 `host`는 없으면 빈 문자열입니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobEvent {
    /// 작업 실행 식별자
    pub id: String,
    /// 상태 (`STARTED` 또는 그 외)
    pub state: String,
    /// 작업 유형 (JSON 키: `type`)
    #[serde(rename = "type")]
    pub job_type: String,
    /// 실행 호스트
    pub host: String,
    /// 이벤트 시각 (밀리초 정밀도)
    pub timestamp: DateTime<Utc>,
}

impl JobEvent {
    /// 시작 이벤트인지 확인합니다.
    pub fn is_started(&self) -> bool {
        self.state == STARTED_STATE
    }
}

impl fmt::Display for JobEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}] type={} host={} at {}",
            self.id,
            self.state,
            self.job_type,
            self.host,
            self.timestamp.timestamp_millis(),
        )
    }
}

/// 알림 레코드
///
/// 매칭된 종료 이벤트의 식별 필드와 실행 시간, 알림 플래그를 담습니다.
/// `Alert` 테이블의 한 행에 대응합니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertRecord {
    /// 작업 실행 식별자
    pub id: String,
    /// 실행 시간 (밀리초, 음수 가능)
    pub duration_ms: i64,
    /// 작업 유형
    #[serde(rename = "type")]
    pub job_type: String,
    /// 실행 호스트
    pub host: String,
    /// 임계값 초과 여부
    pub alert: bool,
}

impl AlertRecord {
    /// 매칭된 이벤트에서 알림 레코드를 생성합니다.
    pub fn from_event(event: &JobEvent, duration_ms: i64, alert: bool) -> Self {
        Self {
            id: event.id.clone(),
            duration_ms,
            job_type: event.job_type.clone(),
            host: event.host.clone(),
            alert,
        }
    }
}

impl fmt::Display for AlertRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} duration={}ms type={} host={} alert={}",
            self.id, self.duration_ms, self.job_type, self.host, self.alert,
        )
    }
}
