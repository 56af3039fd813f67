//! 시작/종료 이벤트 매칭
//!
//! [`PairMatcher`]는 시작 이벤트 하나에 대해 종료 목록을 앞에서부터 훑어
//! 조건을 만족하는 첫 번째 종료 이벤트를 선택합니다.
//!
//! # 매칭 조건
//! - `finished.id == started.id`
//! - `finished.host.cmp(&started.host) == finished.job_type.cmp(&started.job_type)`
//!
//! 두 번째 조건은 host/type의 동등성이 아니라 두 비교 결과의 부호가 같은지를 봅니다.
//! 예를 들어 host와 type이 모두 사전순으로 더 크면 값이 달라도 매칭됩니다.

use std::cmp::Ordering;

use runwatch_core::types::JobEvent;

use crate::error::RunMatcherError;

/// 매칭 결과
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchedPair<'a> {
    /// 선택된 종료 이벤트
    pub finished: &'a JobEvent,
    /// 실행 시간 (밀리초, 종료 - 시작)
    pub duration_ms: i64,
}

/// 시작/종료 이벤트 매처
#[derive(Debug, Clone, Copy, Default)]
pub struct PairMatcher;

impl PairMatcher {
    pub fn new() -> Self {
        Self
    }

    /// 종료 이벤트가 시작 이벤트의 짝이 될 수 있는지 판정합니다.
    pub fn is_candidate(started: &JobEvent, finished: &JobEvent) -> bool {
        finished.id == started.id && Self::sign_rule(started, finished)
    }

    /// host 비교와 type 비교의 부호가 같은지 확인합니다.
    fn sign_rule(started: &JobEvent, finished: &JobEvent) -> bool {
        let host: Ordering = finished.host.cmp(&started.host);
        let job_type: Ordering = finished.job_type.cmp(&started.job_type);
        host == job_type
    }

    /// 첫 번째로 조건을 만족하는 종료 이벤트를 찾습니다.
    pub fn find_match<'a>(
        &self,
        started: &JobEvent,
        finished: &'a [JobEvent],
    ) -> Result<&'a JobEvent, RunMatcherError> {
        finished
            .iter()
            .find(|candidate| Self::is_candidate(started, candidate))
            .ok_or_else(|| RunMatcherError::NoMatch {
                id: started.id.clone(),
            })
    }

    /// 짝을 찾고 실행 시간을 계산합니다.
    pub fn pair<'a>(
        &self,
        started: &JobEvent,
        finished: &'a [JobEvent],
    ) -> Result<MatchedPair<'a>, RunMatcherError> {
        let matched = self.find_match(started, finished)?;
        Ok(MatchedPair {
            finished: matched,
            duration_ms: elapsed_millis(started, matched),
        })
    }
}

/// 시작 시각부터 종료 시각까지의 경과 시간을 밀리초로 반환합니다.
///
/// 종료가 시작보다 앞서면 음수를 그대로 반환합니다.
pub fn elapsed_millis(started: &JobEvent, finished: &JobEvent) -> i64 {
    (finished.timestamp - started.timestamp).num_milliseconds()
}
