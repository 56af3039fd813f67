//! 파이프라인 trait — 모듈 확장 포인트 정의

use crate::error::RunwatchError;
use crate::types::{AlertRecord, JobEvent};

/// 이벤트 파서 trait
///
/// 새로운 로그 형식을 지원하려면 이 trait을 구현합니다.
pub trait EventParser: Send + Sync {
    /// 지원하는 로그 형식 이름
    fn format_name(&self) -> &str;

    /// 원시 바이트를 작업 이벤트로 파싱
    fn parse(&self, raw: &[u8]) -> Result<JobEvent, RunwatchError>;
}

/// 알림 저장소 trait
///
/// 매칭 단계의 여러 워커가 동시에 호출하므로 `Send + Sync`여야 합니다.
/// 내부 핸들이 동시 접근을 지원하지 않으면 구현체가 직접 직렬화합니다.
pub trait AlertSink: Send + Sync {
    /// 저장소 이름 (로그 출력용)
    fn name(&self) -> &str;

    /// 테이블이 없으면 생성합니다. 여러 번 호출해도 안전해야 합니다.
    fn ensure_schema(&self) -> Result<(), RunwatchError>;

    /// 레코드 한 건을 삽입합니다.
    fn insert(&self, record: &AlertRecord) -> Result<(), RunwatchError>;

    /// 저장된 레코드 수를 반환합니다.
    fn count(&self) -> Result<u64, RunwatchError>;
}
