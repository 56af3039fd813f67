//! 알림 저장소 모듈
//!
//! 각 저장소는 core의 [`AlertSink`](runwatch_core::pipeline::AlertSink) trait을 구현합니다.
//! 현재는 SQLite([`SqliteAlertSink`])만 지원합니다.

pub mod sqlite;

pub use sqlite::SqliteAlertSink;
