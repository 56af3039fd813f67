//! 이벤트 파싱 모듈
//!
//! 각 파서는 core의 [`EventParser`](runwatch_core::pipeline::EventParser) trait을 구현합니다.
//! 현재는 JSON lines 형식([`JsonEventParser`])만 지원합니다.

pub mod json;

pub use json::JsonEventParser;
