#![doc = include_str!("../README.md")]
//!
//! # 모듈 구성
//!
//! - [`parser`]: JSON lines 형식의 이벤트 파서
//! - [`classifier`]: 라인을 시작/종료 이벤트 목록으로 분류
//! - [`matcher`]: 시작 이벤트마다 첫 번째로 조건을 만족하는 종료 이벤트 선택
//! - [`alert`]: 임계값 판정 및 알림 레코드 기록
//! - [`sink`]: `Alert` 테이블 저장소 (SQLite)
//! - [`pipeline`]: 2단계 실행 오케스트레이션
//! - [`config`]: 실행 설정 (core 설정에서 파생)
//! - [`error`]: 도메인 에러 타입

pub mod alert;
pub mod classifier;
pub mod config;
pub mod error;
pub mod matcher;
pub mod pipeline;

pub mod parser;
pub mod sink;

// --- 주요 타입 re-export ---

// 실행
pub use pipeline::{JobRun, JobRunBuilder, RunSummary};

// 설정
pub use config::RunConfig;

// 에러
pub use error::RunMatcherError;

// 파서 / 분류기
pub use classifier::{Classification, ClassifiedEvents, LineClassifier};
pub use parser::JsonEventParser;

// 매칭
pub use matcher::{MatchedPair, PairMatcher};

// 알림
pub use alert::{AlertPolicy, AlertRecorder, RecordOutcome};

// 저장소
pub use sink::SqliteAlertSink;
