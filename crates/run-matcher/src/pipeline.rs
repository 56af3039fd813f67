//! 실행 오케스트레이션 -- 분류(1단계)와 매칭/기록(2단계)의 전체 흐름을 관리합니다.
//!
//! # 내부 아키텍처
//! ```text
//! File -> BufReader -> LineClassifier -> ClassifiedEvents
//!                                             | Arc (읽기 전용)
//!                         JoinSet[spawn_blocking x N] -> AlertRecorder -> AlertSink
//! ```
//!
//! 1단계는 입력 순서대로 끝까지 진행된 후에만 2단계가 시작됩니다.
//! 2단계의 처리 순서(삽입 순서)는 보장하지 않습니다.

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;
use tokio::fs::File;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::task::JoinSet;

use runwatch_core::pipeline::AlertSink;

use crate::alert::{AlertPolicy, AlertRecorder, RecordOutcome};
use crate::classifier::{ClassifiedEvents, LineClassifier};
use crate::config::RunConfig;
use crate::error::RunMatcherError;
use crate::parser::JsonEventParser;

/// 한 번의 실행 결과 카운터
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// 읽은 라인 수
    pub lines_read: u64,
    /// 디코딩 실패로 버린 라인 수
    pub lines_dropped: u64,
    /// 시작 이벤트 수
    pub started: u64,
    /// 종료 이벤트 수
    pub finished: u64,
    /// 짝을 찾은 시작 이벤트 수
    pub matched: u64,
    /// 짝을 찾지 못한 시작 이벤트 수
    pub unmatched: u64,
    /// 저장에 성공한 레코드 수
    pub recorded: u64,
    /// 저장에 실패한 레코드 수
    pub write_failures: u64,
}

impl RunSummary {
    fn from_events(events: &ClassifiedEvents) -> Self {
        Self {
            lines_read: events.lines_read(),
            lines_dropped: events.lines_dropped(),
            started: events.started().len() as u64,
            finished: events.finished().len() as u64,
            ..Self::default()
        }
    }

    fn absorb(&mut self, tally: &RunTally) {
        self.matched += tally.matched.load(Ordering::Relaxed);
        self.unmatched += tally.unmatched.load(Ordering::Relaxed);
        self.recorded += tally.recorded.load(Ordering::Relaxed);
        self.write_failures += tally.write_failures.load(Ordering::Relaxed);
    }
}

/// 워커들이 공유하는 이벤트 단위 집계
///
/// 시작 이벤트 하나를 처리할 때마다 갱신되므로, 도중에 실패한 워커가
/// 이미 기록한 행도 집계에 남습니다.
#[derive(Debug, Default)]
struct RunTally {
    processed: AtomicU64,
    matched: AtomicU64,
    unmatched: AtomicU64,
    recorded: AtomicU64,
    write_failures: AtomicU64,
}

impl RunTally {
    fn add(&self, outcome: RecordOutcome) {
        match outcome {
            RecordOutcome::Recorded { .. } => {
                self.matched.fetch_add(1, Ordering::Relaxed);
                self.recorded.fetch_add(1, Ordering::Relaxed);
            }
            RecordOutcome::WriteFailed => {
                self.matched.fetch_add(1, Ordering::Relaxed);
                self.write_failures.fetch_add(1, Ordering::Relaxed);
            }
            RecordOutcome::Unmatched => {
                self.unmatched.fetch_add(1, Ordering::Relaxed);
            }
        }
        self.processed.fetch_add(1, Ordering::Relaxed);
    }
}

/// 작업 실행 로그 처리기
///
/// # 사용 예시
/// ```ignore
/// use std::sync::Arc;
/// use runwatch_matcher::{JobRunBuilder, SqliteAlertSink};
///
/// let sink = SqliteAlertSink::open("runwatch.db")?;
/// let run = JobRunBuilder::new()
///     .config(config)
///     .sink(Arc::new(sink))
///     .build()?;
/// let summary = run.run("jobs.log").await?;
/// ```
pub struct JobRun<S: AlertSink + 'static> {
    /// 실행 설정
    config: RunConfig,
    /// 워커들이 공유하는 기록기
    recorder: Arc<AlertRecorder<S>>,
}

impl<S: AlertSink + 'static> JobRun<S> {
    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    pub fn recorder(&self) -> &Arc<AlertRecorder<S>> {
        &self.recorder
    }

    /// 1단계: 입력 파일 전체를 순서대로 분류합니다.
    ///
    /// 파일을 열지 못하거나 읽기 도중 I/O 오류가 나면 실패합니다.
    /// 디코딩 실패 라인은 버려지고 집계만 됩니다.
    pub async fn classify_file(
        &self,
        path: impl AsRef<Path>,
    ) -> Result<ClassifiedEvents, RunMatcherError> {
        let path = path.as_ref();
        let file = File::open(path).await?;
        let mut reader = BufReader::new(file);

        let parser = JsonEventParser::new().with_max_input_size(self.config.max_line_bytes);
        let mut classifier = LineClassifier::new(Box::new(parser));

        // 내용 + "\r\n"까지만 버퍼에 담고, 넘치는 나머지는 버립니다.
        let limit = self.config.max_line_bytes as u64 + 2;
        let mut buf = Vec::new();
        loop {
            buf.clear();
            let n = (&mut reader).take(limit).read_until(b'\n', &mut buf).await?;
            if n == 0 {
                break;
            }
            if !buf.ends_with(b"\n") && n as u64 == limit {
                let skipped = skip_rest_of_line(&mut reader).await?;
                tracing::debug!(kept = n, skipped, "oversized line truncated while reading");
            }
            classifier.classify_bytes(strip_line_ending(&buf));
        }

        let events = classifier.into_events();
        tracing::debug!(
            path = %path.display(),
            lines_read = events.lines_read(),
            lines_dropped = events.lines_dropped(),
            started = events.started().len(),
            finished = events.finished().len(),
            "classification finished"
        );
        Ok(events)
    }

    /// 2단계: 시작 이벤트마다 매칭과 기록을 워커 풀에서 수행합니다.
    ///
    /// 개별 실패는 카운터로만 집계됩니다. 집계는 시작 이벤트 단위로 이루어지므로
    /// 워커 태스크가 도중에 실패해도 이미 기록된 행은 `recorded`에 남고,
    /// 처리하지 못한 나머지 시작 이벤트만 매칭 실패로 집계됩니다.
    ///
    /// 워커 실패는 패닉이 unwind되는 프로파일(테스트 등)에서만 관찰됩니다.
    /// 워크스페이스의 `panic = "abort"` 빌드에서는 프로세스가 종료됩니다.
    pub async fn match_and_record(&self, events: ClassifiedEvents) -> RunSummary {
        let mut summary = RunSummary::from_events(&events);
        let events = Arc::new(events);

        let total = events.started().len();
        if total == 0 {
            return summary;
        }

        let workers = self.config.effective_workers().clamp(1, total);
        let chunk_size = total.div_ceil(workers);

        let tally = Arc::new(RunTally::default());
        let mut tasks = JoinSet::new();
        for start in (0..total).step_by(chunk_size) {
            let end = (start + chunk_size).min(total);
            let events = Arc::clone(&events);
            let recorder = Arc::clone(&self.recorder);
            let tally = Arc::clone(&tally);
            tasks.spawn_blocking(move || {
                for started in &events.started()[start..end] {
                    tally.add(recorder.process(started, events.finished()));
                }
            });
        }
        tracing::debug!(workers, chunk_size, total, "matcher workers spawned");

        while let Some(result) = tasks.join_next().await {
            if let Err(e) = result {
                let err = RunMatcherError::Worker(e.to_string());
                tracing::error!(error = %err, "matcher worker failed");
            }
        }

        summary.absorb(&tally);
        // 실패한 워커가 처리하지 못한 시작 이벤트
        let processed = tally.processed.load(Ordering::Relaxed);
        summary.unmatched += summary.started.saturating_sub(processed);
        summary
    }

    /// 입력 파일 하나를 끝까지 처리합니다.
    pub async fn run(&self, path: impl AsRef<Path>) -> Result<RunSummary, RunMatcherError> {
        let path = path.as_ref();
        tracing::info!(
            path = %path.display(),
            sink = self.recorder.sink().name(),
            threshold_ms = self.recorder.policy().threshold_ms(),
            "job run starting"
        );

        let events = self.classify_file(path).await?;
        let summary = self.match_and_record(events).await;

        tracing::info!(
            lines_read = summary.lines_read,
            lines_dropped = summary.lines_dropped,
            started = summary.started,
            finished = summary.finished,
            matched = summary.matched,
            unmatched = summary.unmatched,
            recorded = summary.recorded,
            write_failures = summary.write_failures,
            "job run finished"
        );
        Ok(summary)
    }
}

/// 다음 `\n`까지(포함) 읽어 버리고, 버린 바이트 수를 반환합니다.
async fn skip_rest_of_line<R>(reader: &mut R) -> std::io::Result<u64>
where
    R: AsyncBufRead + Unpin,
{
    let mut skipped: u64 = 0;
    loop {
        let available = reader.fill_buf().await?;
        if available.is_empty() {
            return Ok(skipped);
        }
        match available.iter().position(|b| *b == b'\n') {
            Some(pos) => {
                reader.consume(pos + 1);
                return Ok(skipped + pos as u64 + 1);
            }
            None => {
                let len = available.len();
                reader.consume(len);
                skipped += len as u64;
            }
        }
    }
}

/// 줄 끝의 `\n` 또는 `\r\n`을 제거합니다.
fn strip_line_ending(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}

/// 작업 실행 처리기 빌더
pub struct JobRunBuilder<S: AlertSink + 'static> {
    config: RunConfig,
    sink: Option<Arc<S>>,
}

impl<S: AlertSink + 'static> JobRunBuilder<S> {
    /// 새 빌더를 생성합니다.
    pub fn new() -> Self {
        Self {
            config: RunConfig::default(),
            sink: None,
        }
    }

    /// 실행 설정을 지정합니다.
    pub fn config(mut self, config: RunConfig) -> Self {
        self.config = config;
        self
    }

    /// 알림 저장소를 지정합니다.
    pub fn sink(mut self, sink: Arc<S>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// 처리기를 빌드합니다.
    ///
    /// 저장소의 스키마를 준비하며, 실패하면 [`RunMatcherError::Sink`]를 반환합니다.
    pub fn build(self) -> Result<JobRun<S>, RunMatcherError> {
        self.config.validate()?;

        let sink = self.sink.ok_or_else(|| RunMatcherError::Config {
            field: "sink".to_owned(),
            reason: "an alert sink is required".to_owned(),
        })?;
        sink.ensure_schema().map_err(|e| RunMatcherError::Sink(e.to_string()))?;

        let policy = AlertPolicy::new(self.config.alert_threshold_ms);
        Ok(JobRun {
            config: self.config,
            recorder: Arc::new(AlertRecorder::new(sink, policy)),
        })
    }
}

impl<S: AlertSink + 'static> Default for JobRunBuilder<S> {
    fn default() -> Self {
        Self::new()
    }
}
