//! SQLite 알림 저장소
//!
//! `Alert` 테이블에 레코드를 한 건씩 삽입합니다. 연결은 하나를 `Mutex`로 감싸
//! 여러 워커가 공유하며, 각 삽입은 독립적으로 커밋됩니다.
//!
//! # 테이블 구조
//! ```text
//! Alert (id VARCHAR(20), duration INTEGER, type VARCHAR(50), host VARCHAR(50), alert BOOLEAN)
//! ```

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use rusqlite::{Connection, params};

use runwatch_core::error::{RunwatchError, StorageError};
use runwatch_core::pipeline::AlertSink;
use runwatch_core::types::AlertRecord;

const CREATE_TABLE_SQL: &str = "CREATE TABLE IF NOT EXISTS Alert (\
    id VARCHAR(20), \
    duration INTEGER, \
    type VARCHAR(50), \
    host VARCHAR(50), \
    alert BOOLEAN)";

const INSERT_SQL: &str = "INSERT INTO Alert (id, duration, type, host, alert) VALUES (?1, ?2, ?3, ?4, ?5)";

const COUNT_SQL: &str = "SELECT COUNT(*) FROM Alert";

const SELECT_ALL_SQL: &str = "SELECT id, duration, type, host, alert FROM Alert ORDER BY rowid";

/// SQLite 알림 저장소
#[derive(Debug)]
pub struct SqliteAlertSink {
    /// 공유 연결
    conn: Mutex<Connection>,
}

impl SqliteAlertSink {
    /// 데이터베이스 파일을 열거나 생성합니다.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, RunwatchError> {
        let path = path.as_ref();
        let conn = Connection::open(path).map_err(|e| {
            StorageError::Connection(format!("failed to open '{}': {}", path.display(), e))
        })?;
        tracing::debug!(path = %path.display(), "sqlite alert sink opened");
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// 메모리 데이터베이스를 엽니다.
    pub fn open_in_memory() -> Result<Self, RunwatchError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| StorageError::Connection(format!("failed to open in-memory db: {}", e)))?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, StorageError> {
        self.conn
            .lock()
            .map_err(|_| StorageError::Query("connection lock poisoned".to_owned()))
    }

    /// 저장된 모든 레코드를 삽입 순서대로 읽습니다.
    pub fn records(&self) -> Result<Vec<AlertRecord>, RunwatchError> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare(SELECT_ALL_SQL)
            .map_err(|e| StorageError::Query(e.to_string()))?;
        let rows = stmt
            .query_map([], |row| {
                Ok(AlertRecord {
                    id: row.get(0)?,
                    duration_ms: row.get(1)?,
                    job_type: row.get(2)?,
                    host: row.get(3)?,
                    alert: row.get(4)?,
                })
            })
            .map_err(|e| StorageError::Query(e.to_string()))?;

        let mut records = Vec::new();
        for row in rows {
            records.push(row.map_err(|e| StorageError::Query(e.to_string()))?);
        }
        Ok(records)
    }
}

impl AlertSink for SqliteAlertSink {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn ensure_schema(&self) -> Result<(), RunwatchError> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| StorageError::Schema("connection lock poisoned".to_owned()))?;
        conn.execute(CREATE_TABLE_SQL, [])
            .map_err(|e| StorageError::Schema(e.to_string()))?;
        Ok(())
    }

    fn insert(&self, record: &AlertRecord) -> Result<(), RunwatchError> {
        let conn = self.lock()?;
        conn.execute(
            INSERT_SQL,
            params![
                record.id,
                record.duration_ms,
                record.job_type,
                record.host,
                record.alert
            ],
        )
        .map_err(|e| StorageError::Query(e.to_string()))?;
        Ok(())
    }

    fn count(&self) -> Result<u64, RunwatchError> {
        let conn = self.lock()?;
        let count: i64 = conn
            .query_row(COUNT_SQL, [], |row| row.get(0))
            .map_err(|e| StorageError::Query(e.to_string()))?;
        Ok(count.max(0) as u64)
    }
}
