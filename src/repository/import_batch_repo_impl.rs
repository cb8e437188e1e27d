// ==========================================
// 文件编码管理 - 导入批次审计 Repository 实现
// ==========================================
// 存储: import_batch 表（见 db::ensure_schema）
// error_lines 以 JSON 数组存储，imported_at 以 RFC3339 存储
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::import::ImportBatch;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::import_batch_repo::ImportBatchRepository;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};
use std::sync::{Arc, Mutex, MutexGuard};

const SELECT_COLUMNS: &str = r#"
    SELECT batch_id, file_name, total_parents, success_count, failure_count,
           created_parents, created_children, skipped_children,
           error_lines_json, imported_at, elapsed_ms
    FROM import_batch
"#;

// ==========================================
// ImportBatchRepositoryImpl
// ==========================================
pub struct ImportBatchRepositoryImpl {
    conn: Arc<Mutex<Connection>>,
}

impl ImportBatchRepositoryImpl {
    /// 按路径打开（自动建表）
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 复用已有连接（调用方负责建表）
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }
}

fn map_row(row: &Row<'_>) -> rusqlite::Result<(ImportBatch, String)> {
    let imported_at: String = row.get(9)?;
    let imported_at = DateTime::parse_from_rfc3339(&imported_at)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(9, rusqlite::types::Type::Text, Box::new(e))
        })?;

    let batch = ImportBatch {
        batch_id: row.get(0)?,
        file_name: row.get(1)?,
        total_parents: row.get(2)?,
        success_count: row.get(3)?,
        failure_count: row.get(4)?,
        created_parents: row.get(5)?,
        created_children: row.get(6)?,
        skipped_children: row.get(7)?,
        error_lines: Vec::new(),
        imported_at,
        elapsed_ms: row.get(10)?,
    };
    Ok((batch, row.get(8)?))
}

fn attach_error_lines(
    (mut batch, error_lines_json): (ImportBatch, String),
) -> RepositoryResult<ImportBatch> {
    batch.error_lines = serde_json::from_str(&error_lines_json)?;
    Ok(batch)
}

#[async_trait]
impl ImportBatchRepository for ImportBatchRepositoryImpl {
    async fn insert_batch(&self, batch: &ImportBatch) -> RepositoryResult<()> {
        let error_lines_json = serde_json::to_string(&batch.error_lines)?;
        let conn = self.get_conn()?;

        conn.execute(
            r#"
            INSERT INTO import_batch (
                batch_id, file_name, total_parents, success_count, failure_count,
                created_parents, created_children, skipped_children,
                error_lines_json, imported_at, elapsed_ms
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
            params![
                batch.batch_id,
                batch.file_name,
                batch.total_parents,
                batch.success_count,
                batch.failure_count,
                batch.created_parents,
                batch.created_children,
                batch.skipped_children,
                error_lines_json,
                batch.imported_at.to_rfc3339(),
                batch.elapsed_ms,
            ],
        )?;

        Ok(())
    }

    async fn get_recent_batches(&self, limit: usize) -> RepositoryResult<Vec<ImportBatch>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(&format!(
            "{} ORDER BY imported_at DESC LIMIT ?1",
            SELECT_COLUMNS
        ))?;
        let rows = stmt
            .query_map(params![limit as i64], map_row)?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter().map(attach_error_lines).collect()
    }

    async fn get_batch(&self, batch_id: &str) -> RepositoryResult<ImportBatch> {
        let conn = self.get_conn()?;

        let row = conn
            .query_row(
                &format!("{} WHERE batch_id = ?1", SELECT_COLUMNS),
                params![batch_id],
                map_row,
            )
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => RepositoryError::NotFound {
                    entity: "ImportBatch".to_string(),
                    id: batch_id.to_string(),
                },
                other => other.into(),
            })?;

        attach_error_lines(row)
    }
}
