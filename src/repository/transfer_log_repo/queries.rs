use super::core::{TransferLogRepository, TS_FORMAT};
use crate::domain::transfer_log::TransferLogEntry;
use crate::domain::types::{TransferOperation, TransferStatus};
use crate::repository::error::RepositoryResult;
use chrono::NaiveDateTime;
use rusqlite::{params, Result as SqliteResult, Row};

const SELECT_COLUMNS: &str = r#"
    SELECT log_id, operator_id, table_name, operation, file_ref,
           record_count, success_count, failed_count, status,
           error_log, created_at
    FROM transfer_log
"#;

impl TransferLogRepository {
    // ==========================================
    // 查询操作
    // ==========================================

    /// 按 log_id 查询单条日志
    pub fn find_by_id(&self, log_id: &str) -> RepositoryResult<Option<TransferLogEntry>> {
        let conn = self.get_conn()?;

        let sql = format!("{} WHERE log_id = ?", SELECT_COLUMNS);
        let mut stmt = conn.prepare(&sql)?;

        match stmt.query_row(params![log_id], map_row) {
            Ok(entry) => Ok(Some(entry)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// 最近的传输日志
    pub fn list_recent(&self, limit: usize) -> RepositoryResult<Vec<TransferLogEntry>> {
        let conn = self.get_conn()?;

        let sql = format!("{} ORDER BY created_at DESC, rowid DESC LIMIT ?", SELECT_COLUMNS);
        let mut stmt = conn.prepare(&sql)?;
        let entries = stmt
            .query_map(params![limit as i64], map_row)?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(entries)
    }

    /// 指定表的传输日志
    pub fn list_by_table(&self, table_name: &str, limit: usize) -> RepositoryResult<Vec<TransferLogEntry>> {
        let conn = self.get_conn()?;

        let sql = format!(
            "{} WHERE table_name = ? ORDER BY created_at DESC, rowid DESC LIMIT ?",
            SELECT_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let entries = stmt
            .query_map(params![table_name, limit as i64], map_row)?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(entries)
    }

    /// 指定表、指定操作类型的日志条数
    pub fn count_by_table(&self, table_name: &str, operation: TransferOperation) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let count = conn.query_row(
            "SELECT COUNT(*) FROM transfer_log WHERE table_name = ?1 AND operation = ?2",
            params![table_name, operation.as_str()],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}

fn map_row(row: &Row<'_>) -> SqliteResult<TransferLogEntry> {
    let operation_raw: String = row.get(3)?;
    let status_raw: String = row.get(8)?;
    let created_raw: String = row.get(10)?;

    // CHECK 约束保证取值合法；历史脏数据按最保守的值兜底
    let operation = TransferOperation::parse(&operation_raw).unwrap_or(TransferOperation::Import);
    let status = TransferStatus::parse(&status_raw).unwrap_or(TransferStatus::Failed);
    let created_at = NaiveDateTime::parse_from_str(&created_raw, TS_FORMAT)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(10, rusqlite::types::Type::Text, Box::new(e)))?;

    Ok(TransferLogEntry {
        log_id: row.get(0)?,
        operator_id: row.get(1)?,
        table_name: row.get(2)?,
        operation,
        file_ref: row.get(4)?,
        record_count: row.get::<_, i64>(5)? as usize,
        success_count: row.get::<_, i64>(6)? as usize,
        failed_count: row.get::<_, i64>(7)? as usize,
        status,
        error_log: row.get(9)?,
        created_at,
    })
}
