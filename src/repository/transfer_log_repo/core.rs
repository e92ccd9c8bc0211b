use crate::domain::transfer_log::TransferLogEntry;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};

/// 时间戳存储格式
pub(super) const TS_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// ==========================================
// TransferLogRepository - 传输日志仓储
// ==========================================
// 红线: Repository 不做业务逻辑,只做数据映射
pub struct TransferLogRepository {
    conn: Arc<Mutex<Connection>>,
}

impl TransferLogRepository {
    /// 创建新的传输日志仓储
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    pub(super) fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    // ==========================================
    // 写入操作
    // ==========================================

    /// 插入传输日志
    ///
    /// # 返回
    /// - `Ok(log_id)`: 成功插入
    /// - `Err(...)`: 数据库错误
    pub fn insert(&self, entry: &TransferLogEntry) -> RepositoryResult<String> {
        let conn = self.get_conn()?;
        Self::insert_with_conn(&conn, entry)
    }

    /// 在已持有的连接上插入（导入流程内部使用，避免重复加锁）
    pub fn insert_with_conn(conn: &Connection, entry: &TransferLogEntry) -> RepositoryResult<String> {
        conn.execute(
            r#"
            INSERT INTO transfer_log (
                log_id, operator_id, table_name, operation, file_ref,
                record_count, success_count, failed_count, status,
                error_log, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
            params![
                entry.log_id,
                entry.operator_id,
                entry.table_name,
                entry.operation.as_str(),
                entry.file_ref,
                entry.record_count as i64,
                entry.success_count as i64,
                entry.failed_count as i64,
                entry.status.as_str(),
                entry.error_log,
                entry.created_at.format(TS_FORMAT).to_string(),
            ],
        )?;

        Ok(entry.log_id.clone())
    }
}
