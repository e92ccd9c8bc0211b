// ==========================================
// ERP 表数据传输引擎 - 表白名单（Table Registry）
// ==========================================
// 职责: 决定哪些表允许导入导出（排除 sqlite_ 系统表与内部表）
// 红线: 任何 SQL 拼接表名之前必须先通过白名单
// ==========================================

use crate::db::table_exists;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::Connection;

// ==========================================
// TableRegistry Trait
// ==========================================
// 实现者: SqliteTableRegistry
pub trait TableRegistry: Send + Sync {
    /// 允许导入导出的表（按名称排序）
    fn allowed_tables(&self, conn: &Connection) -> RepositoryResult<Vec<String>>;

    /// 校验表是否允许操作
    ///
    /// # 返回
    /// - Err(TableNotFound): 表不存在
    /// - Err(TableNotAllowed): 表存在但不在白名单
    fn ensure_allowed(&self, conn: &Connection, table: &str) -> RepositoryResult<()> {
        if self.allowed_tables(conn)?.iter().any(|t| t == table) {
            return Ok(());
        }
        if table_exists(conn, table)? {
            Err(RepositoryError::TableNotAllowed(table.to_string()))
        } else {
            Err(RepositoryError::TableNotFound(table.to_string()))
        }
    }
}

// ==========================================
// SqliteTableRegistry - 基于 sqlite_master 的白名单
// ==========================================
#[derive(Debug, Clone)]
pub struct SqliteTableRegistry {
    internal_tables: Vec<String>,
}

impl SqliteTableRegistry {
    pub fn new(internal_tables: Vec<String>) -> Self {
        Self { internal_tables }
    }

    fn is_internal(&self, table: &str) -> bool {
        table.starts_with("sqlite_") || self.internal_tables.iter().any(|t| t == table)
    }
}

impl TableRegistry for SqliteTableRegistry {
    fn allowed_tables(&self, conn: &Connection) -> RepositoryResult<Vec<String>> {
        let mut stmt =
            conn.prepare("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(names.into_iter().filter(|n| !self.is_internal(n)).collect())
    }
}
