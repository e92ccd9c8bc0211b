// ==========================================
// ERP 表数据传输引擎 - 导入前备份
// ==========================================
// 路径: <backup_dir>/<YYYY-MM-DD>/<HH>/<table>_<YYYYMMDD_HHMMSS>_<job8>.csv
// 红线: 备份失败则整个导入终止，不触碰任何行；备份不写审计
// ==========================================

use crate::domain::schema::TableSchema;
use crate::domain::transfer::ImportJob;
use crate::transfer::error::{TransferError, TransferResult};
use crate::transfer::transfer_trait::TabularWriter;
use rusqlite::Connection;
use std::path::{Path, PathBuf};
use tracing::{error, info};

// ==========================================
// BackupManager
// ==========================================
pub struct BackupManager<'a> {
    backup_dir: &'a Path,
    writer: &'a dyn TabularWriter,
}

impl<'a> BackupManager<'a> {
    pub fn new(backup_dir: &'a Path, writer: &'a dyn TabularWriter) -> Self {
        Self { backup_dir, writer }
    }

    /// 快照文件路径（按日期/小时分目录，job 前缀避免同秒冲突）
    pub fn snapshot_path(&self, table: &str, job: &ImportJob) -> PathBuf {
        let now = job.started_at;
        self.backup_dir
            .join(now.format("%Y-%m-%d").to_string())
            .join(now.format("%H").to_string())
            .join(format!(
                "{}_{}_{}.csv",
                table,
                now.format("%Y%m%d_%H%M%S"),
                job.short_id()
            ))
    }

    /// 全表快照
    ///
    /// # 返回
    /// - Ok(PathBuf): 快照文件路径
    /// - Err(BackupFailed): 目录不可写 / 读取失败
    pub fn snapshot(
        &self,
        conn: &Connection,
        schema: &TableSchema,
        job: &ImportJob,
    ) -> TransferResult<PathBuf> {
        let path = self.snapshot_path(&schema.table_name, job);

        match self.writer.write_export(conn, schema, &path) {
            Ok(rows) => {
                info!(
                    table = %schema.table_name,
                    rows = rows,
                    path = %path.display(),
                    "导入前备份完成"
                );
                Ok(path)
            }
            Err(e) => {
                error!(table = %schema.table_name, error = %e, "导入前备份失败");
                Err(TransferError::BackupFailed(e.to_string()))
            }
        }
    }
}
