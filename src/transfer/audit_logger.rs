// ==========================================
// ERP 表数据传输引擎 - 审计日志
// ==========================================
// 每次进入行处理阶段的导入、每次用户导出，恰好写一条 transfer_log
// 备份快照与样例模板不写审计
// ==========================================

use crate::domain::transfer::{ImportJob, OperatorContext, RowError};
use crate::domain::transfer_log::TransferLogEntry;
use crate::domain::types::{TransferOperation, TransferStatus};
use crate::repository::{RepositoryResult, TransferLogRepository};
use chrono::NaiveDateTime;
use rusqlite::Connection;
use std::path::Path;
use tracing::debug;
use uuid::Uuid;

/// 导入审计所需的计数
#[derive(Debug, Clone, Copy)]
pub struct ImportCounts {
    pub total: usize,
    pub success: usize,
    pub failed: usize,
}

pub struct AuditLogger;

impl AuditLogger {
    /// 记录一次导入
    pub fn record_import(
        conn: &Connection,
        job: &ImportJob,
        counts: ImportCounts,
        status: TransferStatus,
        errors: &[RowError],
    ) -> RepositoryResult<String> {
        let error_log = if errors.is_empty() {
            None
        } else {
            Some(serde_json::to_string(errors).map_err(|e| anyhow::anyhow!(e))?)
        };

        let entry = TransferLogEntry {
            log_id: Uuid::new_v4().to_string(),
            operator_id: job.operator.operator_id,
            table_name: job.table_name.clone(),
            operation: TransferOperation::Import,
            file_ref: job.source_file.display().to_string(),
            record_count: counts.total,
            success_count: counts.success,
            failed_count: counts.failed,
            status,
            error_log,
            created_at: job.started_at,
        };
        let log_id = TransferLogRepository::insert_with_conn(conn, &entry)?;
        debug!(log_id = %log_id, status = %status, "导入审计已写入");
        Ok(log_id)
    }

    /// 记录一次用户导出
    pub fn record_export(
        conn: &Connection,
        table: &str,
        operator: &OperatorContext,
        file_path: &Path,
        record_count: usize,
        now: NaiveDateTime,
    ) -> RepositoryResult<String> {
        let entry = TransferLogEntry {
            log_id: Uuid::new_v4().to_string(),
            operator_id: operator.operator_id,
            table_name: table.to_string(),
            operation: TransferOperation::Export,
            file_ref: file_path.display().to_string(),
            record_count,
            success_count: record_count,
            failed_count: 0,
            status: TransferStatus::Success,
            error_log: None,
            created_at: now,
        };
        TransferLogRepository::insert_with_conn(conn, &entry)
    }
}
