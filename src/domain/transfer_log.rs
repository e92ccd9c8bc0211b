// ==========================================
// ERP 表数据传输引擎 - 传输日志领域模型
// ==========================================
// 红线: 每次进入行处理阶段的导入、每次用户导出，恰好一条记录
// 对齐: transfer_log 表
// ==========================================

use crate::domain::types::{TransferOperation, TransferStatus};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

// ==========================================
// TransferLogEntry - 传输审计记录
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferLogEntry {
    pub log_id: String,
    pub operator_id: i64,
    pub table_name: String,
    pub operation: TransferOperation,
    pub file_ref: String,          // 源文件（导入）或输出文件（导出）
    pub record_count: usize,
    pub success_count: usize,
    pub failed_count: usize,
    pub status: TransferStatus,
    pub error_log: Option<String>, // 行错误列表（JSON）
    pub created_at: NaiveDateTime,
}
