// ==========================================
// ERP 表数据传输引擎 - 领域模型层
// ==========================================
// 职责: 定义表结构、传输作业、行结果、审计记录
// 红线: 不含数据访问逻辑,不含传输流程逻辑
// ==========================================

pub mod schema;
pub mod transfer;
pub mod transfer_log;
pub mod types;

// 重导出核心类型
pub use schema::{ColumnDescriptor, TableSchema};
pub use transfer::{
    collect_row_errors, ExportResult, ImportJob, ImportResult, OperatorContext, RowError,
    RowFields, RowOutcome, RowRecord,
};
pub use transfer_log::TransferLogEntry;
pub use types::{OutcomeKind, TransferOperation, TransferStatus};
