// ==========================================
// ERP 表数据传输引擎 - 传输层
// ==========================================
// 职责: 文件编解码 / 行校验 / 外键修复 / 单事务执行 / 备份 / 错误报告 / 审计
// 红线: 行级失败是数据，不是错误；只有基础设施故障才回滚整个导入
// ==========================================

pub mod audit_logger;
pub mod backup_manager;
pub mod csv_codec;
pub mod error;
pub mod error_reporter;
pub mod fk_remediator;
pub mod row_validator;
pub mod table_exporter;
pub mod table_importer;
pub mod transfer_trait;
pub mod tx_executor;

// 重导出核心类型
pub use audit_logger::AuditLogger;
pub use backup_manager::BackupManager;
pub use csv_codec::CsvCodec;
pub use error::{TransferError, TransferResult};
pub use error_reporter::ErrorReporter;
pub use fk_remediator::{ForeignKeyRemediator, Remediation};
pub use row_validator::{validate_headers, RowPlan, RowRejection, RowValidator};
pub use table_exporter::TableExporter;
pub use table_importer::TableImporter;
pub use transfer_trait::{ParsedFile, TabularReader, TabularWriter};
pub use tx_executor::{ExecutionReport, TransactionExecutor};
