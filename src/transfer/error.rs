// ==========================================
// ERP 表数据传输引擎 - 传输模块错误类型
// ==========================================
// 分类:
// - 启动前致命错误（文件/白名单/表结构/备份）: 不开事务、不写审计
// - 表头校验错误: 整个导入拒绝，零行处理
// - 事务中止: 基础设施故障，整体回滚
// 行级错误不在此枚举中，作为 RowOutcome 数据记录
// ==========================================

use crate::repository::error::RepositoryError;
use std::path::Path;
use thiserror::Error;

/// 传输模块错误类型
#[derive(Error, Debug)]
pub enum TransferError {
    // ===== 表相关错误 =====
    #[error("表不存在: {0}")]
    TableNotFound(String),

    #[error("表不在导入导出白名单内: {0}")]
    TableNotAllowed(String),

    #[error("表结构读取失败: {0}")]
    SchemaError(String),

    // ===== 文件相关错误 =====
    #[error("文件不存在: {0}")]
    FileNotFound(String),

    #[error("文件格式错误: {0}")]
    FormatError(String),

    #[error("文件写入失败 ({path}): {message}")]
    FileWriteError { path: String, message: String },

    // ===== 表头校验 =====
    #[error("文件包含未知列: {}；期望列: {}", .unknown.join(", "), .expected.join(", "))]
    HeaderMismatch {
        unknown: Vec<String>,
        expected: Vec<String>,
    },

    // ===== 备份 / 事务 =====
    #[error("备份快照失败，导入已终止: {0}")]
    BackupFailed(String),

    #[error("导入事务已回滚: {0}")]
    TransactionAborted(String),

    // ===== 下层错误 =====
    #[error("数据库错误: {0}")]
    Repository(RepositoryError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl TransferError {
    pub fn file_write(path: &Path, err: impl std::fmt::Display) -> Self {
        TransferError::FileWriteError {
            path: path.display().to_string(),
            message: err.to_string(),
        }
    }
}

// 实现 From<RepositoryError>（表不存在/不在白名单单独归类）
impl From<RepositoryError> for TransferError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::TableNotFound(t) => TransferError::TableNotFound(t),
            RepositoryError::TableNotAllowed(t) => TransferError::TableNotAllowed(t),
            other => TransferError::Repository(other),
        }
    }
}

// 实现 From<rusqlite::Error>
impl From<rusqlite::Error> for TransferError {
    fn from(err: rusqlite::Error) -> Self {
        TransferError::from(RepositoryError::from(err))
    }
}

// 实现 From<csv::Error>
impl From<csv::Error> for TransferError {
    fn from(err: csv::Error) -> Self {
        TransferError::FormatError(err.to_string())
    }
}

/// Result 类型别名
pub type TransferResult<T> = Result<T, TransferError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_mismatch_message_lists_columns() {
        let err = TransferError::HeaderMismatch {
            unknown: vec!["colour".to_string()],
            expected: vec!["id".to_string(), "name".to_string()],
        };
        let msg = err.to_string();
        assert!(msg.contains("colour"));
        assert!(msg.contains("id, name"));
    }

    #[test]
    fn test_repository_table_errors_are_reclassified() {
        let err = TransferError::from(RepositoryError::TableNotFound("ghost".to_string()));
        assert!(matches!(err, TransferError::TableNotFound(t) if t == "ghost"));
    }
}
