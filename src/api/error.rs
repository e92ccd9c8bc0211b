// ==========================================
// ERP 表数据传输引擎 - API 层错误类型
// ==========================================
// 职责: 把仓储层 / 传输层错误转换为面向调用方的错误分类
// 所有错误信息必须包含显式原因
// ==========================================

use crate::repository::error::RepositoryError;
use crate::transfer::error::TransferError;
use thiserror::Error;

/// API 层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 调用方输入错误
    // ==========================================
    #[error("无效输入: {0}")]
    InvalidInput(String),

    #[error("资源未找到: {0}")]
    NotFound(String),

    // ==========================================
    // 传输错误
    // ==========================================
    #[error("文件导入失败: {0}")]
    ImportError(String),

    #[error("文件导出失败: {0}")]
    ExportError(String),

    // ==========================================
    // 数据访问错误
    // ==========================================
    #[error("数据库错误: {0}")]
    DatabaseError(String),

    #[error("数据库连接失败: {0}")]
    DatabaseConnectionError(String),

    // ==========================================
    // 通用错误
    // ==========================================
    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ==========================================
// 从 RepositoryError 转换
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::TableNotFound(t) => ApiError::NotFound(format!("表 {}", t)),
            RepositoryError::TableNotAllowed(t) => {
                ApiError::InvalidInput(format!("表 {} 不允许导入导出", t))
            }
            RepositoryError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{} (id={})", entity, id))
            }
            RepositoryError::LockError(msg) => {
                ApiError::DatabaseConnectionError(format!("数据库锁获取失败: {}", msg))
            }
            RepositoryError::Other(err) => ApiError::Other(err),
            other => ApiError::DatabaseError(other.to_string()),
        }
    }
}

// ==========================================
// 从 TransferError 转换
// ==========================================
// 导入与导出共用；导出侧的文件错误由调用处改写为 ExportError
impl From<TransferError> for ApiError {
    fn from(err: TransferError) -> Self {
        match err {
            TransferError::TableNotFound(t) => ApiError::NotFound(format!("表 {}", t)),
            TransferError::TableNotAllowed(t) => {
                ApiError::InvalidInput(format!("表 {} 不允许导入导出", t))
            }
            TransferError::FileNotFound(path) => ApiError::NotFound(format!("文件 {}", path)),
            e @ TransferError::HeaderMismatch { .. } => ApiError::InvalidInput(e.to_string()),
            e @ (TransferError::FormatError(_)
            | TransferError::BackupFailed(_)
            | TransferError::TransactionAborted(_)) => ApiError::ImportError(e.to_string()),
            e @ TransferError::FileWriteError { .. } => ApiError::ExportError(e.to_string()),
            TransferError::SchemaError(msg) => ApiError::DatabaseError(msg),
            TransferError::Repository(err) => ApiError::from(err),
            TransferError::Other(err) => ApiError::Other(err),
        }
    }
}

/// API Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;
