// ==========================================
// ERP 表数据传输引擎 - API 层
// ==========================================
// 职责: 对外门面，供命令行 / 上层服务调用
// ==========================================

pub mod error;
pub mod transfer_api;

// 重导出核心类型
pub use error::{ApiError, ApiResult};
pub use transfer_api::{TransferApi, DEFAULT_LOG_LIMIT};
