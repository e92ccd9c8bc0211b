// ==========================================
// ERP 表数据传输引擎 - 核心库
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: 任意白名单表的导出 / 样例模板 / 回导（备份 + 逐行校验 + 外键修复 + 审计）
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 传输层 - 导入导出流程
pub mod transfer;

// 配置层 - 传输配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一/内部表）
pub mod db;

// 日志系统
pub mod logging;

// API 层 - 对外接口
pub mod api;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{OutcomeKind, TransferOperation, TransferStatus};

// 领域实体
pub use domain::{
    ColumnDescriptor, ExportResult, ImportJob, ImportResult, OperatorContext, RowOutcome,
    TableSchema, TransferLogEntry,
};

// 传输
pub use transfer::{TableExporter, TableImporter, TransferError, TransferResult};

// 配置
pub use config::{ConfigManager, TransferConfig};

// API
pub use api::{ApiError, ApiResult, TransferApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "ERP 表数据传输引擎";
