// ==========================================
// ERP 表数据传输引擎 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================
// 职责: 表结构读取 / 白名单 / 通用表数据 / 传输日志
// 约束: 值全部参数化；标识符先校验再引用
// ==========================================

pub mod error;
pub mod schema_repo;
pub mod table_data_repo;
pub mod table_registry;
pub mod transfer_log_repo;

// 重导出核心仓储
pub use error::{RepositoryError, RepositoryResult};
pub use schema_repo::SchemaRepository;
pub use table_data_repo::TableDataRepository;
pub use table_registry::{SqliteTableRegistry, TableRegistry};
pub use transfer_log_repo::TransferLogRepository;
