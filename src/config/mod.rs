// ==========================================
// ERP 表数据传输引擎 - 配置层
// ==========================================
// 职责: 传输配置管理,支持 config_kv 覆写
// 存储: config_kv 表（scope_id = 'global'，键前缀 transfer/）
// ==========================================

pub mod config_manager;
pub mod transfer_config;
pub mod transfer_config_trait;

// 重导出核心配置管理器
pub use config_manager::{config_keys, ConfigManager};
pub use transfer_config::{ActorReferenceConfig, TransferConfig};
pub use transfer_config_trait::TransferConfigReader;
