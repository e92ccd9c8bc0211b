// ==========================================
// ERP 表数据传输引擎 - 传输配置
// ==========================================
// 职责: 输出目录 / 操作人引用列 / NULL 字面量 / 内部表清单
// 默认值: 位于系统本地数据目录下
// ==========================================

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// 默认应用目录名
pub const APP_DIR_NAME: &str = "erp-table-transfer";

// ==========================================
// ActorReferenceConfig - 操作人引用列配置
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorReferenceConfig {
    pub actor_table: String,
    pub actor_key_column: String,
    /// 归属类列: 引用失效时改写为当前操作人
    pub owner_columns: Vec<String>,
    /// 其他引用列: 引用失效时置 NULL
    pub nullable_columns: Vec<String>,
}

impl Default for ActorReferenceConfig {
    fn default() -> Self {
        Self {
            actor_table: "users".to_string(),
            actor_key_column: "id".to_string(),
            owner_columns: vec!["created_by".to_string(), "owner_id".to_string()],
            nullable_columns: vec![
                "updated_by".to_string(),
                "assigned_to".to_string(),
                "assignee_id".to_string(),
                "user_id".to_string(),
                "reporting_manager_id".to_string(),
            ],
        }
    }
}

impl ActorReferenceConfig {
    pub fn is_owner_column(&self, column: &str) -> bool {
        self.owner_columns.iter().any(|c| c == column)
    }

    pub fn is_actor_column(&self, column: &str) -> bool {
        self.is_owner_column(column) || self.nullable_columns.iter().any(|c| c == column)
    }
}

// ==========================================
// TransferConfig - 传输配置全集
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferConfig {
    pub backup_dir: PathBuf,
    pub error_dir: PathBuf,
    pub export_dir: PathBuf,
    pub sample_dir: PathBuf,
    pub actor_reference: ActorReferenceConfig,
    /// 导入时视为 SQL NULL 的字面量（精确匹配，已 trim）
    pub null_sentinels: Vec<String>,
    /// 生命周期时间戳列（插入时总是可选）
    pub lifecycle_columns: Vec<String>,
    /// 不允许导入导出的内部表
    pub internal_tables: Vec<String>,
}

impl Default for TransferConfig {
    fn default() -> Self {
        let base = dirs::data_local_dir()
            .map(|d| d.join(APP_DIR_NAME))
            .unwrap_or_else(|| PathBuf::from("./data"));
        Self::with_base_dir(base)
    }
}

impl TransferConfig {
    /// 以指定根目录构造配置（四类输出目录均位于其下）
    pub fn with_base_dir(base: impl Into<PathBuf>) -> Self {
        let base = base.into();
        Self {
            backup_dir: base.join("backups"),
            error_dir: base.join("error_reports"),
            export_dir: base.join("exports"),
            sample_dir: base.join("samples"),
            actor_reference: ActorReferenceConfig::default(),
            null_sentinels: default_null_sentinels(),
            lifecycle_columns: vec!["created_at".to_string(), "updated_at".to_string()],
            internal_tables: default_internal_tables(),
        }
    }

    pub fn is_null_sentinel(&self, value: &str) -> bool {
        self.null_sentinels.iter().any(|s| s == value)
    }
}

pub fn default_null_sentinels() -> Vec<String> {
    vec![
        String::new(),
        "NULL".to_string(),
        "0000-00-00".to_string(),
        "0000-00-00 00:00:00".to_string(),
    ]
}

pub fn default_internal_tables() -> Vec<String> {
    vec![
        "transfer_log".to_string(),
        "config_kv".to_string(),
        "config_scope".to_string(),
        "schema_version".to_string(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_base_dir_layout() {
        let config = TransferConfig::with_base_dir("/tmp/erp");
        assert_eq!(config.backup_dir, PathBuf::from("/tmp/erp/backups"));
        assert_eq!(config.error_dir, PathBuf::from("/tmp/erp/error_reports"));
        assert!(config.is_null_sentinel(""));
        assert!(config.is_null_sentinel("0000-00-00 00:00:00"));
        assert!(!config.is_null_sentinel("null"));
    }

    #[test]
    fn test_actor_columns() {
        let actors = ActorReferenceConfig::default();
        assert!(actors.is_owner_column("created_by"));
        assert!(!actors.is_owner_column("updated_by"));
        assert!(actors.is_actor_column("updated_by"));
        assert!(!actors.is_actor_column("name"));
    }
}
