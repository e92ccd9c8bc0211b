// ==========================================
// ERP 表数据传输引擎 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: config_kv 表 (key-value + scope)
// 规则: 键不存在时回落到默认配置；列表值为 JSON 数组
// ==========================================

use crate::config::transfer_config::{ActorReferenceConfig, TransferConfig};
use crate::config::transfer_config_trait::TransferConfigReader;
use crate::db::open_sqlite_connection;
use rusqlite::{params, Connection};
use std::error::Error;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
    defaults: TransferConfig,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> Result<Self, Box<dyn Error>> {
        let conn = open_sqlite_connection(db_path)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            defaults: TransferConfig::default(),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：为保证连接行为一致，会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Result<Self, Box<dyn Error>> {
        {
            let conn_guard = conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
        }

        Ok(Self {
            conn,
            defaults: TransferConfig::default(),
        })
    }

    /// 替换默认配置（config_kv 未覆写的键使用此值）
    pub fn with_defaults(mut self, defaults: TransferConfig) -> Self {
        self.defaults = defaults;
        self
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在（或 config_kv 表尚未创建）
    fn get_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        if !crate::db::table_exists(&conn, "config_kv")? {
            return Ok(None);
        }

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(Box::new(e)),
        }
    }

    /// 写入 global scope 的配置值（UPSERT）
    pub fn set_global_config_value(&self, key: &str, value: &str) -> Result<(), Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value) VALUES ('global', ?1, ?2)
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2, updated_at = datetime('now')",
            params![key, value],
        )?;
        Ok(())
    }

    fn get_path_or_default(&self, key: &str, default: &PathBuf) -> Result<PathBuf, Box<dyn Error>> {
        Ok(self
            .get_config_value(key)?
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| default.clone()))
    }

    fn get_list_or_default(&self, key: &str, default: &[String]) -> Result<Vec<String>, Box<dyn Error>> {
        let raw = match self.get_config_value(key)? {
            Some(v) => v,
            None => return Ok(default.to_vec()),
        };

        match serde_json::from_str::<Vec<String>>(&raw) {
            Ok(list) => Ok(list),
            Err(e) => {
                tracing::warn!(
                    config_key = key,
                    raw_value = %raw,
                    error = %e,
                    "列表配置格式错误（应为 JSON 数组），使用默认值"
                );
                Ok(default.to_vec())
            }
        }
    }
}

// ==========================================
// TransferConfigReader Trait 实现
// ==========================================
impl TransferConfigReader for ConfigManager {
    // ===== 输出目录 =====

    fn get_backup_dir(&self) -> Result<PathBuf, Box<dyn Error>> {
        self.get_path_or_default(config_keys::BACKUP_DIR, &self.defaults.backup_dir)
    }

    fn get_error_dir(&self) -> Result<PathBuf, Box<dyn Error>> {
        self.get_path_or_default(config_keys::ERROR_DIR, &self.defaults.error_dir)
    }

    fn get_export_dir(&self) -> Result<PathBuf, Box<dyn Error>> {
        self.get_path_or_default(config_keys::EXPORT_DIR, &self.defaults.export_dir)
    }

    fn get_sample_dir(&self) -> Result<PathBuf, Box<dyn Error>> {
        self.get_path_or_default(config_keys::SAMPLE_DIR, &self.defaults.sample_dir)
    }

    // ===== 行处理规则 =====

    fn get_actor_reference(&self) -> Result<ActorReferenceConfig, Box<dyn Error>> {
        let defaults = &self.defaults.actor_reference;

        let actor_table = self
            .get_config_value(config_keys::ACTOR_TABLE)?
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| defaults.actor_table.clone());
        let actor_key_column = self
            .get_config_value(config_keys::ACTOR_KEY_COLUMN)?
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| defaults.actor_key_column.clone());

        Ok(ActorReferenceConfig {
            actor_table,
            actor_key_column,
            owner_columns: self
                .get_list_or_default(config_keys::ACTOR_OWNER_COLUMNS, &defaults.owner_columns)?,
            nullable_columns: self.get_list_or_default(
                config_keys::ACTOR_NULLABLE_COLUMNS,
                &defaults.nullable_columns,
            )?,
        })
    }

    fn get_null_sentinels(&self) -> Result<Vec<String>, Box<dyn Error>> {
        self.get_list_or_default(config_keys::NULL_SENTINELS, &self.defaults.null_sentinels)
    }

    fn get_lifecycle_columns(&self) -> Result<Vec<String>, Box<dyn Error>> {
        self.get_list_or_default(
            config_keys::LIFECYCLE_COLUMNS,
            &self.defaults.lifecycle_columns,
        )
    }

    fn get_internal_tables(&self) -> Result<Vec<String>, Box<dyn Error>> {
        let mut tables =
            self.get_list_or_default(config_keys::INTERNAL_TABLES, &self.defaults.internal_tables)?;
        // 引擎自身的表无论如何都不开放
        for builtin in ["transfer_log", "config_kv", "config_scope"] {
            if !tables.iter().any(|t| t == builtin) {
                tables.push(builtin.to_string());
            }
        }
        Ok(tables)
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 输出目录
    pub const BACKUP_DIR: &str = "transfer/backup_dir";
    pub const ERROR_DIR: &str = "transfer/error_dir";
    pub const EXPORT_DIR: &str = "transfer/export_dir";
    pub const SAMPLE_DIR: &str = "transfer/sample_dir";

    // 操作人引用
    pub const ACTOR_TABLE: &str = "transfer/actor_table";
    pub const ACTOR_KEY_COLUMN: &str = "transfer/actor_key_column";
    pub const ACTOR_OWNER_COLUMNS: &str = "transfer/actor_owner_columns"; // JSON 数组
    pub const ACTOR_NULLABLE_COLUMNS: &str = "transfer/actor_nullable_columns"; // JSON 数组

    // 行处理
    pub const NULL_SENTINELS: &str = "transfer/null_sentinels"; // JSON 数组
    pub const LIFECYCLE_COLUMNS: &str = "transfer/lifecycle_columns"; // JSON 数组

    // 白名单
    pub const INTERNAL_TABLES: &str = "transfer/internal_tables"; // JSON 数组
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> ConfigManager {
        let conn = Connection::open_in_memory().unwrap();
        crate::db::ensure_internal_tables(&conn).unwrap();
        ConfigManager::from_connection(Arc::new(Mutex::new(conn)))
            .unwrap()
            .with_defaults(TransferConfig::with_base_dir("/srv/erp"))
    }

    #[test]
    fn test_defaults_when_not_overridden() {
        let manager = setup();
        let config = manager.load_transfer_config().unwrap();
        assert_eq!(config.backup_dir, PathBuf::from("/srv/erp/backups"));
        assert_eq!(config.actor_reference.actor_table, "users");
    }

    #[test]
    fn test_overrides_from_config_kv() {
        let manager = setup();
        manager
            .set_global_config_value(config_keys::BACKUP_DIR, "/mnt/snapshots")
            .unwrap();
        manager
            .set_global_config_value(config_keys::ACTOR_OWNER_COLUMNS, r#"["author_id"]"#)
            .unwrap();

        let config = manager.load_transfer_config().unwrap();
        assert_eq!(config.backup_dir, PathBuf::from("/mnt/snapshots"));
        assert_eq!(config.actor_reference.owner_columns, vec!["author_id".to_string()]);
    }

    #[test]
    fn test_malformed_list_falls_back() {
        let manager = setup();
        manager
            .set_global_config_value(config_keys::NULL_SENTINELS, "NULL,none")
            .unwrap();

        let sentinels = manager.get_null_sentinels().unwrap();
        assert!(sentinels.contains(&"0000-00-00".to_string()));
    }

    #[test]
    fn test_internal_tables_always_include_engine_tables() {
        let manager = setup();
        manager
            .set_global_config_value(config_keys::INTERNAL_TABLES, r#"["audit_archive"]"#)
            .unwrap();

        let tables = manager.get_internal_tables().unwrap();
        assert!(tables.contains(&"audit_archive".to_string()));
        assert!(tables.contains(&"transfer_log".to_string()));
    }
}
