// ==========================================
// ERP 表数据传输引擎 - 传输配置读取 Trait
// ==========================================
// 职责: 定义传输引擎所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use crate::config::transfer_config::{ActorReferenceConfig, TransferConfig};
use std::error::Error;
use std::path::PathBuf;

// ==========================================
// TransferConfigReader Trait
// ==========================================
// 实现者: ConfigManager（config_kv 覆写）、TransferConfig（静态配置）
pub trait TransferConfigReader: Send + Sync {
    // ===== 输出目录 =====

    /// 备份快照目录（按日期/小时分组）
    fn get_backup_dir(&self) -> Result<PathBuf, Box<dyn Error>>;

    /// 错误报告目录
    fn get_error_dir(&self) -> Result<PathBuf, Box<dyn Error>>;

    /// 用户导出目录
    fn get_export_dir(&self) -> Result<PathBuf, Box<dyn Error>>;

    /// 样例模板目录
    fn get_sample_dir(&self) -> Result<PathBuf, Box<dyn Error>>;

    // ===== 行处理规则 =====

    /// 操作人引用列配置
    fn get_actor_reference(&self) -> Result<ActorReferenceConfig, Box<dyn Error>>;

    /// NULL 字面量
    fn get_null_sentinels(&self) -> Result<Vec<String>, Box<dyn Error>>;

    /// 生命周期时间戳列
    fn get_lifecycle_columns(&self) -> Result<Vec<String>, Box<dyn Error>>;

    /// 内部表（排除在白名单之外）
    fn get_internal_tables(&self) -> Result<Vec<String>, Box<dyn Error>>;

    /// 一次性读取完整配置
    ///
    /// 说明：在锁定连接、开启事务之前调用
    fn load_transfer_config(&self) -> Result<TransferConfig, Box<dyn Error>> {
        Ok(TransferConfig {
            backup_dir: self.get_backup_dir()?,
            error_dir: self.get_error_dir()?,
            export_dir: self.get_export_dir()?,
            sample_dir: self.get_sample_dir()?,
            actor_reference: self.get_actor_reference()?,
            null_sentinels: self.get_null_sentinels()?,
            lifecycle_columns: self.get_lifecycle_columns()?,
            internal_tables: self.get_internal_tables()?,
        })
    }
}

// 静态配置直接作为读取器使用（测试 / CLI）
impl TransferConfigReader for TransferConfig {
    fn get_backup_dir(&self) -> Result<PathBuf, Box<dyn Error>> {
        Ok(self.backup_dir.clone())
    }

    fn get_error_dir(&self) -> Result<PathBuf, Box<dyn Error>> {
        Ok(self.error_dir.clone())
    }

    fn get_export_dir(&self) -> Result<PathBuf, Box<dyn Error>> {
        Ok(self.export_dir.clone())
    }

    fn get_sample_dir(&self) -> Result<PathBuf, Box<dyn Error>> {
        Ok(self.sample_dir.clone())
    }

    fn get_actor_reference(&self) -> Result<ActorReferenceConfig, Box<dyn Error>> {
        Ok(self.actor_reference.clone())
    }

    fn get_null_sentinels(&self) -> Result<Vec<String>, Box<dyn Error>> {
        Ok(self.null_sentinels.clone())
    }

    fn get_lifecycle_columns(&self) -> Result<Vec<String>, Box<dyn Error>> {
        Ok(self.lifecycle_columns.clone())
    }

    fn get_internal_tables(&self) -> Result<Vec<String>, Box<dyn Error>> {
        Ok(self.internal_tables.clone())
    }

    fn load_transfer_config(&self) -> Result<TransferConfig, Box<dyn Error>> {
        Ok(self.clone())
    }
}
