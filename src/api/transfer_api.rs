// ==========================================
// ERP 表数据传输引擎 - 传输 API
// ==========================================
// 职责: 表清单 / 导出 / 样例模板 / 导入 / 审计查询
// 约束: 每个操作持有连接锁直至结束（同进程内的传输操作串行执行）
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::config::{TransferConfig, TransferConfigReader};
use crate::db::ensure_internal_tables;
use crate::domain::transfer::{ExportResult, ImportResult, OperatorContext};
use crate::domain::transfer_log::TransferLogEntry;
use crate::repository::{SqliteTableRegistry, TableRegistry, TransferLogRepository};
use crate::transfer::{TableExporter, TableImporter};
use chrono::Local;
use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

/// 审计查询默认条数
pub const DEFAULT_LOG_LIMIT: usize = 50;

// ==========================================
// TransferApi - 传输 API
// ==========================================
pub struct TransferApi {
    conn: Arc<Mutex<Connection>>,
    config: TransferConfig,
    registry: SqliteTableRegistry,
    importer: TableImporter,
    exporter: TableExporter,
    log_repo: TransferLogRepository,
}

impl TransferApi {
    /// 创建新的 TransferApi 实例（确保内部表存在）
    ///
    /// # 参数
    /// - conn: 共享数据库连接
    /// - config: 已加载的传输配置
    pub fn new(conn: Arc<Mutex<Connection>>, config: TransferConfig) -> ApiResult<Self> {
        {
            let guard = lock(&conn)?;
            ensure_internal_tables(&guard)
                .map_err(|e| ApiError::DatabaseError(format!("内部表初始化失败: {}", e)))?;
        }

        Ok(Self {
            registry: SqliteTableRegistry::new(config.internal_tables.clone()),
            importer: TableImporter::with_csv(config.clone()),
            exporter: TableExporter::with_csv(config.clone()),
            log_repo: TransferLogRepository::new(conn.clone()),
            conn,
            config,
        })
    }

    /// 从配置读取器创建（config_kv 覆写生效）
    pub fn from_config_reader(
        conn: Arc<Mutex<Connection>>,
        reader: &dyn TransferConfigReader,
    ) -> ApiResult<Self> {
        let config = reader
            .load_transfer_config()
            .map_err(|e| ApiError::InternalError(format!("配置加载失败: {}", e)))?;
        Self::new(conn, config)
    }

    pub fn config(&self) -> &TransferConfig {
        &self.config
    }

    /// 可导入导出的表
    pub fn list_tables(&self) -> ApiResult<Vec<String>> {
        let conn = lock(&self.conn)?;
        Ok(self.registry.allowed_tables(&conn)?)
    }

    /// 导出整表
    pub fn export_table(&self, table: &str, operator: &OperatorContext) -> ApiResult<ExportResult> {
        let table = validate_table_name(table)?;
        let conn = lock(&self.conn)?;
        self.exporter
            .export_table(&conn, table, operator)
            .map_err(|e| as_export_error(ApiError::from(e)))
    }

    /// 生成样例模板
    pub fn generate_sample(&self, table: &str) -> ApiResult<PathBuf> {
        let table = validate_table_name(table)?;
        let conn = lock(&self.conn)?;
        self.exporter
            .generate_sample(&conn, table, Local::now().naive_local())
            .map_err(|e| as_export_error(ApiError::from(e)))
    }

    /// 导入文件
    ///
    /// # 返回
    /// - Ok(ImportResult): 已进入行处理（status 可能为 Failed）
    /// - Err(ApiError): 未开始即被拒绝（白名单 / 文件 / 表头 / 备份）或事务中止
    pub fn import_table(
        &self,
        table: &str,
        file_path: &Path,
        operator: &OperatorContext,
    ) -> ApiResult<ImportResult> {
        let table = validate_table_name(table)?;
        let conn = lock(&self.conn)?;
        Ok(self.importer.import_file(&conn, table, file_path, operator)?)
    }

    /// 查询审计记录（按时间倒序）
    pub fn list_transfer_logs(
        &self,
        table: Option<&str>,
        limit: Option<usize>,
    ) -> ApiResult<Vec<TransferLogEntry>> {
        let limit = limit.unwrap_or(DEFAULT_LOG_LIMIT);
        if limit == 0 {
            return Err(ApiError::InvalidInput("limit 必须大于 0".to_string()));
        }
        let entries = match table {
            Some(t) => self.log_repo.list_by_table(validate_table_name(t)?, limit)?,
            None => self.log_repo.list_recent(limit)?,
        };
        Ok(entries)
    }
}

fn lock(conn: &Arc<Mutex<Connection>>) -> ApiResult<MutexGuard<'_, Connection>> {
    conn.lock()
        .map_err(|e| ApiError::DatabaseConnectionError(format!("数据库锁获取失败: {}", e)))
}

fn validate_table_name(table: &str) -> ApiResult<&str> {
    let trimmed = table.trim();
    if trimmed.is_empty() {
        return Err(ApiError::InvalidInput("表名不能为空".to_string()));
    }
    Ok(trimmed)
}

fn as_export_error(err: ApiError) -> ApiError {
    match err {
        ApiError::ImportError(msg) => ApiError::ExportError(msg),
        other => other,
    }
}
