// ==========================================
// ERP 表数据传输引擎 - 表导入编排
// ==========================================
// 流程: 白名单 → 读文件 → 表结构 → 表头预检 → 备份 → 行循环（单事务）
//       → 错误报告 → 结果判定 → 审计
// 红线:
// - 表头预检失败 / 备份失败: 不开事务，不写审计
// - 进入行循环后: 恰好一条审计
// ==========================================

use crate::config::TransferConfig;
use crate::domain::schema::TableSchema;
use crate::domain::transfer::{
    collect_row_errors, ImportJob, ImportResult, OperatorContext, RowError, RowOutcome,
};
use crate::domain::types::{OutcomeKind, TransferStatus};
use crate::repository::{
    RepositoryError, SchemaRepository, SqliteTableRegistry, TableDataRepository, TableRegistry,
};
use crate::transfer::audit_logger::{AuditLogger, ImportCounts};
use crate::transfer::backup_manager::BackupManager;
use crate::transfer::csv_codec::CsvCodec;
use crate::transfer::error::{TransferError, TransferResult};
use crate::transfer::error_reporter::ErrorReporter;
use crate::transfer::fk_remediator::ForeignKeyRemediator;
use crate::transfer::row_validator::{validate_headers, RowRejection, RowValidator};
use crate::transfer::transfer_trait::{TabularReader, TabularWriter};
use crate::transfer::tx_executor::TransactionExecutor;
use chrono::Local;
use rusqlite::Connection;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

// ==========================================
// TableImporter - 表导入器
// ==========================================
pub struct TableImporter {
    config: TransferConfig,
    registry: Box<dyn TableRegistry>,
    reader: Box<dyn TabularReader>,
    writer: Box<dyn TabularWriter>, // 备份快照
}

impl TableImporter {
    /// 创建导入器
    ///
    /// # 参数
    /// - config: 已加载的传输配置
    /// - registry: 表白名单
    /// - reader: 导入文件读取器
    /// - writer: 备份快照写入器
    pub fn new(
        config: TransferConfig,
        registry: Box<dyn TableRegistry>,
        reader: Box<dyn TabularReader>,
        writer: Box<dyn TabularWriter>,
    ) -> Self {
        Self {
            config,
            registry,
            reader,
            writer,
        }
    }

    /// CSV 文件 + SQLite 白名单的默认组合
    pub fn with_csv(config: TransferConfig) -> Self {
        let registry = SqliteTableRegistry::new(config.internal_tables.clone());
        Self::new(
            config,
            Box::new(registry),
            Box::new(CsvCodec),
            Box::new(CsvCodec),
        )
    }

    /// 导入文件到指定表
    ///
    /// # 参数
    /// - conn: 已加锁的连接
    /// - table: 目标表
    /// - file_path: 已落地的导入文件
    /// - operator: 当前操作人（审计归属 + 外键修复）
    ///
    /// # 返回
    /// - Ok(ImportResult): 已进入行处理阶段（含全部失败的情况）
    /// - Err: 启动前致命错误 / 表头不匹配 / 事务中止
    #[instrument(skip(self, conn, table, file_path, operator), fields(
        table = %table,
        operator_id = operator.operator_id,
        job_id
    ))]
    pub fn import_file(
        &self,
        conn: &Connection,
        table: &str,
        file_path: &Path,
        operator: &OperatorContext,
    ) -> TransferResult<ImportResult> {
        let start_time = Instant::now();
        let job = ImportJob {
            job_id: Uuid::new_v4().to_string(),
            table_name: table.to_string(),
            source_file: file_path.to_path_buf(),
            operator: operator.clone(),
            started_at: Local::now().naive_local(),
        };
        tracing::Span::current().record("job_id", job.job_id.as_str());
        info!(file = %file_path.display(), "开始导入");

        // === 步骤 1: 白名单 ===
        self.registry.ensure_allowed(conn, table)?;

        // === 步骤 2: 读取文件 ===
        debug!("步骤 2: 读取文件");
        let parsed = self.reader.read_file(file_path).map_err(|e| {
            error!(error = %e, "文件读取失败");
            e
        })?;
        let total_rows = parsed.rows.len();

        // === 步骤 3: 表结构 + 表头预检 ===
        debug!("步骤 3: 表头预检");
        let schema = fetch_schema(conn, table)?;
        validate_headers(&schema, &parsed.headers).map_err(|e| {
            warn!(error = %e, "表头校验失败，导入拒绝");
            e
        })?;

        // === 步骤 4: 备份 ===
        debug!("步骤 4: 导入前备份");
        let table_count_before = TableDataRepository::count_rows(conn, table)?;
        let backup_path = BackupManager::new(&self.config.backup_dir, self.writer.as_ref())
            .snapshot(conn, &schema, &job)?;

        // === 步骤 5: 行循环 ===
        debug!(total_rows = total_rows, "步骤 5: 行处理");
        let remediator = ForeignKeyRemediator::prepare(conn, self.config.actor_reference.clone())?;
        let validator = RowValidator::new(&schema, &parsed.headers, &self.config);

        let executed = TransactionExecutor::run(conn, table, &parsed.rows, |sp, record| {
            let mut fields = validator.normalize(record)?;
            remediator
                .remediate(sp, &mut fields, operator)
                .map_err(|e| RowRejection::database(record.row_number, &e))?;
            validator.plan(sp, record.row_number, fields)
        });
        let report = match executed {
            Ok(report) => report,
            Err(e) => {
                let errors = vec![RowError {
                    row: 0,
                    error: e.to_string(),
                }];
                let counts = ImportCounts {
                    total: total_rows,
                    success: 0,
                    failed: total_rows,
                };
                if let Err(log_err) =
                    AuditLogger::record_import(conn, &job, counts, TransferStatus::Failed, &errors)
                {
                    warn!(error = %log_err, "审计写入失败");
                }
                return Err(e);
            }
        };

        // === 步骤 6: 错误报告 ===
        let table_count_after = TableDataRepository::count_rows(conn, table)?;
        let errors = collect_row_errors(&report.outcomes, report.commit_error.as_deref());
        let (error_file_path, report_error) =
            match ErrorReporter::new(&self.config.error_dir).report(&job, &errors) {
                Ok(path) => (path, None),
                Err(e) => (None, Some(e.to_string())),
            };

        // === 步骤 7: 结果判定 + 审计 ===
        let inserted_count = count_kind(&report.outcomes, OutcomeKind::Inserted);
        let updated_count = count_kind(&report.outcomes, OutcomeKind::Updated);
        let success_count = inserted_count + updated_count;
        let failed_count = count_kind(&report.outcomes, OutcomeKind::Failed);
        let status = TransferStatus::from_counts(success_count, failed_count);
        let mut message = summarize(
            status,
            total_rows,
            (inserted_count, updated_count),
            &errors,
            report.commit_error.as_deref(),
        );
        if let Some(report_error) = report_error {
            message.push_str(&format!("；错误报告未生成: {}", report_error));
        }

        let counts = ImportCounts {
            total: total_rows,
            success: success_count,
            failed: failed_count,
        };
        if let Err(e) = AuditLogger::record_import(conn, &job, counts, status, &errors) {
            warn!(error = %e, "审计写入失败");
        }

        info!(
            total = total_rows,
            success = success_count,
            failed = failed_count,
            status = %status,
            "导入完成"
        );

        Ok(ImportResult {
            job_id: job.job_id,
            table_name: job.table_name,
            total_rows,
            success_count,
            failed_count,
            inserted_count,
            updated_count,
            status,
            message,
            error_file_path,
            backup_path,
            table_count_before,
            table_count_after,
            commit_error: report.commit_error,
            outcomes: report.outcomes,
            elapsed_ms: start_time.elapsed().as_millis(),
        })
    }
}

/// 读取表结构（表不存在单独归类，其余归为表结构错误）
pub(crate) fn fetch_schema(conn: &Connection, table: &str) -> TransferResult<TableSchema> {
    SchemaRepository::fetch_with_conn(conn, table).map_err(|e| match e {
        RepositoryError::TableNotFound(t) => TransferError::TableNotFound(t),
        other => TransferError::SchemaError(other.to_string()),
    })
}

fn count_kind(outcomes: &[RowOutcome], kind: OutcomeKind) -> usize {
    outcomes.iter().filter(|o| o.kind == kind).count()
}

/// 面向调用方的结果说明（失败时带出第一条行错误）
fn summarize(
    status: TransferStatus,
    total_rows: usize,
    (inserted, updated): (usize, usize),
    errors: &[RowError],
    commit_error: Option<&str>,
) -> String {
    let mut message = match status {
        TransferStatus::Success => format!(
            "导入成功: 共 {} 行（新增 {}，更新 {}）",
            total_rows, inserted, updated
        ),
        TransferStatus::Partial => format!(
            "部分导入成功: 成功 {} 行，失败 {} 行，详见错误报告",
            inserted + updated,
            errors.iter().filter(|e| e.row > 0).count()
        ),
        TransferStatus::Failed => match errors.iter().find(|e| e.row > 0) {
            Some(first) => format!("导入失败: 第 {} 行 {}", first.row, first.error),
            None if total_rows == 0 => "导入失败: 文件没有数据行".to_string(),
            None => "导入失败: 没有成功导入的行".to_string(),
        },
    };
    if let Some(commit_error) = commit_error {
        message.push_str(&format!("；{}", commit_error));
    }
    message
}
