// ==========================================
// ERP 表数据传输引擎 - 表导出 / 样例模板
// ==========================================
// 导出: <export_dir>/<table>_<YYYYMMDD_HHMMSS>.csv，写一条审计
// 样例: <sample_dir>/<table>_sample.csv，不读数据、不写审计
// ==========================================

use crate::config::TransferConfig;
use crate::domain::transfer::{ExportResult, OperatorContext};
use crate::repository::{SqliteTableRegistry, TableRegistry};
use crate::transfer::audit_logger::AuditLogger;
use crate::transfer::csv_codec::CsvCodec;
use crate::transfer::error::TransferResult;
use crate::transfer::table_importer::fetch_schema;
use crate::transfer::transfer_trait::TabularWriter;
use chrono::{Local, NaiveDateTime};
use rusqlite::Connection;
use std::path::PathBuf;
use tracing::{info, instrument, warn};

pub struct TableExporter {
    config: TransferConfig,
    registry: Box<dyn TableRegistry>,
    writer: Box<dyn TabularWriter>,
}

impl TableExporter {
    pub fn new(
        config: TransferConfig,
        registry: Box<dyn TableRegistry>,
        writer: Box<dyn TabularWriter>,
    ) -> Self {
        Self {
            config,
            registry,
            writer,
        }
    }

    pub fn with_csv(config: TransferConfig) -> Self {
        let registry = SqliteTableRegistry::new(config.internal_tables.clone());
        Self::new(config, Box::new(registry), Box::new(CsvCodec))
    }

    /// 全表导出
    ///
    /// 审计写入失败只告警（文件已生成）
    #[instrument(skip(self, conn, table, operator), fields(table = %table, operator_id = operator.operator_id))]
    pub fn export_table(
        &self,
        conn: &Connection,
        table: &str,
        operator: &OperatorContext,
    ) -> TransferResult<ExportResult> {
        self.registry.ensure_allowed(conn, table)?;
        let schema = fetch_schema(conn, table)?;

        let now = Local::now().naive_local();
        let file_path = self
            .config
            .export_dir
            .join(format!("{}_{}.csv", table, now.format("%Y%m%d_%H%M%S")));
        let record_count = self.writer.write_export(conn, &schema, &file_path)?;

        let log_id =
            match AuditLogger::record_export(conn, table, operator, &file_path, record_count, now) {
                Ok(id) => Some(id),
                Err(e) => {
                    warn!(error = %e, "导出审计写入失败");
                    None
                }
            };

        info!(
            records = record_count,
            path = %file_path.display(),
            "导出完成"
        );
        Ok(ExportResult {
            table_name: table.to_string(),
            file_path,
            record_count,
            log_id,
        })
    }

    /// 生成样例模板
    #[instrument(skip(self, conn, table, now), fields(table = %table))]
    pub fn generate_sample(
        &self,
        conn: &Connection,
        table: &str,
        now: NaiveDateTime,
    ) -> TransferResult<PathBuf> {
        self.registry.ensure_allowed(conn, table)?;
        let schema = fetch_schema(conn, table)?;

        let file_path = self.config.sample_dir.join(format!("{}_sample.csv", table));
        self.writer.write_sample(&schema, &file_path, now)?;
        info!(path = %file_path.display(), "样例模板已生成");
        Ok(file_path)
    }
}
