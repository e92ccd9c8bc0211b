// ==========================================
// ERP 表数据传输引擎 - 命令行入口
// ==========================================
// 子命令: tables / export / sample / import / logs
// 输出: JSON（便于脚本处理）
// ==========================================

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use erp_table_transfer::config::ConfigManager;
use erp_table_transfer::db::open_sqlite_connection;
use erp_table_transfer::logging::{self, LogFormat};
use erp_table_transfer::{OperatorContext, TransferApi, TransferConfig, TransferStatus};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

/// ERP 表数据导入导出
#[derive(Parser, Debug)]
#[command(name = "erp-table-transfer")]
#[command(version, about = "ERP 表数据导入导出引擎")]
struct Cli {
    /// SQLite 数据库文件
    #[arg(long, env = "ERP_TRANSFER_DB")]
    db: PathBuf,

    /// 输出根目录（backups / error_reports / exports / samples 位于其下）
    #[arg(long, env = "ERP_TRANSFER_BASE_DIR")]
    base_dir: Option<PathBuf>,

    /// 日志格式
    #[arg(long, value_enum, default_value_t = LogFormatArg::Text)]
    log_format: LogFormatArg,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// 列出可导入导出的表
    Tables,

    /// 导出整表
    Export {
        table: String,
        #[arg(long)]
        operator: i64,
    },

    /// 生成样例模板
    Sample { table: String },

    /// 导入文件
    Import {
        table: String,
        file: PathBuf,
        #[arg(long)]
        operator: i64,
    },

    /// 查询审计记录
    Logs {
        #[arg(long)]
        table: Option<String>,
        #[arg(long, default_value_t = erp_table_transfer::api::DEFAULT_LOG_LIMIT)]
        limit: usize,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum LogFormatArg {
    Text,
    Json,
}

impl From<LogFormatArg> for LogFormat {
    fn from(arg: LogFormatArg) -> Self {
        match arg {
            LogFormatArg::Text => LogFormat::Text,
            LogFormatArg::Json => LogFormat::Json,
        }
    }
}

fn main() {
    let cli = Cli::parse();
    logging::init_with_format(cli.log_format.into());

    match run(cli) {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("错误: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// 返回进程退出码（导入 Failed 时为 2）
fn run(cli: Cli) -> Result<i32> {
    let db_path = cli.db.to_string_lossy().to_string();
    let conn = open_sqlite_connection(&db_path)
        .with_context(|| format!("无法打开数据库: {}", db_path))?;
    let conn = Arc::new(Mutex::new(conn));

    let defaults = match &cli.base_dir {
        Some(dir) => TransferConfig::with_base_dir(dir),
        None => TransferConfig::default(),
    };
    let manager = ConfigManager::from_connection(conn.clone())
        .map_err(|e| anyhow::anyhow!("配置管理器初始化失败: {}", e))?
        .with_defaults(defaults);
    let api = TransferApi::from_config_reader(conn, &manager)?;

    tracing::info!(version = erp_table_transfer::VERSION, db = %db_path, "启动");

    match cli.command {
        Command::Tables => print_json(&api.list_tables()?)?,
        Command::Export { table, operator } => {
            print_json(&api.export_table(&table, &OperatorContext::new(operator))?)?
        }
        Command::Sample { table } => print_json(&api.generate_sample(&table)?)?,
        Command::Import {
            table,
            file,
            operator,
        } => {
            let result = api.import_table(&table, &file, &OperatorContext::new(operator))?;
            print_json(&result)?;
            if result.status == TransferStatus::Failed {
                return Ok(2);
            }
        }
        Command::Logs { table, limit } => {
            print_json(&api.list_transfer_logs(table.as_deref(), Some(limit))?)?
        }
    }
    Ok(0)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
