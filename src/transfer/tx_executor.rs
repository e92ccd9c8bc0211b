// ==========================================
// ERP 表数据传输引擎 - 事务执行器
// ==========================================
// 整个行循环包在一个事务中；每行一个 SAVEPOINT 作为捕获边界
// - 行级失败: 回滚到该行的 SAVEPOINT，记为 Failed，继续下一行
// - 基础设施故障（语句准备失败 / SAVEPOINT 失败）: 整体回滚，返回 TransactionAborted
// - 提交失败: 记为第 0 行错误，不改动已记录的行结果
// ==========================================

use crate::domain::transfer::{RowOutcome, RowRecord};
use crate::repository::table_data_repo::{build_insert_sql, build_update_sql};
use crate::transfer::error::{TransferError, TransferResult};
use crate::transfer::row_validator::{RowPlan, RowRejection, ID_COLUMN, MSG_INSERT_NO_ROWS};
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection};
use tracing::{debug, error, warn};

/// 执行报告
#[derive(Debug, Clone, Default)]
pub struct ExecutionReport {
    pub outcomes: Vec<RowOutcome>,
    pub commit_error: Option<String>,
}

/// 单行写入失败的分类
enum ApplyError {
    Row(String),
    Fatal(String),
}

// ==========================================
// TransactionExecutor
// ==========================================
pub struct TransactionExecutor;

impl TransactionExecutor {
    /// 在单个事务中处理全部行
    ///
    /// # 参数
    /// - conn: 已加锁的连接（调用方持有）
    /// - table: 已校验的目标表
    /// - rows: 文件数据行
    /// - plan_row: 行处理回调（标准化 / 修复 / 分类 / 校验），在该行的 SAVEPOINT 内执行
    ///
    /// # 返回
    /// - Ok(ExecutionReport): 每行恰好一个结果
    /// - Err(TransactionAborted): 基础设施故障，事务已回滚
    pub fn run<F>(
        conn: &Connection,
        table: &str,
        rows: &[RowRecord],
        mut plan_row: F,
    ) -> TransferResult<ExecutionReport>
    where
        F: FnMut(&Connection, &RowRecord) -> Result<RowPlan, RowRejection>,
    {
        let mut tx = conn
            .unchecked_transaction()
            .map_err(|e| abort("事务开启失败", e))?;
        let mut outcomes = Vec::with_capacity(rows.len());

        for record in rows {
            let sp = tx.savepoint().map_err(|e| abort("SAVEPOINT 创建失败", e))?;

            let outcome = match plan_row(&*sp, record) {
                Err(rejection) => RowOutcome::failed(rejection.row_number, rejection.message),
                Ok(plan) => match apply_plan(&sp, table, &plan) {
                    Ok(outcome) => outcome,
                    Err(ApplyError::Row(message)) => RowOutcome::failed(record.row_number, message),
                    Err(ApplyError::Fatal(message)) => {
                        error!(row = record.row_number, error = %message, "语句准备失败，整体回滚");
                        return Err(TransferError::TransactionAborted(message));
                    }
                },
            };

            if outcome.is_failed() {
                warn!(
                    row = outcome.row_number,
                    error = outcome.message.as_deref().unwrap_or_default(),
                    "行处理失败"
                );
                // drop 即回滚到 SAVEPOINT
                drop(sp);
            } else {
                sp.commit().map_err(|e| abort("SAVEPOINT 释放失败", e))?;
            }
            outcomes.push(outcome);
        }

        let commit_error = match tx.commit() {
            Ok(()) => None,
            Err(e) => {
                error!(error = %e, "事务提交失败");
                Some(format!("Commit failed: {}", e))
            }
        };
        debug!(rows = outcomes.len(), "行循环完成");

        Ok(ExecutionReport {
            outcomes,
            commit_error,
        })
    }
}

fn abort(step: &str, err: rusqlite::Error) -> TransferError {
    error!(error = %err, "{}", step);
    TransferError::TransactionAborted(format!("{}: {}", step, err))
}

/// 执行单行写入
///
/// - INSERT: 影响 0 行视为失败
/// - UPDATE: 影响 0 行视为成功（存在性已在本事务内校验）
fn apply_plan(conn: &Connection, table: &str, plan: &RowPlan) -> Result<RowOutcome, ApplyError> {
    let (sql, values, row_number) = match plan {
        RowPlan::Insert { row_number, fields } => {
            let sql = build_insert_sql(table, &fields.columns());
            (sql, bind_values(fields.values(), None), *row_number)
        }
        RowPlan::Update {
            row_number,
            id,
            fields,
        } => {
            let sql = build_update_sql(table, &fields.columns(), ID_COLUMN);
            (sql, bind_values(fields.values(), Some(*id)), *row_number)
        }
    };

    let mut stmt = conn
        .prepare(&sql)
        .map_err(|e| ApplyError::Fatal(format!("语句准备失败: {}", e)))?;
    let affected = stmt
        .execute(params_from_iter(values))
        .map_err(|e| ApplyError::Row(format!("Database error: {}", e)))?;

    match plan {
        RowPlan::Insert { .. } if affected == 0 => Err(ApplyError::Row(MSG_INSERT_NO_ROWS.to_string())),
        RowPlan::Insert { .. } => Ok(RowOutcome::inserted(row_number)),
        RowPlan::Update { .. } => Ok(RowOutcome::updated(row_number)),
    }
}

/// 文本值按列亲和性由 SQLite 转换；更新时 id 追加在末尾
fn bind_values(values: Vec<Option<&str>>, id: Option<i64>) -> Vec<Value> {
    let mut bound: Vec<Value> = values
        .into_iter()
        .map(|v| match v {
            Some(text) => Value::Text(text.to_string()),
            None => Value::Null,
        })
        .collect();
    if let Some(id) = id {
        bound.push(Value::Integer(id));
    }
    bound
}
