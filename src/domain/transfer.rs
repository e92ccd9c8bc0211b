// ==========================================
// ERP 表数据传输引擎 - 传输领域模型
// ==========================================
// 职责: 导入作业 / 行记录 / 行结果 / 导入导出结果
// 生命周期: 除落库的 TransferLogEntry 外，均不跨越单次操作
// ==========================================

use crate::domain::types::{OutcomeKind, TransferStatus};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

// ==========================================
// OperatorContext - 当前操作人
// ==========================================
// 显式传入每次调用（审计归属 + 外键修复）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperatorContext {
    pub operator_id: i64,
    pub operator_name: Option<String>,
}

impl OperatorContext {
    pub fn new(operator_id: i64) -> Self {
        Self {
            operator_id,
            operator_name: None,
        }
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.operator_name = Some(name.to_string());
        self
    }
}

// ==========================================
// ImportJob - 导入作业
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportJob {
    pub job_id: String,
    pub table_name: String,
    pub source_file: PathBuf,
    pub operator: OperatorContext,
    pub started_at: NaiveDateTime,
}

impl ImportJob {
    /// 作业 ID 前 8 位（用于输出文件名）
    pub fn short_id(&self) -> String {
        self.job_id.chars().filter(|c| *c != '-').take(8).collect()
    }
}

// ==========================================
// RowRecord - 文件中的一行（未标准化）
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowRecord {
    pub row_number: usize, // 相对表头行的物理行偏移，从 1 开始（空行不产生记录）
    pub cells: Vec<String>,
}

impl RowRecord {
    /// 按表头组装 表头→值 映射
    ///
    /// # 返回
    /// - None: 字段数与表头数不一致
    pub fn to_fields(&self, headers: &[String]) -> Option<Vec<(String, String)>> {
        if self.cells.len() != headers.len() {
            return None;
        }
        Some(
            headers
                .iter()
                .cloned()
                .zip(self.cells.iter().cloned())
                .collect(),
        )
    }
}

// ==========================================
// RowFields - 标准化后的字段集合
// ==========================================
// 保持表头顺序；None 表示 SQL NULL
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowFields {
    entries: Vec<(String, Option<String>)>,
}

impl RowFields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, column: &str, value: Option<String>) {
        self.entries.push((column.to_string(), value));
    }

    pub fn get(&self, column: &str) -> Option<&Option<String>> {
        self.entries
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, v)| v)
    }

    /// 取非空值
    pub fn value(&self, column: &str) -> Option<&str> {
        self.get(column).and_then(|v| v.as_deref())
    }

    pub fn contains(&self, column: &str) -> bool {
        self.get(column).is_some()
    }

    pub fn set(&mut self, column: &str, value: Option<String>) {
        match self.entries.iter_mut().find(|(name, _)| name == column) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((column.to_string(), value)),
        }
    }

    pub fn remove(&mut self, column: &str) -> Option<Option<String>> {
        let idx = self.entries.iter().position(|(name, _)| name == column)?;
        Some(self.entries.remove(idx).1)
    }

    /// 去掉值为 NULL 的字段
    pub fn drop_nulls(&mut self) {
        self.entries.retain(|(_, v)| v.is_some());
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn columns(&self) -> Vec<&str> {
        self.entries.iter().map(|(name, _)| name.as_str()).collect()
    }

    pub fn values(&self) -> Vec<Option<&str>> {
        self.entries.iter().map(|(_, v)| v.as_deref()).collect()
    }
}

// ==========================================
// RowOutcome - 单行处理结果（记录后不可变）
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowOutcome {
    pub row_number: usize,
    pub kind: OutcomeKind,
    pub message: Option<String>,
}

impl RowOutcome {
    pub fn inserted(row_number: usize) -> Self {
        Self {
            row_number,
            kind: OutcomeKind::Inserted,
            message: None,
        }
    }

    pub fn updated(row_number: usize) -> Self {
        Self {
            row_number,
            kind: OutcomeKind::Updated,
            message: None,
        }
    }

    pub fn failed(row_number: usize, message: impl Into<String>) -> Self {
        Self {
            row_number,
            kind: OutcomeKind::Failed,
            message: Some(message.into()),
        }
    }

    pub fn is_failed(&self) -> bool {
        self.kind == OutcomeKind::Failed
    }
}

// ==========================================
// RowError - 错误报告/审计用的行错误
// ==========================================
// row_number == 0 表示提交失败等非行级错误
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowError {
    pub row: usize,
    pub error: String,
}

// ==========================================
// ImportResult - 导入结果
// ==========================================
// 不变量: success_count + failed_count == total_rows
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportResult {
    pub job_id: String,
    pub table_name: String,
    pub total_rows: usize,
    pub success_count: usize,
    pub failed_count: usize,
    pub inserted_count: usize,
    pub updated_count: usize,
    pub status: TransferStatus,
    pub message: String,
    pub error_file_path: Option<PathBuf>,
    pub backup_path: PathBuf,
    pub table_count_before: i64,
    pub table_count_after: i64, // 仅供参考，不参与判定
    pub commit_error: Option<String>,
    pub outcomes: Vec<RowOutcome>,
    pub elapsed_ms: u128,
}

impl ImportResult {
    /// 行错误列表（含提交失败的第 0 行）
    pub fn row_errors(&self) -> Vec<RowError> {
        collect_row_errors(&self.outcomes, self.commit_error.as_deref())
    }
}

/// 从行结果收集错误（提交失败追加为第 0 行）
pub fn collect_row_errors(outcomes: &[RowOutcome], commit_error: Option<&str>) -> Vec<RowError> {
    let mut errors: Vec<RowError> = outcomes
        .iter()
        .filter(|o| o.is_failed())
        .map(|o| RowError {
            row: o.row_number,
            error: o.message.clone().unwrap_or_default(),
        })
        .collect();
    if let Some(msg) = commit_error {
        errors.push(RowError {
            row: 0,
            error: msg.to_string(),
        });
    }
    errors
}

// ==========================================
// ExportResult - 导出结果
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportResult {
    pub table_name: String,
    pub file_path: PathBuf,
    pub record_count: usize,
    pub log_id: Option<String>,
}
