// ==========================================
// ERP 表数据传输引擎 - 领域类型定义
// ==========================================
// 职责: 操作类型 / 结果状态 / 行结果类型
// 序列化格式: 与 transfer_log 表存储值一致
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 传输操作类型 (Transfer Operation)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransferOperation {
    Import, // 导入
    Export, // 导出
}

impl TransferOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransferOperation::Import => "Import",
            TransferOperation::Export => "Export",
        }
    }

    /// 从数据库字符串解析（未知值返回 None）
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "Import" => Some(TransferOperation::Import),
            "Export" => Some(TransferOperation::Export),
            _ => None,
        }
    }
}

impl fmt::Display for TransferOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// 传输结果状态 (Transfer Status)
// ==========================================
// 规则:
// - success == 0                  → Failed
// - failed == 0 && success > 0    → Success
// - 其他                           → Partial
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransferStatus {
    Success,
    Partial,
    Failed,
}

impl TransferStatus {
    /// 根据成功/失败行数推导状态
    ///
    /// 说明：事务已提交但一行都未写入，同样视为 Failed
    pub fn from_counts(success_count: usize, failed_count: usize) -> Self {
        if success_count == 0 {
            TransferStatus::Failed
        } else if failed_count == 0 {
            TransferStatus::Success
        } else {
            TransferStatus::Partial
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TransferStatus::Success => "Success",
            TransferStatus::Partial => "Partial",
            TransferStatus::Failed => "Failed",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "Success" => Some(TransferStatus::Success),
            "Partial" => Some(TransferStatus::Partial),
            "Failed" => Some(TransferStatus::Failed),
            _ => None,
        }
    }
}

impl fmt::Display for TransferStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// 行处理结果类型 (Outcome Kind)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OutcomeKind {
    Inserted,
    Updated,
    Failed,
}

impl OutcomeKind {
    pub fn is_success(&self) -> bool {
        !matches!(self, OutcomeKind::Failed)
    }
}

impl fmt::Display for OutcomeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutcomeKind::Inserted => write!(f, "Inserted"),
            OutcomeKind::Updated => write!(f, "Updated"),
            OutcomeKind::Failed => write!(f, "Failed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_from_counts() {
        assert_eq!(TransferStatus::from_counts(0, 0), TransferStatus::Failed);
        assert_eq!(TransferStatus::from_counts(0, 3), TransferStatus::Failed);
        assert_eq!(TransferStatus::from_counts(3, 0), TransferStatus::Success);
        assert_eq!(TransferStatus::from_counts(2, 1), TransferStatus::Partial);
    }

    #[test]
    fn test_operation_parse() {
        assert_eq!(TransferOperation::parse("Import"), Some(TransferOperation::Import));
        assert_eq!(TransferOperation::parse(" Export "), Some(TransferOperation::Export));
        assert_eq!(TransferOperation::parse("Delete"), None);
        assert_eq!(TransferStatus::parse("Partial"), Some(TransferStatus::Partial));
    }
}
