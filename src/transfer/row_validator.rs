// ==========================================
// ERP 表数据传输引擎 - 行分类与校验
// ==========================================
// 整体预检: 表头必须全部属于目标表（否则整单拒绝）
// 逐行流程: 列数检查 → 标准化（trim + NULL 字面量）→ 新增/更新分类 → 字段裁剪与必填校验
// 红线: 行级失败只产出 RowRejection，不中断事务
// ==========================================

use crate::config::TransferConfig;
use crate::domain::schema::TableSchema;
use crate::domain::transfer::{RowFields, RowRecord};
use crate::repository::{RepositoryError, TableDataRepository};
use crate::transfer::error::{TransferError, TransferResult};
use rusqlite::Connection;

/// 主键列名（决定新增还是更新）
pub const ID_COLUMN: &str = "id";

// ===== 行级错误信息 =====
pub const MSG_COLUMN_COUNT_MISMATCH: &str = "Column count mismatch";
pub const MSG_NO_FIELDS_TO_UPDATE: &str = "No fields to update";
pub const MSG_NO_VALID_DATA: &str = "No valid data to insert";
pub const MSG_INSERT_NO_ROWS: &str = "Insert executed but no rows affected";

// ==========================================
// RowPlan - 已通过校验、待执行的写操作
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowPlan {
    Insert {
        row_number: usize,
        fields: RowFields,
    },
    Update {
        row_number: usize,
        id: i64,
        fields: RowFields,
    },
}

impl RowPlan {
    pub fn row_number(&self) -> usize {
        match self {
            RowPlan::Insert { row_number, .. } | RowPlan::Update { row_number, .. } => *row_number,
        }
    }
}

// ==========================================
// RowRejection - 行级失败
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowRejection {
    pub row_number: usize,
    pub message: String,
}

impl RowRejection {
    pub fn new(row_number: usize, message: impl Into<String>) -> Self {
        Self {
            row_number,
            message: message.into(),
        }
    }

    /// 行内数据库访问失败
    pub fn database(row_number: usize, err: &RepositoryError) -> Self {
        Self::new(row_number, format!("Database error: {}", err))
    }
}

/// 表头预检
///
/// # 返回
/// - Err(HeaderMismatch): 列出未知表头与完整的期望列
pub fn validate_headers(schema: &TableSchema, headers: &[String]) -> TransferResult<()> {
    let unknown = schema.unknown_headers(headers);
    if unknown.is_empty() {
        return Ok(());
    }
    Err(TransferError::HeaderMismatch {
        unknown,
        expected: schema.column_names(),
    })
}

// ==========================================
// RowValidator - 行分类与校验器
// ==========================================
pub struct RowValidator<'a> {
    schema: &'a TableSchema,
    headers: &'a [String],
    config: &'a TransferConfig,
    required: Vec<String>,
}

impl<'a> RowValidator<'a> {
    /// 创建校验器（必填列集合在此一次性计算）
    pub fn new(schema: &'a TableSchema, headers: &'a [String], config: &'a TransferConfig) -> Self {
        Self {
            schema,
            headers,
            config,
            required: schema.required_columns(&config.lifecycle_columns),
        }
    }

    pub fn required_columns(&self) -> &[String] {
        &self.required
    }

    /// 列数检查 + 标准化
    ///
    /// 单元格先 trim，再把 NULL 字面量映射为 None
    pub fn normalize(&self, record: &RowRecord) -> Result<RowFields, RowRejection> {
        let pairs = record
            .to_fields(self.headers)
            .ok_or_else(|| RowRejection::new(record.row_number, MSG_COLUMN_COUNT_MISMATCH))?;

        let mut fields = RowFields::new();
        for (column, raw) in pairs {
            let trimmed = raw.trim();
            let value = if self.config.is_null_sentinel(trimmed) {
                None
            } else {
                Some(trimmed.to_string())
            };
            fields.push(&column, value);
        }
        Ok(fields)
    }

    /// 新增/更新分类 + 字段裁剪 + 必填校验
    ///
    /// 更新条件: 表有 id 列，行内 id 为整数，且该记录当前存在
    pub fn plan(
        &self,
        conn: &Connection,
        row_number: usize,
        fields: RowFields,
    ) -> Result<RowPlan, RowRejection> {
        match self.existing_id(conn, row_number, &fields)? {
            Some(id) => self.prepare_update(row_number, id, fields),
            None => self.prepare_insert(row_number, fields),
        }
    }

    fn existing_id(
        &self,
        conn: &Connection,
        row_number: usize,
        fields: &RowFields,
    ) -> Result<Option<i64>, RowRejection> {
        if !self.schema.has_column(ID_COLUMN) {
            return Ok(None);
        }
        let id = match fields.value(ID_COLUMN).and_then(|v| v.parse::<i64>().ok()) {
            Some(id) => id,
            None => return Ok(None),
        };

        let exists =
            TableDataRepository::record_exists(conn, &self.schema.table_name, ID_COLUMN, id)
                .map_err(|e| RowRejection::database(row_number, &e))?;
        Ok(exists.then_some(id))
    }

    /// 更新路径: 去 id，去 NULL（空单元格不覆盖已有值）
    pub fn prepare_update(
        &self,
        row_number: usize,
        id: i64,
        mut fields: RowFields,
    ) -> Result<RowPlan, RowRejection> {
        fields.remove(ID_COLUMN);
        fields.drop_nulls();
        if fields.is_empty() {
            return Err(RowRejection::new(row_number, MSG_NO_FIELDS_TO_UPDATE));
        }
        Ok(RowPlan::Update {
            row_number,
            id,
            fields,
        })
    }

    /// 新增路径: 去 id，去 NULL（让存储默认值生效），再校验必填列
    pub fn prepare_insert(
        &self,
        row_number: usize,
        mut fields: RowFields,
    ) -> Result<RowPlan, RowRejection> {
        fields.remove(ID_COLUMN);
        fields.drop_nulls();

        let missing: Vec<&str> = self
            .required
            .iter()
            .filter(|c| !fields.contains(c))
            .map(|c| c.as_str())
            .collect();
        if !missing.is_empty() {
            return Err(RowRejection::new(
                row_number,
                format!("Missing required fields: {}", missing.join(", ")),
            ));
        }

        if fields.is_empty() {
            return Err(RowRejection::new(row_number, MSG_NO_VALID_DATA));
        }
        Ok(RowPlan::Insert { row_number, fields })
    }
}
