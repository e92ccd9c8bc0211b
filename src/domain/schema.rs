// ==========================================
// ERP 表数据传输引擎 - 表结构模型
// ==========================================
// 职责: 描述目标表的列目录（每次操作实时读取，不缓存）
// ==========================================

use serde::{Deserialize, Serialize};

// ==========================================
// ColumnDescriptor - 列描述
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    pub name: String,
    pub declared_type: String,    // DDL 中声明的类型（原样保留）
    pub nullable: bool,
    pub has_default: bool,
    pub is_auto_increment: bool,  // INTEGER PRIMARY KEY（rowid 别名）
    pub is_primary_key: bool,
    pub enum_values: Vec<String>, // CHECK (col IN (...)) 声明的取值集合
}

impl ColumnDescriptor {
    /// 是否为枚举列
    pub fn is_enum(&self) -> bool {
        !self.enum_values.is_empty()
    }
}

// ==========================================
// TableSchema - 表结构
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSchema {
    pub table_name: String,
    pub columns: Vec<ColumnDescriptor>, // 按目录顺序
}

impl TableSchema {
    /// 列名（目录顺序）
    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    pub fn column(&self, name: &str) -> Option<&ColumnDescriptor> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    /// 必填列集合
    ///
    /// 条件: NOT NULL、无默认值、非自增，且不是生命周期时间戳列
    ///
    /// # 参数
    /// - lifecycle_columns: 创建/更新时间戳列名（插入时总是可选）
    pub fn required_columns(&self, lifecycle_columns: &[String]) -> Vec<String> {
        self.columns
            .iter()
            .filter(|c| !c.nullable && !c.has_default && !c.is_auto_increment)
            .filter(|c| !lifecycle_columns.iter().any(|l| l == &c.name))
            .map(|c| c.name.clone())
            .collect()
    }

    /// 找出不属于本表的表头（保持原顺序）
    pub fn unknown_headers(&self, headers: &[String]) -> Vec<String> {
        headers
            .iter()
            .filter(|h| !self.has_column(h))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn col(name: &str, nullable: bool, has_default: bool, auto: bool) -> ColumnDescriptor {
        ColumnDescriptor {
            name: name.to_string(),
            declared_type: "TEXT".to_string(),
            nullable,
            has_default,
            is_auto_increment: auto,
            is_primary_key: auto,
            enum_values: Vec::new(),
        }
    }

    #[test]
    fn test_required_columns() {
        let schema = TableSchema {
            table_name: "widgets".to_string(),
            columns: vec![
                col("id", false, false, true),
                col("name", false, false, false),
                col("price", true, false, false),
                col("status", false, true, false),
                col("created_at", false, false, false),
            ],
        };

        let lifecycle = vec!["created_at".to_string(), "updated_at".to_string()];
        assert_eq!(schema.required_columns(&lifecycle), vec!["name".to_string()]);
    }

    #[test]
    fn test_unknown_headers() {
        let schema = TableSchema {
            table_name: "widgets".to_string(),
            columns: vec![col("id", false, false, true), col("name", false, false, false)],
        };

        let headers = vec!["id".to_string(), "colour".to_string(), "name".to_string()];
        assert_eq!(schema.unknown_headers(&headers), vec!["colour".to_string()]);
    }
}
