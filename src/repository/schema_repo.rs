// ==========================================
// ERP 表数据传输引擎 - 表结构读取（Schema Introspector）
// ==========================================
// 职责: 读取目标表列目录（PRAGMA table_info + DDL 中的 CHECK IN 枚举）
// 红线: 每次操作实时读取，不缓存；表不存在时报错
// ==========================================

use crate::db::{quote_ident, table_exists};
use crate::domain::schema::{ColumnDescriptor, TableSchema};
use crate::repository::error::{RepositoryError, RepositoryResult};
use once_cell::sync::Lazy;
use regex::Regex;
use rusqlite::{Connection, OptionalExtension};
use std::collections::HashMap;

/// CHECK (<col> IN ('a', 'b', ...))
static CHECK_IN_PATTERN: Lazy<Option<Regex>> = Lazy::new(|| {
    Regex::new(r#"(?i)CHECK\s*\(\s*["`\[]?([A-Za-z_][A-Za-z0-9_]*)["`\]]?\s+IN\s*\(([^)]*)\)"#).ok()
});

/// 单引号字符串字面量（'' 为转义）
static LITERAL_PATTERN: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"'((?:[^']|'')*)'").ok());

// ==========================================
// SchemaRepository - 表结构仓储
// ==========================================
pub struct SchemaRepository;

impl SchemaRepository {
    /// 在已持有的连接上读取表结构
    ///
    /// # 返回
    /// - Ok(TableSchema): 列按目录顺序
    /// - Err(TableNotFound): 表不存在
    pub fn fetch_with_conn(conn: &Connection, table: &str) -> RepositoryResult<TableSchema> {
        if !table_exists(conn, table)? {
            return Err(RepositoryError::TableNotFound(table.to_string()));
        }

        let ddl: Option<String> = conn
            .query_row(
                "SELECT sql FROM sqlite_master WHERE type = 'table' AND name = ?1",
                [table],
                |row| row.get(0),
            )
            .optional()?
            .flatten();
        let enum_sets = ddl.as_deref().map(parse_check_in_sets).unwrap_or_default();

        // (name, type, notnull, dflt_value, pk)
        let mut stmt = conn.prepare(&format!("PRAGMA table_info({})", quote_ident(table)))?;
        let raw_columns = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(1)?,
                    row.get::<_, Option<String>>(2)?.unwrap_or_default(),
                    row.get::<_, i64>(3)?,
                    row.get::<_, Option<String>>(4)?,
                    row.get::<_, i64>(5)?,
                ))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        let pk_count = raw_columns.iter().filter(|c| c.4 > 0).count();

        let columns = raw_columns
            .into_iter()
            .map(|(name, declared_type, notnull, default, pk)| {
                // 单列 INTEGER PRIMARY KEY 即 rowid 别名，自增
                let is_auto_increment =
                    pk > 0 && pk_count == 1 && declared_type.eq_ignore_ascii_case("INTEGER");
                let enum_values = enum_sets.get(&name).cloned().unwrap_or_default();
                ColumnDescriptor {
                    name,
                    declared_type,
                    nullable: notnull == 0,
                    has_default: default.is_some(),
                    is_auto_increment,
                    is_primary_key: pk > 0,
                    enum_values,
                }
            })
            .collect();

        Ok(TableSchema {
            table_name: table.to_string(),
            columns,
        })
    }
}

/// 解析 DDL 中的 CHECK (<col> IN (...)) 取值集合
///
/// # 返回
/// - 列名 → 字面量列表（声明顺序）
pub fn parse_check_in_sets(ddl: &str) -> HashMap<String, Vec<String>> {
    let mut sets = HashMap::new();
    let (check_re, literal_re) = match (CHECK_IN_PATTERN.as_ref(), LITERAL_PATTERN.as_ref()) {
        (Some(c), Some(l)) => (c, l),
        _ => return sets,
    };

    for caps in check_re.captures_iter(ddl) {
        let column = caps[1].to_string();
        let values: Vec<String> = literal_re
            .captures_iter(&caps[2])
            .map(|lit| lit[1].replace("''", "'"))
            .collect();
        if !values.is_empty() {
            sets.entry(column).or_insert(values);
        }
    }
    sets
}
