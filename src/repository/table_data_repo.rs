// ==========================================
// ERP 表数据传输引擎 - 通用表数据访问
// ==========================================
// 职责: 行数统计 / 主键存在性 / 全表流式读取 / INSERT、UPDATE 语句构造
// 约束: 表名/列名须已通过白名单与表结构校验；值一律绑定参数
// ==========================================

use crate::db::quote_ident;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::types::ValueRef;
use rusqlite::{params, Connection, OptionalExtension};

// ==========================================
// TableDataRepository - 通用表数据仓储
// ==========================================
// 红线: Repository 不做业务逻辑,只做数据映射
pub struct TableDataRepository;

impl TableDataRepository {
    /// 表行数
    pub fn count_rows(conn: &Connection, table: &str) -> RepositoryResult<i64> {
        let sql = format!("SELECT COUNT(*) FROM {}", quote_ident(table));
        Ok(conn.query_row(&sql, [], |row| row.get(0))?)
    }

    /// 指定主键的记录是否存在
    pub fn record_exists(
        conn: &Connection,
        table: &str,
        key_column: &str,
        id: i64,
    ) -> RepositoryResult<bool> {
        let sql = format!(
            "SELECT 1 FROM {} WHERE {} = ?1 LIMIT 1",
            quote_ident(table),
            quote_ident(key_column)
        );
        let found: Option<i64> = conn.query_row(&sql, params![id], |row| row.get(0)).optional()?;
        Ok(found.is_some())
    }

    /// 指定列等于某值的记录是否存在（值按文本绑定，由列亲和性转换）
    pub fn value_exists(
        conn: &Connection,
        table: &str,
        column: &str,
        value: &str,
    ) -> RepositoryResult<bool> {
        let sql = format!(
            "SELECT 1 FROM {} WHERE {} = ?1 LIMIT 1",
            quote_ident(table),
            quote_ident(column)
        );
        let found: Option<i64> = conn.query_row(&sql, params![value], |row| row.get(0)).optional()?;
        Ok(found.is_some())
    }

    /// 全表逐行读取（不整体载入内存）
    ///
    /// # 参数
    /// - columns: 输出列（目录顺序）
    /// - on_row: 每行回调，值已渲染为文本（NULL → 空串）
    ///
    /// # 返回
    /// - Ok(usize): 读取行数
    /// - Err: 读取失败或回调失败（回调错误原样返回）
    pub fn for_each_row<F, E>(
        conn: &Connection,
        table: &str,
        columns: &[String],
        mut on_row: F,
    ) -> Result<usize, E>
    where
        F: FnMut(Vec<String>) -> Result<(), E>,
        E: From<RepositoryError>,
    {
        let select_cols = columns
            .iter()
            .map(|c| quote_ident(c))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!("SELECT {} FROM {}", select_cols, quote_ident(table));

        let mut stmt = conn.prepare(&sql).map_err(RepositoryError::from)?;
        let mut rows = stmt.query([]).map_err(RepositoryError::from)?;
        let mut count = 0;
        while let Some(row) = rows.next().map_err(RepositoryError::from)? {
            let mut values = Vec::with_capacity(columns.len());
            for idx in 0..columns.len() {
                values.push(render_value(row.get_ref(idx).map_err(RepositoryError::from)?));
            }
            on_row(values)?;
            count += 1;
        }
        Ok(count)
    }
}

/// 单行 INSERT 语句
pub fn build_insert_sql(table: &str, columns: &[&str]) -> String {
    let cols = columns
        .iter()
        .map(|c| quote_ident(c))
        .collect::<Vec<_>>()
        .join(", ");
    let placeholders = (1..=columns.len())
        .map(|i| format!("?{}", i))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "INSERT INTO {} ({}) VALUES ({})",
        quote_ident(table),
        cols,
        placeholders
    )
}

/// 按主键的单行 UPDATE 语句（主键为最后一个参数）
pub fn build_update_sql(table: &str, columns: &[&str], key_column: &str) -> String {
    let assignments = columns
        .iter()
        .enumerate()
        .map(|(i, c)| format!("{} = ?{}", quote_ident(c), i + 1))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "UPDATE {} SET {} WHERE {} = ?{}",
        quote_ident(table),
        assignments,
        quote_ident(key_column),
        columns.len() + 1
    )
}

/// 数据库值渲染为导出文本
pub fn render_value(value: ValueRef<'_>) -> String {
    match value {
        ValueRef::Null => String::new(),
        ValueRef::Integer(i) => i.to_string(),
        ValueRef::Real(f) => f.to_string(),
        ValueRef::Text(t) => String::from_utf8_lossy(t).into_owned(),
        ValueRef::Blob(b) => String::from_utf8_lossy(b).into_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            r#"
            CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT);
            INSERT INTO users (id, name) VALUES (1, 'alice'), (2, NULL);
            "#,
        )
        .unwrap();
        conn
    }

    #[test]
    fn test_count_and_exists() {
        let conn = setup();
        assert_eq!(TableDataRepository::count_rows(&conn, "users").unwrap(), 2);
        assert!(TableDataRepository::record_exists(&conn, "users", "id", 1).unwrap());
        assert!(!TableDataRepository::record_exists(&conn, "users", "id", 9).unwrap());
        // 文本值经 INTEGER 亲和性转换
        assert!(TableDataRepository::value_exists(&conn, "users", "id", "2").unwrap());
        assert!(!TableDataRepository::value_exists(&conn, "users", "id", "7").unwrap());
    }

    #[test]
    fn test_for_each_row_renders_null_as_empty() {
        let conn = setup();
        let columns = vec!["id".to_string(), "name".to_string()];
        let mut rows = Vec::new();
        let count = TableDataRepository::for_each_row(&conn, "users", &columns, |r| {
            rows.push(r);
            Ok::<(), RepositoryError>(())
        })
        .unwrap();

        assert_eq!(count, 2);
        assert!(rows.contains(&vec!["1".to_string(), "alice".to_string()]));
        assert!(rows.contains(&vec!["2".to_string(), String::new()]));
    }

    #[test]
    fn test_build_sql() {
        assert_eq!(
            build_insert_sql("widgets", &["name", "price"]),
            r#"INSERT INTO "widgets" ("name", "price") VALUES (?1, ?2)"#
        );
        assert_eq!(
            build_update_sql("widgets", &["price"], "id"),
            r#"UPDATE "widgets" SET "price" = ?1 WHERE "id" = ?2"#
        );
    }
}
