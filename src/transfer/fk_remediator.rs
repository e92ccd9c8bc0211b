// ==========================================
// ERP 表数据传输引擎 - 外键修复（操作人引用列）
// ==========================================
// 规则: 引用的操作人不存在时
// - 归属类列（created_by / owner_id）→ 改写为当前操作人
// - 其他引用列 → 置 NULL
// 时机: 必填校验之前（修复结果可以补齐必填列）
// ==========================================

use crate::config::ActorReferenceConfig;
use crate::db::table_exists;
use crate::domain::transfer::{OperatorContext, RowFields};
use crate::repository::{RepositoryResult, TableDataRepository};
use rusqlite::Connection;
use tracing::warn;

/// 单列修复记录
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Remediation {
    pub column: String,
    pub original: String,
    pub replacement: Option<String>,
}

// ==========================================
// ForeignKeyRemediator
// ==========================================
pub struct ForeignKeyRemediator {
    config: ActorReferenceConfig,
    enabled: bool, // 操作人表不存在时整体跳过
}

impl ForeignKeyRemediator {
    /// 按当前数据库准备修复器（每次导入调用一次）
    pub fn prepare(conn: &Connection, config: ActorReferenceConfig) -> RepositoryResult<Self> {
        let enabled = table_exists(conn, &config.actor_table)?;
        if !enabled {
            warn!(
                actor_table = %config.actor_table,
                "操作人表不存在，跳过外键修复"
            );
        }
        Ok(Self { config, enabled })
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// 修复一行中的操作人引用列
    ///
    /// # 返回
    /// - Ok(Vec<Remediation>): 实际改写的列（无改写时为空）
    pub fn remediate(
        &self,
        conn: &Connection,
        fields: &mut RowFields,
        operator: &OperatorContext,
    ) -> RepositoryResult<Vec<Remediation>> {
        let mut applied = Vec::new();
        if !self.enabled {
            return Ok(applied);
        }

        let candidates: Vec<(String, String)> = fields
            .columns()
            .into_iter()
            .filter(|c| self.config.is_actor_column(c))
            .filter_map(|c| fields.value(c).map(|v| (c.to_string(), v.to_string())))
            .collect();

        for (column, value) in candidates {
            let exists = TableDataRepository::value_exists(
                conn,
                &self.config.actor_table,
                &self.config.actor_key_column,
                &value,
            )?;
            if exists {
                continue;
            }

            let replacement = if self.config.is_owner_column(&column) {
                Some(operator.operator_id.to_string())
            } else {
                None
            };
            warn!(
                column = %column,
                original = %value,
                replacement = ?replacement,
                "操作人引用失效，已修复"
            );
            fields.set(&column, replacement.clone());
            applied.push(Remediation {
                column,
                original: value,
                replacement,
            });
        }

        Ok(applied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            r#"
            CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT NOT NULL);
            INSERT INTO users (id, name) VALUES (1, 'admin'), (7, 'operator');
            "#,
        )
        .unwrap();
        conn
    }

    fn fields(pairs: &[(&str, Option<&str>)]) -> RowFields {
        let mut f = RowFields::new();
        for (c, v) in pairs {
            f.push(c, v.map(|s| s.to_string()));
        }
        f
    }

    #[test]
    fn test_owner_column_remapped_to_operator() {
        let conn = setup();
        let remediator = ForeignKeyRemediator::prepare(&conn, ActorReferenceConfig::default()).unwrap();
        let mut row = fields(&[("name", Some("Bolt")), ("created_by", Some("999"))]);

        let applied = remediator
            .remediate(&conn, &mut row, &OperatorContext::new(7))
            .unwrap();

        assert_eq!(applied.len(), 1);
        assert_eq!(row.value("created_by"), Some("7"));
    }

    #[test]
    fn test_other_actor_column_nulled() {
        let conn = setup();
        let remediator = ForeignKeyRemediator::prepare(&conn, ActorReferenceConfig::default()).unwrap();
        let mut row = fields(&[("assigned_to", Some("42")), ("updated_by", Some("1"))]);

        remediator
            .remediate(&conn, &mut row, &OperatorContext::new(7))
            .unwrap();

        assert_eq!(row.get("assigned_to"), Some(&None));
        assert_eq!(row.value("updated_by"), Some("1"));
    }

    #[test]
    fn test_null_and_valid_references_untouched() {
        let conn = setup();
        let remediator = ForeignKeyRemediator::prepare(&conn, ActorReferenceConfig::default()).unwrap();
        let mut row = fields(&[("created_by", None), ("owner_id", Some("1"))]);

        let applied = remediator
            .remediate(&conn, &mut row, &OperatorContext::new(7))
            .unwrap();

        assert!(applied.is_empty());
        assert_eq!(row.get("created_by"), Some(&None));
    }

    #[test]
    fn test_skipped_without_actor_table() {
        let conn = Connection::open_in_memory().unwrap();
        let remediator = ForeignKeyRemediator::prepare(&conn, ActorReferenceConfig::default()).unwrap();
        assert!(!remediator.is_enabled());

        let mut row = fields(&[("created_by", Some("999"))]);
        let applied = remediator
            .remediate(&conn, &mut row, &OperatorContext::new(7))
            .unwrap();
        assert!(applied.is_empty());
        assert_eq!(row.value("created_by"), Some("999"));
    }
}
