// ==========================================
// ERP 表数据传输引擎 - 导出 / 样例模板集成测试
// ==========================================


use chrono::NaiveDate;
use erp_table_transfer::transfer::TableExporter;
use erp_table_transfer::{OperatorContext, TransferError};
use std::fs;
use test_helpers::{count_logs, create_test_env};

#[test]
fn test_export_empty_table_writes_header_only() {
    let env = create_test_env().unwrap();
    let conn = env.open();
    let exporter = TableExporter::with_csv(env.config.clone());

    let result = exporter
        .export_table(&conn, "archived_widgets", &OperatorContext::new(1))
        .unwrap();

    assert_eq!(result.record_count, 0);
    assert!(result.file_path.starts_with(&env.config.export_dir));
    assert_eq!(fs::read_to_string(&result.file_path).unwrap(), "id,name\n");
    assert!(result.log_id.is_some());
    assert_eq!(count_logs(&conn, "archived_widgets"), 1);
}

#[test]
fn test_export_rows_in_catalog_order() {
    let env = create_test_env().unwrap();
    let conn = env.open();

    let result = TableExporter::with_csv(env.config.clone())
        .export_table(&conn, "widgets", &OperatorContext::new(1))
        .unwrap();

    let text = fs::read_to_string(&result.file_path).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(
        lines,
        vec![
            "id,name,price,status,created_by,assigned_to,created_at,updated_at",
            "5,Bolt,1.5,active,1,,2026-01-01 08:00:00,",
        ]
    );
}

#[test]
fn test_sample_uses_first_enum_literal() {
    let env = create_test_env().unwrap();
    let conn = env.open();
    let now = NaiveDate::from_ymd_opt(2026, 10, 17)
        .unwrap()
        .and_hms_opt(12, 0, 0)
        .unwrap();

    let path = TableExporter::with_csv(env.config.clone())
        .generate_sample(&conn, "widgets", now)
        .unwrap();

    assert_eq!(path, env.config.sample_dir.join("widgets_sample.csv"));
    let mut reader = csv::Reader::from_path(&path).unwrap();
    let headers = reader.headers().unwrap().clone();
    let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
    assert_eq!(rows.len(), 1);

    let value = |column: &str| {
        let idx = headers.iter().position(|h| h == column).unwrap();
        rows[0][idx].to_string()
    };
    assert_eq!(value("status"), "draft");
    assert_eq!(value("id"), "123");
    assert_eq!(value("price"), "99.99");
    assert_eq!(value("name"), "This is a sample text value.");

    // 样例不写审计
    assert_eq!(count_logs(&conn, "widgets"), 0);
}

#[test]
fn test_export_rejects_internal_tables() {
    let env = create_test_env().unwrap();
    let conn = env.open();

    let err = TableExporter::with_csv(env.config.clone())
        .export_table(&conn, "config_kv", &OperatorContext::new(1))
        .unwrap_err();
    assert!(matches!(err, TransferError::TableNotAllowed(_)));
}
