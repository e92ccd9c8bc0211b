// ==========================================
// ERP 表数据传输引擎 - 导入流程集成测试
// ==========================================
// 覆盖: 部分失败 / 幂等回导 / 表头拒绝 / 外键修复 / 全部失败 / 备份 / 计数不变量
//       空行行号 / 备份失败 / 事务中止 / 错误报告写入失败
// ==========================================


use erp_table_transfer::domain::OutcomeKind;
use erp_table_transfer::transfer::TableExporter;
use erp_table_transfer::{OperatorContext, TableImporter, TransferError, TransferStatus};
use std::fs;
use test_helpers::{count_files, count_logs, count_rows, create_test_env};

fn operator() -> OperatorContext {
    OperatorContext::new(7).with_name("operator")
}

// ==========================================
// 典型场景: 新增 + 缺必填 + 更新
// ==========================================
#[test]
fn test_partial_import_scenario() {
    let env = create_test_env().unwrap();
    let conn = env.open();
    let importer = TableImporter::with_csv(env.config.clone());
    let file = env.write_csv(
        "widgets.csv",
        "id,name,price,created_by\n,Nut,0.25,1\n,,3.00,1\n5,,2.75,\n",
    );

    let result = importer
        .import_file(&conn, "widgets", &file, &operator())
        .unwrap();

    assert_eq!(result.total_rows, 3);
    assert_eq!(result.success_count, 2);
    assert_eq!(result.failed_count, 1);
    assert_eq!(result.inserted_count, 1);
    assert_eq!(result.updated_count, 1);
    assert_eq!(result.status, TransferStatus::Partial);
    assert_eq!(result.table_count_before, 1);
    assert_eq!(result.table_count_after, 2);

    // 错误报告只含第 2 行
    let error_file = result.error_file_path.clone().unwrap();
    let report = fs::read_to_string(error_file).unwrap();
    assert_eq!(
        report,
        "Row Number,Error Description\n2,Missing required fields: name\n"
    );

    // id=5 只改了价格，名称与创建人保持不变
    let (name, price, created_by): (String, f64, i64) = conn
        .query_row(
            "SELECT name, price, created_by FROM widgets WHERE id = 5",
            [],
            |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)),
        )
        .unwrap();
    assert_eq!(name, "Bolt");
    assert!((price - 2.75).abs() < f64::EPSILON);
    assert_eq!(created_by, 1);

    // 新增行使用存储默认值
    let status: String = conn
        .query_row("SELECT status FROM widgets WHERE name = 'Nut'", [], |r| {
            r.get(0)
        })
        .unwrap();
    assert_eq!(status, "draft");

    assert_eq!(count_logs(&conn, "widgets"), 1);
}

// ==========================================
// 幂等: 导出后原样回导，全部为更新
// ==========================================
#[test]
fn test_reimport_exported_file_is_idempotent() {
    let env = create_test_env().unwrap();
    let conn = env.open();
    conn.execute(
        "INSERT INTO widgets (name, price, created_by, assigned_to) VALUES ('Nut', 0.25, 7, 1)",
        [],
    )
    .unwrap();

    let export = TableExporter::with_csv(env.config.clone())
        .export_table(&conn, "widgets", &operator())
        .unwrap();
    assert_eq!(export.record_count, 2);

    let result = TableImporter::with_csv(env.config.clone())
        .import_file(&conn, "widgets", &export.file_path, &operator())
        .unwrap();

    assert_eq!(result.failed_count, 0);
    assert_eq!(result.success_count, result.total_rows);
    assert_eq!(result.status, TransferStatus::Success);
    assert!(result
        .outcomes
        .iter()
        .all(|o| o.kind == OutcomeKind::Updated));
    assert!(result.error_file_path.is_none());
    assert_eq!(count_rows(&conn, "widgets"), 2);
}

// ==========================================
// 表头包含未知列: 整单拒绝，不备份，不审计
// ==========================================
#[test]
fn test_unknown_header_rejects_whole_import() {
    let env = create_test_env().unwrap();
    let conn = env.open();
    let file = env.write_csv("widgets.csv", "name,colour,created_by\nNut,red,1\n");

    let err = TableImporter::with_csv(env.config.clone())
        .import_file(&conn, "widgets", &file, &operator())
        .unwrap_err();

    match err {
        TransferError::HeaderMismatch { unknown, expected } => {
            assert_eq!(unknown, vec!["colour".to_string()]);
            assert!(expected.contains(&"created_by".to_string()));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(count_rows(&conn, "widgets"), 1);
    assert_eq!(count_logs(&conn, "widgets"), 0);
    assert_eq!(count_files(&env.config.backup_dir), 0);
}

// ==========================================
// 外键修复: 归属列改写为操作人，其他列置 NULL
// ==========================================
#[test]
fn test_actor_references_are_remediated() {
    let env = create_test_env().unwrap();
    let conn = env.open();
    let file = env.write_csv(
        "widgets.csv",
        "name,created_by,assigned_to\nGear,999,555\n",
    );

    let result = TableImporter::with_csv(env.config.clone())
        .import_file(&conn, "widgets", &file, &operator())
        .unwrap();
    assert_eq!(result.status, TransferStatus::Success);

    let (created_by, assigned_to): (i64, Option<i64>) = conn
        .query_row(
            "SELECT created_by, assigned_to FROM widgets WHERE name = 'Gear'",
            [],
            |r| Ok((r.get(0)?, r.get(1)?)),
        )
        .unwrap();
    assert_eq!(created_by, 7);
    assert_eq!(assigned_to, None);
}

// ==========================================
// 全部失败: status=Failed，仍写审计与错误报告
// ==========================================
#[test]
fn test_all_rows_failed_reports_first_error() {
    let env = create_test_env().unwrap();
    let conn = env.open();
    let file = env.write_csv(
        "widgets.csv",
        "name,created_by\nOnly one cell\n,1\n",
    );

    let result = TableImporter::with_csv(env.config.clone())
        .import_file(&conn, "widgets", &file, &operator())
        .unwrap();

    assert_eq!(result.status, TransferStatus::Failed);
    assert_eq!(result.success_count, 0);
    assert_eq!(result.failed_count, 2);
    assert_eq!(
        result.outcomes[0].message.as_deref(),
        Some("Column count mismatch")
    );
    assert!(result.message.contains("Column count mismatch"));
    assert!(result.error_file_path.is_some());
    assert_eq!(count_logs(&conn, "widgets"), 1);
    assert_eq!(count_rows(&conn, "widgets"), 1);
}

// ==========================================
// 备份: 通过表头校验后必有非空表头的快照
// ==========================================
#[test]
fn test_backup_snapshot_taken_before_rows() {
    let env = create_test_env().unwrap();
    let conn = env.open();
    let file = env.write_csv("widgets.csv", "name\n\n");

    let result = TableImporter::with_csv(env.config.clone())
        .import_file(&conn, "widgets", &file, &operator())
        .unwrap();

    assert!(result.backup_path.starts_with(&env.config.backup_dir));
    let snapshot = fs::read_to_string(&result.backup_path).unwrap();
    let header = snapshot.lines().next().unwrap();
    assert_eq!(
        header,
        "id,name,price,status,created_by,assigned_to,created_at,updated_at"
    );
    assert!(snapshot.contains("Bolt"));
}

// ==========================================
// 计数不变量: success + failed == total
// ==========================================
#[test]
fn test_counts_always_sum_to_total() {
    let env = create_test_env().unwrap();
    let conn = env.open();
    let file = env.write_csv(
        "widgets.csv",
        "id,name,status,created_by\n\
         ,A,draft,1\n\
         ,B,bogus,1\n\
         5,,,\n\
         abc,C,active,7\n\
         ,D,active\n",
    );

    let result = TableImporter::with_csv(env.config.clone())
        .import_file(&conn, "widgets", &file, &operator())
        .unwrap();

    assert_eq!(result.total_rows, 5);
    assert_eq!(result.success_count + result.failed_count, result.total_rows);
    assert_eq!(result.outcomes.len(), 5);

    // CHECK 约束失败是行级错误
    let row2 = &result.outcomes[1];
    assert_eq!(row2.kind, OutcomeKind::Failed);
    assert!(row2.message.as_deref().unwrap().starts_with("Database error:"));

    // id=5 没有可更新字段
    assert_eq!(
        result.outcomes[2].message.as_deref(),
        Some("No fields to update")
    );

    // 非数字 id 按新增处理
    assert_eq!(result.outcomes[3].kind, OutcomeKind::Inserted);
    assert_eq!(result.status, TransferStatus::Partial);
}

// ==========================================
// 启动前致命错误: 不审计
// ==========================================
#[test]
fn test_setup_errors_are_not_audited() {
    let env = create_test_env().unwrap();
    let conn = env.open();
    let importer = TableImporter::with_csv(env.config.clone());
    let file = env.write_csv("widgets.csv", "name\nNut\n");

    let err = importer
        .import_file(&conn, "transfer_log", &file, &operator())
        .unwrap_err();
    assert!(matches!(err, TransferError::TableNotAllowed(_)));

    let err = importer
        .import_file(&conn, "gadgets", &file, &operator())
        .unwrap_err();
    assert!(matches!(err, TransferError::TableNotFound(_)));

    let missing = env.work_dir.path().join("missing.csv");
    let err = importer
        .import_file(&conn, "widgets", &missing, &operator())
        .unwrap_err();
    assert!(matches!(err, TransferError::FileNotFound(_)));

    let empty = env.write_csv("empty.csv", "");
    let err = importer
        .import_file(&conn, "widgets", &empty, &operator())
        .unwrap_err();
    assert!(matches!(err, TransferError::FormatError(_)));

    let total: i64 = conn
        .query_row("SELECT COUNT(*) FROM transfer_log", [], |r| r.get(0))
        .unwrap();
    assert_eq!(total, 0);
}

// ==========================================
// BOM + 表头空白
// ==========================================
#[test]
fn test_bom_and_header_whitespace_are_stripped() {
    let env = create_test_env().unwrap();
    let conn = env.open();
    let file = env.write_csv(
        "widgets.csv",
        "\u{feff} name , created_by \nWasher,1\n",
    );

    let result = TableImporter::with_csv(env.config.clone())
        .import_file(&conn, "widgets", &file, &operator())
        .unwrap();
    assert_eq!(result.status, TransferStatus::Success);
    assert_eq!(result.inserted_count, 1);
}

// ==========================================
// 空行: 跳过且不计数，行号仍对应文件中的数据行
// ==========================================
#[test]
fn test_blank_lines_keep_file_row_numbers() {
    let env = create_test_env().unwrap();
    let conn = env.open();
    let file = env.write_csv("widgets.csv", "name,created_by\nA,1\n\n,1\n");

    let result = TableImporter::with_csv(env.config.clone())
        .import_file(&conn, "widgets", &file, &operator())
        .unwrap();

    assert_eq!(result.total_rows, 2);
    assert_eq!(result.success_count, 1);
    assert_eq!(result.failed_count, 1);
    assert_eq!(result.outcomes[1].row_number, 3);

    let report = fs::read_to_string(result.error_file_path.unwrap()).unwrap();
    assert_eq!(
        report,
        "Row Number,Error Description\n3,Missing required fields: name\n"
    );
}

// ==========================================
// 备份失败: 整单终止，不改表，不审计
// ==========================================
#[test]
fn test_backup_failure_aborts_before_rows() {
    let env = create_test_env().unwrap();
    let conn = env.open();
    let blocker = env.work_dir.path().join("backups_is_a_file");
    fs::write(&blocker, "x").unwrap();
    let mut config = env.config.clone();
    config.backup_dir = blocker;
    let file = env.write_csv("widgets.csv", "name,created_by\nNut,1\n");

    let err = TableImporter::with_csv(config)
        .import_file(&conn, "widgets", &file, &operator())
        .unwrap_err();

    assert!(matches!(err, TransferError::BackupFailed(_)));
    assert_eq!(count_rows(&conn, "widgets"), 1);
    assert_eq!(count_logs(&conn, "widgets"), 0);
}

// ==========================================
// 事务中止: 语句准备失败时整体回滚，写一条 Failed 审计
// ==========================================
#[test]
fn test_statement_failure_rolls_back_whole_import() {
    let env = create_test_env().unwrap();
    let conn = env.open();
    // 历史表被删后遗留的触发器，使 INSERT 语句无法准备
    conn.execute_batch(
        r#"
        CREATE TABLE parts (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL
        );
        INSERT INTO parts (id, name) VALUES (1, 'Original');
        CREATE TABLE part_history (part_id INTEGER);
        CREATE TRIGGER parts_history AFTER INSERT ON parts
        BEGIN
            INSERT INTO part_history (part_id) VALUES (NEW.id);
        END;
        DROP TABLE part_history;
        "#,
    )
    .unwrap();
    let file = env.write_csv("parts.csv", "id,name\n1,Renamed\n,Fresh\n");

    let err = TableImporter::with_csv(env.config.clone())
        .import_file(&conn, "parts", &file, &operator())
        .unwrap_err();
    assert!(matches!(err, TransferError::TransactionAborted(_)));

    // 第 1 行的更新随事务回滚
    let name: String = conn
        .query_row("SELECT name FROM parts WHERE id = 1", [], |r| r.get(0))
        .unwrap();
    assert_eq!(name, "Original");
    assert_eq!(count_rows(&conn, "parts"), 1);

    assert_eq!(count_logs(&conn, "parts"), 1);
    let (status, failed): (String, i64) = conn
        .query_row(
            "SELECT status, failed_count FROM transfer_log WHERE table_name = 'parts'",
            [],
            |r| Ok((r.get(0)?, r.get(1)?)),
        )
        .unwrap();
    assert_eq!(status, "Failed");
    assert_eq!(failed, 2);
    assert_eq!(count_files(&env.config.backup_dir), 1);
}

// ==========================================
// 错误报告写入失败: 结果说明中给出原因
// ==========================================
#[test]
fn test_error_report_failure_is_surfaced() {
    let env = create_test_env().unwrap();
    let conn = env.open();
    let blocker = env.work_dir.path().join("errors_is_a_file");
    fs::write(&blocker, "x").unwrap();
    let mut config = env.config.clone();
    config.error_dir = blocker;
    let file = env.write_csv("widgets.csv", "name,created_by\nNut,1\n,1\n");

    let result = TableImporter::with_csv(config)
        .import_file(&conn, "widgets", &file, &operator())
        .unwrap();

    assert_eq!(result.status, TransferStatus::Partial);
    assert_eq!(result.failed_count, 1);
    assert!(result.error_file_path.is_none());
    assert!(result.message.contains("错误报告未生成"));
    assert_eq!(count_logs(&conn, "widgets"), 1);
}
