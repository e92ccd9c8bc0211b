// ==========================================
// ERP 表数据传输引擎 - 传输接口 Trait
// ==========================================
// 职责: 定义表格文件读写接口（不包含实现）
// 实现者: CsvCodec
// ==========================================

use crate::domain::schema::TableSchema;
use crate::domain::transfer::RowRecord;
use crate::transfer::error::TransferResult;
use chrono::NaiveDateTime;
use rusqlite::Connection;
use std::path::Path;

// ==========================================
// ParsedFile - 已解析的导入文件
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedFile {
    pub headers: Vec<String>, // 已去 BOM、已 trim
    pub rows: Vec<RowRecord>, // 文件顺序，行号从 1 开始
}

// ==========================================
// TabularReader Trait
// ==========================================
// 用途: 导入文件读取
pub trait TabularReader: Send + Sync {
    /// 读取导入文件
    ///
    /// # 返回
    /// - Ok(ParsedFile): 表头 + 数据行
    /// - Err(FileNotFound / FormatError): 文件不存在、为空或表头不可读
    fn read_file(&self, file_path: &Path) -> TransferResult<ParsedFile>;
}

// ==========================================
// TabularWriter Trait
// ==========================================
// 用途: 导出文件 / 样例模板写入
pub trait TabularWriter: Send + Sync {
    /// 全表导出（空表只写表头）
    ///
    /// # 返回
    /// - Ok(usize): 导出的数据行数
    fn write_export(
        &self,
        conn: &Connection,
        schema: &TableSchema,
        file_path: &Path,
    ) -> TransferResult<usize>;

    /// 写样例模板（表头 + 一行示例数据）
    fn write_sample(
        &self,
        schema: &TableSchema,
        file_path: &Path,
        now: NaiveDateTime,
    ) -> TransferResult<()>;
}
