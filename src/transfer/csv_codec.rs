// ==========================================
// ERP 表数据传输引擎 - CSV 编解码（Tabular Codec）
// ==========================================
// 导出: 表头 = 目录顺序列名，逐行写出
// 样例: 表头 + 一行按列类型生成的示例值
// 导入: 表头去 BOM / 去空白；数据行保留原始单元格
// ==========================================

use crate::domain::schema::{ColumnDescriptor, TableSchema};
use crate::domain::transfer::RowRecord;
use crate::repository::TableDataRepository;
use crate::transfer::error::{TransferError, TransferResult};
use crate::transfer::transfer_trait::{ParsedFile, TabularReader, TabularWriter};
use chrono::NaiveDateTime;
use csv::{ReaderBuilder, StringRecord, Writer};
use rusqlite::Connection;
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::Path;

const BOM: char = '\u{feff}';

/// 样例中的固定日期
pub const SAMPLE_DATE: &str = "2024-01-15";
/// 样例中的文本占位句
pub const SAMPLE_TEXT: &str = "This is a sample text value.";

// ==========================================
// CsvCodec
// ==========================================
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvCodec;

impl CsvCodec {
    /// 从任意 Reader 解析
    ///
    /// 行号 = 记录起始物理行 - 表头行；空行被跳过且不计入行数
    pub fn read_from<R: Read>(&self, mut reader: R) -> TransferResult<ParsedFile> {
        let mut content = Vec::new();
        reader
            .read_to_end(&mut content)
            .map_err(|e| TransferError::FormatError(format!("文件读取失败: {}", e)))?;
        let lines = LineIndex::new(&content);

        let mut csv_reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true) // 列数不一致留给行校验处理
            .from_reader(content.as_slice());
        let mut records = csv_reader.records();

        let header_record = match records.next() {
            Some(result) => result
                .map_err(|e| TransferError::FormatError(format!("表头不可读: {}", e)))?,
            None => return Err(TransferError::FormatError("文件为空，缺少表头".to_string())),
        };

        let headers: Vec<String> = header_record.iter().map(normalize_header).collect();
        if headers.iter().all(|h| h.is_empty()) {
            return Err(TransferError::FormatError("表头为空".to_string()));
        }
        let header_line = lines.line_of(&header_record).unwrap_or(1);

        let mut rows = Vec::new();
        for (idx, result) in records.enumerate() {
            let record = result
                .map_err(|e| TransferError::FormatError(format!("数据行不可读: {}", e)))?;
            let row_number = lines
                .line_of(&record)
                .map(|line| line.saturating_sub(header_line))
                .unwrap_or(idx + 1);
            rows.push(RowRecord {
                row_number,
                cells: record.iter().map(|c| c.to_string()).collect(),
            });
        }

        Ok(ParsedFile { headers, rows })
    }

    /// 全表导出到任意 Writer
    pub fn export_to<W: Write>(
        &self,
        conn: &Connection,
        schema: &TableSchema,
        writer: W,
    ) -> TransferResult<usize> {
        let mut csv_writer = Writer::from_writer(writer);
        let columns = schema.column_names();
        csv_writer.write_record(&columns)?;

        let count = TableDataRepository::for_each_row(
            conn,
            &schema.table_name,
            &columns,
            |values| -> TransferResult<()> {
                csv_writer.write_record(&values)?;
                Ok(())
            },
        )?;

        csv_writer
            .flush()
            .map_err(|e| TransferError::FormatError(e.to_string()))?;
        Ok(count)
    }

    /// 样例模板写入任意 Writer
    pub fn sample_to<W: Write>(
        &self,
        schema: &TableSchema,
        writer: W,
        now: NaiveDateTime,
    ) -> TransferResult<()> {
        let mut csv_writer = Writer::from_writer(writer);
        csv_writer.write_record(schema.column_names())?;
        let sample: Vec<String> = schema
            .columns
            .iter()
            .map(|c| sample_value(c, now))
            .collect();
        csv_writer.write_record(&sample)?;
        csv_writer
            .flush()
            .map_err(|e| TransferError::FormatError(e.to_string()))?;
        Ok(())
    }
}

impl TabularReader for CsvCodec {
    fn read_file(&self, file_path: &Path) -> TransferResult<ParsedFile> {
        if !file_path.exists() {
            return Err(TransferError::FileNotFound(file_path.display().to_string()));
        }
        let file = File::open(file_path)
            .map_err(|e| TransferError::FormatError(format!("文件读取失败: {}", e)))?;
        self.read_from(file)
    }
}

impl TabularWriter for CsvCodec {
    fn write_export(
        &self,
        conn: &Connection,
        schema: &TableSchema,
        file_path: &Path,
    ) -> TransferResult<usize> {
        let file = create_output_file(file_path)?;
        self.export_to(conn, schema, file)
    }

    fn write_sample(
        &self,
        schema: &TableSchema,
        file_path: &Path,
        now: NaiveDateTime,
    ) -> TransferResult<()> {
        let file = create_output_file(file_path)?;
        self.sample_to(schema, file, now)
    }
}

/// 字节偏移 → 物理行号（从 1 开始）
struct LineIndex<'a> {
    content: &'a [u8],
    newlines: Vec<usize>,
}

impl<'a> LineIndex<'a> {
    fn new(content: &'a [u8]) -> Self {
        let newlines = content
            .iter()
            .enumerate()
            .filter(|(_, b)| **b == b'\n')
            .map(|(i, _)| i)
            .collect();
        Self { content, newlines }
    }

    /// 记录的起始行
    ///
    /// 解析器给出的偏移可能落在被跳过的空行上，先越过行结束符
    fn line_of(&self, record: &StringRecord) -> Option<usize> {
        let mut start = usize::try_from(record.position()?.byte()).ok()?;
        while matches!(self.content.get(start), Some(b'\r' | b'\n')) {
            start += 1;
        }
        Some(self.newlines.partition_point(|&nl| nl < start) + 1)
    }
}

/// 创建输出文件（自动创建父目录）
pub fn create_output_file(file_path: &Path) -> TransferResult<File> {
    if let Some(parent) = file_path.parent() {
        fs::create_dir_all(parent).map_err(|e| TransferError::file_write(parent, e))?;
    }
    File::create(file_path).map_err(|e| TransferError::file_write(file_path, e))
}

/// 表头单元格标准化: 去 BOM、去首尾空白
pub fn normalize_header(cell: &str) -> String {
    cell.trim().trim_start_matches(BOM).trim().to_string()
}

/// 按列类型生成示例值
///
/// 规则（按优先级）:
/// - 枚举列 → 声明集合的第一个值
/// - 整数 → "123"
/// - DECIMAL/FLOAT/DOUBLE/REAL/NUMERIC → "99.99"
/// - DATETIME/TIMESTAMP/TIME → 当前时间
/// - DATE → 固定日期
/// - TEXT 类 → 占位句
/// - 其他 → "Sample <列名>"
pub fn sample_value(column: &ColumnDescriptor, now: NaiveDateTime) -> String {
    if column.is_enum() {
        return column.enum_values[0].clone();
    }

    let declared = column.declared_type.to_ascii_uppercase();
    let base = declared
        .split('(')
        .next()
        .unwrap_or_default()
        .trim()
        .to_string();

    if base.contains("INT") {
        "123".to_string()
    } else if ["DECIMAL", "FLOAT", "DOUBLE", "REAL", "NUMERIC"]
        .iter()
        .any(|t| base.starts_with(t))
    {
        "99.99".to_string()
    } else if base.starts_with("DATETIME") || base.starts_with("TIMESTAMP") || base == "TIME" {
        now.format("%Y-%m-%d %H:%M:%S").to_string()
    } else if base == "DATE" {
        SAMPLE_DATE.to_string()
    } else if base.ends_with("TEXT") || base == "CLOB" {
        SAMPLE_TEXT.to_string()
    } else {
        format!("Sample {}", column.name)
    }
}
