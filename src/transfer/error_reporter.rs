// ==========================================
// ERP 表数据传输引擎 - 错误报告
// ==========================================
// 有失败行时写两列 CSV（Row Number / Error Description）；无失败不产生文件
// ==========================================

use crate::domain::transfer::{ImportJob, RowError};
use crate::transfer::csv_codec::create_output_file;
use crate::transfer::error::TransferResult;
use csv::Writer;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::warn;

pub const ERROR_REPORT_HEADERS: [&str; 2] = ["Row Number", "Error Description"];

pub struct ErrorReporter<'a> {
    error_dir: &'a Path,
}

impl<'a> ErrorReporter<'a> {
    pub fn new(error_dir: &'a Path) -> Self {
        Self { error_dir }
    }

    /// 写错误报告
    ///
    /// # 返回
    /// - Ok(Some(PathBuf)): 报告路径
    /// - Ok(None): 无失败行
    /// - Err: 写入失败（导入结果不受影响，由调用方附在结果说明中）
    pub fn report(&self, job: &ImportJob, errors: &[RowError]) -> TransferResult<Option<PathBuf>> {
        if errors.is_empty() {
            return Ok(None);
        }

        let path = self.error_dir.join(format!(
            "{}_errors_{}_{}.csv",
            job.table_name,
            job.started_at.format("%Y%m%d_%H%M%S"),
            job.short_id()
        ));
        create_output_file(&path)
            .and_then(|file| write_errors(file, errors))
            .map_err(|e| {
                warn!(path = %path.display(), error = %e, "错误报告写入失败");
                e
            })?;
        Ok(Some(path))
    }
}

pub fn write_errors<W: Write>(writer: W, errors: &[RowError]) -> TransferResult<()> {
    let mut csv_writer = Writer::from_writer(writer);
    csv_writer.write_record(ERROR_REPORT_HEADERS)?;
    for err in errors {
        csv_writer.write_record([err.row.to_string(), err.error.clone()])?;
    }
    csv_writer.flush().map_err(csv::Error::from)?;
    Ok(())
}
