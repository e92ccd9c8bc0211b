// ==========================================
// ERP 表数据传输引擎 - 传输日志数据仓储
// ==========================================
// 对齐: transfer_log 表
// 红线: 每次进入行处理的导入、每次用户导出，恰好写入一条
// ==========================================

mod core;
mod queries;


pub use self::core::TransferLogRepository;
