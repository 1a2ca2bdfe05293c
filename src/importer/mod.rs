// ==========================================
// 印刷生产日报系统 - 导入层
// ==========================================
// 职责: 表格文件 → 网格 → 班次/工单/事件抽取
// 支持: Excel, CSV
// ==========================================

// 模块声明
pub mod error;
pub mod event_scanner;
pub mod file_parser;
pub mod header_locator;
pub mod layout;
pub mod report_importer_impl;
pub mod report_importer_trait;
pub mod shift_extractor;
pub mod time_normalizer;
pub mod work_order_extractor;

// 重导出核心类型
pub use error::{ImportError, ImportResult};
pub use event_scanner::{scan_events, EventScan};
pub use file_parser::{CsvParser, ExcelParser, UniversalFileParser};
pub use header_locator::{locate_header, HeaderLocation, ShiftField};
pub use report_importer_impl::ReportImporterImpl;
pub use shift_extractor::{extract_shifts, normalize_team, ShiftExtraction};
pub use time_normalizer::normalize_time;
pub use work_order_extractor::{extract_work_orders, WorkOrderExtraction};

// 重导出 Trait 接口
pub use report_importer_trait::{FileParser, ImportOutcome, ReportImporter};
