// ==========================================
// 印刷生产日报系统 - 日报导入 Trait
// ==========================================
// 职责: 定义日报导入与文件解析接口（不包含实现）
// ==========================================

use crate::domain::cell::Grid;
use crate::domain::report::{ProductionReport, ReportContext};
use crate::importer::error::ImportResult;
use async_trait::async_trait;
use serde::Serialize;
use std::path::{Path, PathBuf};

// ==========================================
// ImportOutcome - 单文件导入结果
// ==========================================
#[derive(Debug, Clone, Serialize)]
pub struct ImportOutcome {
    pub report: ProductionReport,
    pub report_id: Option<String>, // 未挂载仓储时为 None
    pub elapsed_ms: u64,
}

// ==========================================
// ReportImporter Trait
// ==========================================
// 用途: 日报导入主接口
// 实现者: ReportImporterImpl
#[async_trait]
pub trait ReportImporter: Send + Sync {
    /// 导入单个日报文件
    ///
    /// # 参数
    /// - file_path: 日报文件路径（.xlsx/.xls/.csv 等）
    /// - context: 外部已校验的机台与日期
    ///
    /// # 返回
    /// - Ok(ImportOutcome): 日报（含诊断）及落库 ID
    /// - Err: 文件错误、无工单、落库失败
    ///
    /// # 说明
    /// - 文件加载是唯一的异步边界，加载完成前丢弃 future 即取消导入
    /// - 解析开始后同步执行到底，不产生部分结果
    async fn import_file<P: AsRef<Path> + Send>(
        &self,
        file_path: P,
        context: ReportContext,
    ) -> ImportResult<ImportOutcome>;

    /// 批量导入多个文件（严格顺序执行）
    ///
    /// # 说明
    /// - 前一个文件完整结束后才开始下一个
    /// - 单个文件失败不影响其他文件
    async fn batch_import(
        &self,
        files: Vec<(PathBuf, ReportContext)>,
    ) -> Vec<Result<ImportOutcome, String>>;
}

// ==========================================
// FileParser Trait
// ==========================================
// 用途: 表格文件 → 网格
// 实现者: ExcelParser, CsvParser, UniversalFileParser
pub trait FileParser: Send + Sync {
    /// 解析文件为网格（行号与工作表行号一致）
    fn parse_to_grid(&self, file_path: &Path) -> ImportResult<Grid>;
}
