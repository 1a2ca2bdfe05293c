// ==========================================
// 印刷生产日报系统 - 核心库
// ==========================================
// 职责: 解析印刷机日报表格（班次/工单/停机/废品），装配为结构化日报
// 技术栈: Rust + SQLite
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 班次分配与日报装配
pub mod engine;

// 导入层 - 文件解析与抽取
pub mod importer;

// 配置层 - 导入配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一/建表）
pub mod db;

// 日志系统
pub mod logging;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{OverlapMode, ShiftName, Team};

// 领域实体
pub use domain::{
    CellValue, Column, Diagnostic, DiagnosticKind, DiagnosticLevel, Grid, ProductionReport,
    ReportContext, ReportWorkOrder, Row, ShiftRecord, WorkOrderRecord,
};

// 引擎
pub use engine::{NetRunSpeed, ReportAssembler, RunSpeedFormula, ShiftAssignmentEngine};

// 导入
pub use importer::{ImportError, ImportOutcome, ReportImporter, ReportImporterImpl};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "印刷生产日报系统";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
