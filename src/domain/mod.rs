// ==========================================
// 印刷生产日报系统 - 领域模型层
// ==========================================
// 职责: 定义网格、班次、工单、事件、诊断等领域实体
// 红线: 不含数据访问逻辑,不含解析逻辑
// ==========================================

pub mod cell;
pub mod diagnostics;
pub mod report;
pub mod types;

// 重导出核心类型
pub use cell::{CellValue, Column, Grid, Row};
pub use diagnostics::{Diagnostic, DiagnosticKind, DiagnosticLevel, DiagnosticSummary};
pub use report::{
    DowntimeEvent, ProductionReport, ReportContext, ReportWorkOrder, ShiftRecord, SpoilageEvent,
    TimeInterval, WorkOrderRecord,
};
pub use types::{OverlapMode, ShiftName, Team};
