// ==========================================
// 印刷生产日报系统 - 生产日报领域模型
// ==========================================
// 红线: 每个文件构建一次，装配完成后不再修改
// 用途: 解析层写入，持久化层只读
// ==========================================

use crate::domain::diagnostics::{Diagnostic, DiagnosticSummary};
use crate::domain::types::{ShiftName, Team};
use serde::{Deserialize, Serialize};

// ==========================================
// ReportContext - 外部已校验的上下文
// ==========================================
// 来源: 文件名校验（不在此处重复校验）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportContext {
    pub press: String, // 机台代码
    pub date: String,  // 生产日期
}

impl ReportContext {
    pub fn new(press: impl Into<String>, date: impl Into<String>) -> Self {
        Self {
            press: press.into(),
            date: date.into(),
        }
    }
}

// ==========================================
// ShiftRecord - 班次记录
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShiftRecord {
    pub start_time: Option<String>, // "HH:MM"
    pub end_time: Option<String>,   // "HH:MM"
    pub shift_name: ShiftName,
    pub team: Team,
    pub actual_hours: Option<f64>,         // 实际开机小时
    pub make_ready_minutes: Option<f64>,   // 换版分钟
    pub other_logged_minutes: Option<f64>, // 其他登记分钟
    pub row_index: usize,                  // 来源行（0 基）
}

// ==========================================
// TimeInterval - 时间区间
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeInterval {
    pub start: Option<String>, // "HH:MM"
    pub end: Option<String>,   // "HH:MM"
}

impl TimeInterval {
    pub fn new(start: Option<String>, end: Option<String>) -> Self {
        Self { start, end }
    }

    pub fn is_empty(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }
}

// ==========================================
// WorkOrderRecord - 工单记录
// ==========================================
// 说明: work_order_number 允许为 0（占位），允许重复（各自独立）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkOrderRecord {
    pub work_order_number: i64,
    pub good_production: Option<f64>,  // 合格产量
    pub lhe: Option<f64>,              // LHE
    pub spoilage_percent: Option<f64>, // 废品率 %
    pub make_ready: TimeInterval,      // 换版区间
    pub production: TimeInterval,      // 生产区间
    pub row_index: usize,              // 工单起始行（0 基）
}

// ==========================================
// DowntimeEvent / SpoilageEvent - 停机与废品事件
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DowntimeEvent {
    pub category: String,
    pub minutes: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpoilageEvent {
    pub category: String,
    pub units: f64,
}

// ==========================================
// ReportWorkOrder - 装配后的工单
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportWorkOrder {
    pub record: WorkOrderRecord,
    pub anchor_row: Option<usize>,      // Production 锚点行
    pub downtime: Vec<DowntimeEvent>,   // 独占，不与其他工单共享
    pub spoilage: Vec<SpoilageEvent>,   // 独占，不与其他工单共享
    pub assigned_shift: Option<usize>,  // 班次序号（仅查找用，不持有）
    pub shift_overlap_minutes: u32,     // 与所分配班次的重叠分钟
    pub run_speed: f64,                 // 运行速度（外部公式计算）
}

impl ReportWorkOrder {
    pub fn total_downtime_minutes(&self) -> f64 {
        self.downtime.iter().map(|e| e.minutes).sum()
    }

    pub fn total_spoilage_units(&self) -> f64 {
        self.spoilage.iter().map(|e| e.units).sum()
    }
}

// ==========================================
// ProductionReport - 生产日报
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductionReport {
    pub press: String,
    pub date: String,
    pub shifts: Vec<ShiftRecord>,
    pub work_orders: Vec<ReportWorkOrder>,
    pub diagnostics: Vec<Diagnostic>,
}

impl ProductionReport {
    /// 查找工单所分配的班次
    pub fn assigned_shift(&self, work_order: &ReportWorkOrder) -> Option<&ShiftRecord> {
        work_order
            .assigned_shift
            .and_then(|index| self.shifts.get(index))
    }

    pub fn diagnostic_summary(&self) -> DiagnosticSummary {
        DiagnosticSummary::from_diagnostics(&self.diagnostics)
    }

    pub fn total_good_production(&self) -> f64 {
        self.work_orders
            .iter()
            .filter_map(|wo| wo.record.good_production)
            .sum()
    }
}
