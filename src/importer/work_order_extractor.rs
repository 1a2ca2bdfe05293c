// ==========================================
// 印刷生产日报系统 - 工单表抽取（状态机）
// ==========================================
// 状态: SeekingWorkOrder → InWorkOrder
//   - A 列为数字（含 0）: 提交当前工单，开启新工单（B/C/D 读取产量/LHE/废品率）
//   - InWorkOrder 时检查 F 列标签:
//       含 "production" → G/H 写入生产区间
//       含 "make ready" → G/H 写入换版区间
//   - 文件结束: 提交当前工单
// 说明: 重复工单号各自独立，不合并
// ==========================================

use crate::domain::cell::{CellValue, Grid, Row};
use crate::domain::diagnostics::{Diagnostic, DiagnosticKind};
use crate::domain::report::{TimeInterval, WorkOrderRecord};
use crate::importer::layout::{
    COL_DISCRIMINANT, COL_GOOD_PRODUCTION, COL_INTERVAL_END, COL_INTERVAL_START, COL_LHE,
    COL_ROW_LABEL, COL_SPOILAGE_PERCENT,
};
use crate::importer::time_normalizer::normalize_time;

const PRODUCTION_LABEL: &str = "production";
const MAKE_READY_LABEL: &str = "make ready";

/// A 列工单号：可解析为数字即开单，小数部分截断
///
/// 与班次区的停止条件不同，后者只认纯整数。
pub fn work_order_number(cell: &CellValue) -> Option<i64> {
    cell.as_number().map(|n| n.trunc() as i64)
}

// ==========================================
// WorkOrderDraft - 进行中的工单（唯一在建槽位）
// ==========================================
#[derive(Debug, Clone)]
struct WorkOrderDraft {
    work_order_number: i64,
    good_production: Option<f64>,
    lhe: Option<f64>,
    spoilage_percent: Option<f64>,
    make_ready: TimeInterval,
    production: TimeInterval,
    row_index: usize,
}

impl WorkOrderDraft {
    fn open(number: i64, row: &Row, row_index: usize) -> Self {
        Self {
            work_order_number: number,
            good_production: row.cell(COL_GOOD_PRODUCTION).as_number(),
            lhe: row.cell(COL_LHE).as_number(),
            spoilage_percent: row.cell(COL_SPOILAGE_PERCENT).as_number(),
            make_ready: TimeInterval::default(),
            production: TimeInterval::default(),
            row_index,
        }
    }

    fn finish(self) -> WorkOrderRecord {
        WorkOrderRecord {
            work_order_number: self.work_order_number,
            good_production: self.good_production,
            lhe: self.lhe,
            spoilage_percent: self.spoilage_percent,
            make_ready: self.make_ready,
            production: self.production,
            row_index: self.row_index,
        }
    }
}

// ==========================================
// ScanState - 扫描状态
// ==========================================
#[derive(Debug)]
enum ScanState {
    SeekingWorkOrder,
    InWorkOrder(WorkOrderDraft),
}

// ==========================================
// WorkOrderExtraction - 抽取结果
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct WorkOrderExtraction {
    pub work_orders: Vec<WorkOrderRecord>,
    pub diagnostics: Vec<Diagnostic>,
}

/// 从 start_row 起抽取工单
pub fn extract_work_orders(grid: &Grid, start_row: usize) -> WorkOrderExtraction {
    let mut work_orders = Vec::new();
    let mut diagnostics = Vec::new();
    let mut state = ScanState::SeekingWorkOrder;

    for (index, row) in grid.rows().iter().enumerate().skip(start_row) {
        if let Some(number) = work_order_number(row.cell(COL_DISCRIMINANT)) {
            let previous = std::mem::replace(
                &mut state,
                ScanState::InWorkOrder(WorkOrderDraft::open(number, row, index)),
            );
            if let ScanState::InWorkOrder(draft) = previous {
                work_orders.push(draft.finish());
            }
        }

        // 开单行本身也可能带标签
        if let ScanState::InWorkOrder(draft) = &mut state {
            let label = row.cell(COL_ROW_LABEL).normalized_label();
            if label.contains(PRODUCTION_LABEL) {
                draft.production = read_interval(row, index, "生产", &mut diagnostics);
            } else if label.contains(MAKE_READY_LABEL) {
                draft.make_ready = read_interval(row, index, "换版", &mut diagnostics);
            }
        }
    }

    if let ScanState::InWorkOrder(draft) = state {
        work_orders.push(draft.finish());
    }

    WorkOrderExtraction {
        work_orders,
        diagnostics,
    }
}

fn read_interval(
    row: &Row,
    index: usize,
    phase: &str,
    diagnostics: &mut Vec<Diagnostic>,
) -> TimeInterval {
    let mut read = |cell: &CellValue, edge: &str| {
        let normalized = normalize_time(cell);
        if normalized.is_none() && !cell.is_blank() {
            diagnostics.push(Diagnostic::at_row(
                DiagnosticKind::UnparseableTime,
                index,
                format!("{}区间{}时间无法解析: {:?}", phase, edge, cell),
            ));
        }
        normalized
    };

    let start = read(row.cell(COL_INTERVAL_START), "开始");
    let end = read(row.cell(COL_INTERVAL_END), "结束");
    TimeInterval::new(start, end)
}
