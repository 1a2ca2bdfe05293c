// ==========================================
// 印刷生产日报系统 - 日报装配器
// ==========================================
// 流程:
//   1) 表头定位 → 班次抽取
//   2) 工单抽取（从班次区结束行开始）；无工单 → 致命错误
//   3) 逐工单（文档顺序）:
//        a) 定位开单行: 自上一个已消费开单行之后，找 A 列等于工单号且未被认领的行
//        b) 自开单行向下找标签恰为 "production" 的锚点行（遇下一工单行即放弃）
//        c) 锚点之后扫描停机/废品事件
//        d) 生产区间对班次表做重叠分配
//        e) 计算运行速度（缺任一输入为 0）
//   4) 一次性构造 ProductionReport
// 红线: 网格只读；解析过程中不做 I/O
// ==========================================

use crate::domain::cell::Grid;
use crate::domain::diagnostics::{Diagnostic, DiagnosticKind};
use crate::domain::report::{
    ProductionReport, ReportContext, ReportWorkOrder, ShiftRecord, WorkOrderRecord,
};
use crate::domain::types::OverlapMode;
use crate::engine::run_speed::{NetRunSpeed, RunSpeedFormula};
use crate::engine::shift_assignment::ShiftAssignmentEngine;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::event_scanner::scan_events;
use crate::importer::header_locator::locate_header;
use crate::importer::layout::{COL_DISCRIMINANT, COL_ROW_LABEL};
use crate::importer::shift_extractor::extract_shifts;
use crate::importer::time_normalizer::interval_minutes;
use crate::importer::work_order_extractor::{extract_work_orders, work_order_number};
use std::collections::HashSet;
use tracing::{debug, info, instrument, warn};

const ANCHOR_LABEL: &str = "production";

// ==========================================
// ReportAssembler - 日报装配器
// ==========================================
pub struct ReportAssembler {
    shift_engine: ShiftAssignmentEngine,
    run_speed: Box<dyn RunSpeedFormula>,
}

impl ReportAssembler {
    /// 构造函数
    ///
    /// # 参数
    /// - `overlap_mode`: 班次重叠计算模式
    /// - `run_speed`: 运行速度公式
    pub fn new(overlap_mode: OverlapMode, run_speed: Box<dyn RunSpeedFormula>) -> Self {
        Self {
            shift_engine: ShiftAssignmentEngine::new(overlap_mode),
            run_speed,
        }
    }

    pub fn overlap_mode(&self) -> OverlapMode {
        self.shift_engine.mode()
    }

    /// 装配单个文件的生产日报
    ///
    /// # 参数
    /// - `context`: 外部已校验的机台与日期
    /// - `grid`: 已加载的工作表网格
    ///
    /// # 返回
    /// - Ok(ProductionReport): 可能带诊断的完整日报
    /// - Err(ImportError::NoWorkOrders): 未找到任何工单
    #[instrument(
        skip(self, grid),
        fields(press = %context.press, date = %context.date, rows = grid.len())
    )]
    pub fn assemble(&self, context: &ReportContext, grid: &Grid) -> ImportResult<ProductionReport> {
        let mut diagnostics: Vec<Diagnostic> = Vec::new();

        // ===== 步骤1: 班次表 =====
        let header = locate_header(grid);
        match &header {
            Some(h) => debug!(
                row_index = h.row_index,
                matched = h.matched_count(),
                "定位到班次表头"
            ),
            None => warn!("未找到班次表头"),
        }
        let shift_extraction = extract_shifts(grid, header.as_ref());
        let shifts = shift_extraction.shifts;
        diagnostics.extend(shift_extraction.diagnostics);

        // ===== 步骤2: 工单表 =====
        let wo_extraction = extract_work_orders(grid, shift_extraction.section_end);
        diagnostics.extend(wo_extraction.diagnostics);
        if wo_extraction.work_orders.is_empty() {
            warn!("未找到任何工单，放弃整份日报");
            return Err(ImportError::NoWorkOrders {
                press: context.press.clone(),
                date: context.date.clone(),
            });
        }

        // ===== 步骤3: 逐工单装配 =====
        let mut claimed: HashSet<usize> = HashSet::new();
        let mut cursor = shift_extraction.section_end;
        let mut work_orders = Vec::with_capacity(wo_extraction.work_orders.len());

        for record in wo_extraction.work_orders {
            let opening = find_opening_row(grid, record.work_order_number, cursor, &claimed);
            let anchor = match opening {
                Some(row) => {
                    claimed.insert(row);
                    cursor = row + 1;
                    find_anchor_row(grid, row)
                }
                None => None,
            };

            if anchor.is_none() {
                diagnostics.push(Diagnostic::new(
                    DiagnosticKind::MissingAnchor,
                    opening.or(Some(record.row_index)),
                    format!(
                        "工单 {} 未找到 Production 行，停机/废品事件为空",
                        record.work_order_number
                    ),
                ));
            }

            work_orders.push(self.build_work_order(grid, &shifts, record, anchor));
        }

        let report = ProductionReport {
            press: context.press.clone(),
            date: context.date.clone(),
            shifts,
            work_orders,
            diagnostics,
        };

        let summary = report.diagnostic_summary();
        info!(
            shifts = report.shifts.len(),
            work_orders = report.work_orders.len(),
            warnings = summary.warning,
            infos = summary.info,
            "日报装配完成"
        );
        Ok(report)
    }

    fn build_work_order(
        &self,
        grid: &Grid,
        shifts: &[ShiftRecord],
        record: WorkOrderRecord,
        anchor: Option<usize>,
    ) -> ReportWorkOrder {
        let events = scan_events(grid, anchor);
        let assignment = self.shift_engine.assign(&record.production, shifts);
        let downtime_minutes: f64 = events.downtime.iter().map(|e| e.minutes).sum();
        let run_speed = self.compute_run_speed(&record, downtime_minutes);

        debug!(
            work_order = record.work_order_number,
            anchor = ?anchor,
            shift = ?assignment.map(|a| a.shift_index),
            run_speed,
            "工单装配完成"
        );

        ReportWorkOrder {
            record,
            anchor_row: anchor,
            downtime: events.downtime,
            spoilage: events.spoilage,
            assigned_shift: assignment.map(|a| a.shift_index),
            shift_overlap_minutes: assignment.map(|a| a.overlap_minutes).unwrap_or(0),
            run_speed,
        }
    }

    fn compute_run_speed(&self, record: &WorkOrderRecord, downtime_minutes: f64) -> f64 {
        let good = match record.good_production {
            Some(g) => g,
            None => return 0.0,
        };
        let duration = match (&record.production.start, &record.production.end) {
            (Some(start), Some(end)) => interval_minutes(start, end),
            _ => None,
        };
        match duration {
            Some(minutes) => self
                .run_speed
                .run_speed(good, f64::from(minutes), downtime_minutes),
            None => 0.0,
        }
    }
}

impl Default for ReportAssembler {
    fn default() -> Self {
        Self::new(OverlapMode::default(), Box::new(NetRunSpeed::default()))
    }
}

/// 查找工单开单行（首个未认领的匹配行）
fn find_opening_row(
    grid: &Grid,
    number: i64,
    from: usize,
    claimed: &HashSet<usize>,
) -> Option<usize> {
    (from..grid.len()).find(|index| {
        !claimed.contains(index)
            && work_order_number(grid.cell(*index, COL_DISCRIMINANT)) == Some(number)
    })
}

/// 自开单行向下查找 Production 锚点行
fn find_anchor_row(grid: &Grid, opening: usize) -> Option<usize> {
    for index in opening..grid.len() {
        if index > opening && work_order_number(grid.cell(index, COL_DISCRIMINANT)).is_some() {
            return None;
        }
        if grid.cell(index, COL_ROW_LABEL).normalized_label() == ANCHOR_LABEL {
            return Some(index);
        }
    }
    None
}
