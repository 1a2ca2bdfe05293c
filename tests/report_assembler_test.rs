// ==========================================
// 印刷生产日报系统 - 日报装配集成测试
// ==========================================
// 覆盖: 表头定位、班次/工单抽取、锚点定位、事件归属、班次分配、运行速度
// ==========================================


use press_report::domain::{DiagnosticKind, Grid, OverlapMode, ReportContext, Row, ShiftName, Team};
use press_report::engine::{NetRunSpeed, ReportAssembler};
use press_report::importer::ImportError;
use test_helpers::*;

fn context() -> ReportContext {
    ReportContext::new("P7", "2024-03-04")
}

fn assemble(grid: &Grid) -> press_report::ProductionReport {
    ReportAssembler::default()
        .assemble(&context(), grid)
        .expect("装配失败")
}

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-6
}

#[test]
fn test_sample_report_structure() {
    let report = assemble(&sample_grid());

    assert_eq!(report.press, "P7");
    assert_eq!(report.date, "2024-03-04");
    assert_eq!(report.shifts.len(), 3);
    assert_eq!(report.work_orders.len(), 3);
    assert!(report.diagnostics.is_empty(), "{:?}", report.diagnostics);

    let names: Vec<ShiftName> = report.shifts.iter().map(|s| s.shift_name).collect();
    assert_eq!(names, vec![ShiftName::Earlies, ShiftName::Lates, ShiftName::Nights]);
    assert_eq!(report.shifts[2].team, Team::C);
    assert_eq!(report.shifts[0].actual_hours, Some(7.5));
}

#[test]
fn test_duplicate_work_orders_resolve_distinct_anchors() {
    let report = assemble(&sample_grid());

    let fives: Vec<_> = report
        .work_orders
        .iter()
        .filter(|wo| wo.record.work_order_number == 5)
        .collect();
    assert_eq!(fives.len(), 2);
    assert_eq!(fives[0].anchor_row, Some(9));
    assert_eq!(fives[1].anchor_row, Some(16));
    assert_ne!(fives[0].record.row_index, fives[1].record.row_index);
    assert_eq!(fives[0].record.good_production, Some(12000.0));
    assert_eq!(fives[1].record.good_production, Some(3000.0));
}

#[test]
fn test_events_belong_to_their_work_order_only() {
    let report = assemble(&sample_grid());
    let [first, second, third] = &report.work_orders[..] else {
        panic!("期望 3 个工单");
    };

    assert_eq!(first.downtime.len(), 1);
    assert_eq!(first.downtime[0].category, "Changing Bulks");
    assert_eq!(first.downtime[0].minutes, 24.0);
    assert_eq!(first.spoilage.len(), 1);
    assert_eq!(first.spoilage[0].category, "Web break");
    assert_eq!(first.spoilage[0].units, 6.0);

    // 同一行同时产生停机与废品事件
    assert_eq!(second.downtime[0].category, "Plate change");
    assert_eq!(second.spoilage[0].category, "Plate change");

    assert_eq!(third.downtime.len(), 1);
    assert_eq!(third.downtime[0].category, "Wash up");
    assert!(third.spoilage.is_empty());

    let downtime_total: usize = report.work_orders.iter().map(|w| w.downtime.len()).sum();
    let spoilage_total: usize = report.work_orders.iter().map(|w| w.spoilage.len()).sum();
    assert_eq!(downtime_total, 3);
    assert_eq!(spoilage_total, 2);
}

#[test]
fn test_changing_bulks_row_emits_only_downtime() {
    let mut rows = sample_report_rows(0);
    rows.truncate(10);
    rows.push(downtime_row("Changing Bulks", 24.0));
    rows.push(spoilage_row("Trim", 6.0));

    let report = assemble(&Grid::new(rows));
    let wo = &report.work_orders[0];
    assert_eq!(wo.downtime.len(), 1);
    assert_eq!(wo.downtime[0].category, "Changing Bulks");
    assert_eq!(wo.spoilage.len(), 1);
    assert_eq!(wo.spoilage[0].category, "Trim");
}

#[test]
fn test_shift_assignment_in_report() {
    let report = assemble(&sample_grid());

    let first = &report.work_orders[0];
    let shift = report.assigned_shift(first).expect("应分配班次");
    assert_eq!((shift.shift_name, shift.team), (ShiftName::Earlies, Team::A));
    assert_eq!(first.shift_overlap_minutes, 300);

    let overnight = report.assigned_shift(&report.work_orders[1]).expect("应分配班次");
    assert_eq!((overnight.shift_name, overnight.team), (ShiftName::Nights, Team::C));

    let afternoon = report.assigned_shift(&report.work_orders[2]).expect("应分配班次");
    assert_eq!(afternoon.shift_name, ShiftName::Lates);
    assert_eq!(report.work_orders[2].shift_overlap_minutes, 90);
}

#[test]
fn test_run_speed_uses_net_running_time() {
    let report = assemble(&sample_grid());

    // 12000 / ((300 - 24) / 60)
    assert!(approx_eq(report.work_orders[0].run_speed, 12000.0 / 4.6));
    // 8000 / ((360 - 15) / 60)，生产区间跨午夜
    assert!(approx_eq(report.work_orders[1].run_speed, 8000.0 / 5.75));
    // 3000 / ((90 - 10) / 60)
    assert!(approx_eq(report.work_orders[2].run_speed, 2250.0));
}

#[test]
fn test_gross_run_speed_and_circular_mode() {
    let assembler = ReportAssembler::new(OverlapMode::Circular, Box::new(NetRunSpeed::new(false)));
    let report = assembler.assemble(&context(), &sample_grid()).unwrap();

    assert_eq!(assembler.overlap_mode(), OverlapMode::Circular);
    assert!(approx_eq(report.work_orders[0].run_speed, 2400.0));
    assert_eq!(report.work_orders[0].assigned_shift, Some(0));
}

#[test]
fn test_header_found_at_later_rows() {
    for preamble in [2, 3] {
        let report = assemble(&Grid::new(sample_report_rows(preamble)));
        assert_eq!(report.shifts.len(), 3, "preamble = {}", preamble);
        assert_eq!(report.work_orders.len(), 3);
        assert_eq!(report.work_orders[0].anchor_row, Some(9 + preamble));
    }
}

#[test]
fn test_missing_header_degrades_to_no_shifts() {
    let rows: Vec<Row> = sample_report_rows(0)
        .into_iter()
        .enumerate()
        .filter(|(i, _)| *i != 2)
        .map(|(_, r)| r)
        .collect();

    let report = assemble(&Grid::new(rows));
    assert!(report.shifts.is_empty());
    assert_eq!(report.work_orders.len(), 3);
    assert!(report.work_orders.iter().all(|w| w.assigned_shift.is_none()));
    assert_eq!(report.diagnostics[0].kind, DiagnosticKind::NoHeaderFound);
}

#[test]
fn test_no_work_orders_is_fatal() {
    let rows: Vec<Row> = sample_report_rows(0).into_iter().take(7).collect();
    let result = ReportAssembler::default().assemble(&context(), &Grid::new(rows));

    match result {
        Err(ImportError::NoWorkOrders { press, date }) => {
            assert_eq!(press, "P7");
            assert_eq!(date, "2024-03-04");
        }
        other => panic!("期望 NoWorkOrders，实际 {:?}", other.map(|r| r.work_orders.len())),
    }
}

#[test]
fn test_fractional_work_order_number_is_not_fatal() {
    let grid = Grid::new(vec![
        Row::new().with("A", 12.5).with("B", 100),
        phase_row("Production", "07:00", "08:00"),
        downtime_row("Wash up", 5.0),
    ]);

    let report = assemble(&grid);
    assert_eq!(report.work_orders.len(), 1);
    let wo = &report.work_orders[0];
    assert_eq!(wo.record.work_order_number, 12);
    assert_eq!(wo.anchor_row, Some(1));
    assert_eq!(wo.downtime.len(), 1);
}

#[test]
fn test_invalid_team_and_shift_rows_are_diagnosed() {
    let mut rows = sample_report_rows(0);
    rows[4] = shift_row("14:00", "22:00", "Lates", "Team 9");
    rows[5] = shift_row("22:00", "06:00", "Overtime", "C");

    let report = assemble(&Grid::new(rows));
    assert_eq!(report.shifts.len(), 1);

    let kinds: Vec<DiagnosticKind> = report.diagnostics.iter().map(|d| d.kind).collect();
    assert_eq!(
        kinds,
        vec![DiagnosticKind::InvalidTeam, DiagnosticKind::InvalidShiftName]
    );
    assert_eq!(report.diagnostics[0].row_index, Some(4));
    // 班次区提前结束不影响工单
    assert_eq!(report.work_orders.len(), 3);
}

#[test]
fn test_work_order_without_production_row() {
    let mut rows = sample_report_rows(0);
    rows[9] = phase_row("Running", "07:00", "12:00");

    let report = assemble(&Grid::new(rows));
    let first = &report.work_orders[0];
    assert_eq!(first.anchor_row, None);
    assert!(first.downtime.is_empty());
    assert!(first.record.production.is_empty());
    assert_eq!(first.run_speed, 0.0);

    let missing: Vec<_> = report
        .diagnostics
        .iter()
        .filter(|d| d.kind == DiagnosticKind::MissingAnchor)
        .collect();
    assert_eq!(missing.len(), 1);
    assert_eq!(missing[0].row_index, Some(7));
}

#[test]
fn test_zero_work_order_number_retained() {
    let mut rows = sample_report_rows(0);
    rows.push(work_order_row(0, 0.0));

    let report = assemble(&Grid::new(rows));
    assert_eq!(report.work_orders.len(), 4);
    assert_eq!(report.work_orders[3].record.work_order_number, 0);
}

#[test]
fn test_assembly_is_deterministic() {
    let grid = sample_grid();
    assert_eq!(assemble(&grid), assemble(&grid));
}

#[test]
fn test_report_serializes_to_json() {
    let report = assemble(&sample_grid());
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["work_orders"][0]["record"]["work_order_number"], 5);
    assert_eq!(json["shifts"][0]["shift_name"], "Earlies");
}
