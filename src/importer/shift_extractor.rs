// ==========================================
// 印刷生产日报系统 - 班次表抽取
// ==========================================
// 流程: 表头下一行起逐行扫描
//   1) A 列出现 "works order"/"work order" 或纯整数 → 进入工单区，停止
//   2) 整行空白 → 跳过
//   3) 班次名非法 → 视为工单区已开始，停止（该行不输出）
//   4) 班组非法 → 丢弃该行，继续
//   5) 时间字段最后归一化，然后一次性构造 ShiftRecord
// ==========================================

use crate::domain::cell::{CellValue, Grid, Row};
use crate::domain::diagnostics::{Diagnostic, DiagnosticKind};
use crate::domain::report::ShiftRecord;
use crate::domain::types::{ShiftName, Team};
use crate::importer::header_locator::{HeaderLocation, ShiftField};
use crate::importer::layout::COL_DISCRIMINANT;
use crate::importer::time_normalizer::normalize_time;

const TEAM_PREFIXES: [&str; 2] = ["team", "shift"];

// ==========================================
// ShiftExtraction - 抽取结果
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct ShiftExtraction {
    pub shifts: Vec<ShiftRecord>,
    pub diagnostics: Vec<Diagnostic>,
    pub section_end: usize, // 班次区结束行（工单区从此行开始扫描）
}

/// 抽取班次表；header 为 None 时降级为空列表
pub fn extract_shifts(grid: &Grid, header: Option<&HeaderLocation>) -> ShiftExtraction {
    let header = match header {
        Some(h) => h,
        None => {
            return ShiftExtraction {
                shifts: Vec::new(),
                diagnostics: vec![Diagnostic::new(
                    DiagnosticKind::NoHeaderFound,
                    None,
                    "未找到班次表头，班次列表为空",
                )],
                section_end: 0,
            };
        }
    };

    let mut shifts = Vec::new();
    let mut diagnostics = Vec::new();
    let mut section_end = grid.len();

    for (index, row) in grid.rows().iter().enumerate().skip(header.row_index + 1) {
        if is_work_order_marker(row.cell(COL_DISCRIMINANT)) {
            section_end = index;
            break;
        }

        if row.is_blank() {
            continue;
        }

        let shift_raw = field_cell(row, header, ShiftField::Shift)
            .as_text()
            .unwrap_or_default();
        let shift_name = match ShiftName::detect(&shift_raw) {
            Some(name) => name,
            None => {
                diagnostics.push(Diagnostic::at_row(
                    DiagnosticKind::InvalidShiftName,
                    index,
                    format!("班次名无法识别: '{}'，视为工单区开始", shift_raw),
                ));
                section_end = index;
                break;
            }
        };

        let team_raw = field_cell(row, header, ShiftField::Team)
            .as_text()
            .unwrap_or_default();
        let team = match normalize_team(&team_raw) {
            Ok(team) => team,
            Err(raw) => {
                diagnostics.push(Diagnostic::at_row(
                    DiagnosticKind::InvalidTeam,
                    index,
                    format!("班组非法: '{}'，该行丢弃", raw),
                ));
                continue;
            }
        };

        let actual_hours = field_cell(row, header, ShiftField::ActualLineHours).as_number();
        let make_ready_minutes = field_cell(row, header, ShiftField::MakeReady).as_number();
        let other_logged_minutes = field_cell(row, header, ShiftField::OtherLogged).as_number();

        let start_time = normalize_field(row, header, ShiftField::Start, index, &mut diagnostics);
        let end_time = normalize_field(row, header, ShiftField::End, index, &mut diagnostics);

        shifts.push(ShiftRecord {
            start_time,
            end_time,
            shift_name,
            team,
            actual_hours,
            make_ready_minutes,
            other_logged_minutes,
            row_index: index,
        });
    }

    ShiftExtraction {
        shifts,
        diagnostics,
        section_end,
    }
}

/// A 列是否标志工单区开始
pub fn is_work_order_marker(cell: &CellValue) -> bool {
    let label = cell.normalized_label();
    label.contains("works order") || label.contains("work order") || cell.as_integer().is_some()
}

/// 班组归一化
///
/// 1. 去掉前缀 "Team"/"Shift"（大小写不敏感）
/// 2. 末字符为 A/B/C 则取之，否则取首个字母并转大写
/// 3. 结果不在 {A,B,C} 时返回 Err(原始值)
pub fn normalize_team(raw: &str) -> Result<Team, String> {
    let trimmed = raw.trim();
    let mut rest = trimmed;
    for prefix in TEAM_PREFIXES {
        if let Some(head) = rest.get(..prefix.len()) {
            if head.eq_ignore_ascii_case(prefix) {
                rest = rest[prefix.len()..].trim_start();
                break;
            }
        }
    }

    let trailing = rest
        .chars()
        .last()
        .filter(|c| Team::from_letter(*c).is_some());
    let candidate = trailing.or_else(|| rest.chars().find(|c| c.is_alphabetic()));

    candidate
        .and_then(Team::from_letter)
        .ok_or_else(|| trimmed.to_string())
}

fn field_cell<'a>(row: &'a Row, header: &HeaderLocation, field: ShiftField) -> &'a CellValue {
    match header.column(field) {
        Some(col) => row.cell(col),
        None => CellValue::null_ref(),
    }
}

fn normalize_field(
    row: &Row,
    header: &HeaderLocation,
    field: ShiftField,
    index: usize,
    diagnostics: &mut Vec<Diagnostic>,
) -> Option<String> {
    let cell = field_cell(row, header, field);
    let normalized = normalize_time(cell);
    if normalized.is_none() && !cell.is_blank() {
        diagnostics.push(Diagnostic::at_row(
            DiagnosticKind::UnparseableTime,
            index,
            format!("班次 {:?} 时间无法解析: {:?}", field, cell),
        ));
    }
    normalized
}
