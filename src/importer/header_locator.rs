// ==========================================
// 印刷生产日报系统 - 班次表头定位
// ==========================================
// 规则: 扫描第 2..=11 行（0 基），某行中 7 个期望标签至少命中 4 个
//       （大小写不敏感，标签是任一非空单元格的子串即算命中）即判定为表头，取第一个命中行
// 列映射: 另行计算，每列只归属一个字段；合并表头单元格可能命中多个标签但只映射一次
// ==========================================

use crate::domain::cell::{Column, Grid, Row};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ops::RangeInclusive;

/// 表头扫描窗口（0 基行号，含两端）
pub const HEADER_SCAN_ROWS: RangeInclusive<usize> = 2..=11;

/// 判定为表头所需的最少命中标签数
pub const MIN_HEADER_MATCHES: usize = 4;

// ==========================================
// ShiftField - 班次表字段
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ShiftField {
    Start,
    End,
    Shift,
    Team,
    ActualLineHours,
    MakeReady,
    OtherLogged,
}

/// 期望表头标签 → 字段
pub const SHIFT_HEADER_LABELS: [(&str, ShiftField); 7] = [
    ("Start", ShiftField::Start),
    ("End", ShiftField::End),
    ("Shift", ShiftField::Shift),
    ("Team", ShiftField::Team),
    ("Actual Line Hours", ShiftField::ActualLineHours),
    ("Make Ready", ShiftField::MakeReady),
    ("Other Logged", ShiftField::OtherLogged),
];

// ==========================================
// HeaderLocation - 定位结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderLocation {
    pub row_index: usize,
    pub matched_labels: usize, // 命中标签数（与列映射无关）
    pub columns: BTreeMap<ShiftField, Column>,
}

impl HeaderLocation {
    pub fn column(&self, field: ShiftField) -> Option<Column> {
        self.columns.get(&field).copied()
    }

    pub fn matched_count(&self) -> usize {
        self.matched_labels
    }
}

/// 在网格中定位班次表头
pub fn locate_header(grid: &Grid) -> Option<HeaderLocation> {
    HEADER_SCAN_ROWS
        .filter_map(|index| grid.row(index).map(|row| (index, row)))
        .find_map(|(index, row)| {
            let texts = lowercase_texts(row);
            let matched_labels = count_matched_labels(&texts);
            if matched_labels >= MIN_HEADER_MATCHES {
                Some(HeaderLocation {
                    row_index: index,
                    matched_labels,
                    columns: match_header_columns(&texts),
                })
            } else {
                None
            }
        })
}

fn lowercase_texts(row: &Row) -> Vec<(Column, String)> {
    row.cells()
        .filter_map(|(col, value)| value.as_text().map(|t| (col, t.to_lowercase())))
        .collect()
}

/// 命中的标签数：标签出现在任一非空单元格中即计 1
fn count_matched_labels(texts: &[(Column, String)]) -> usize {
    SHIFT_HEADER_LABELS
        .iter()
        .filter(|(label, _)| {
            let needle = label.to_lowercase();
            texts.iter().any(|(_, text)| text.contains(&needle))
        })
        .count()
}

/// 按标签表顺序为每个字段匹配列（每列只归属一个字段）
fn match_header_columns(texts: &[(Column, String)]) -> BTreeMap<ShiftField, Column> {
    let mut columns = BTreeMap::new();
    for (label, field) in SHIFT_HEADER_LABELS {
        let needle = label.to_lowercase();
        let claimed: Vec<Column> = columns.values().copied().collect();
        if let Some((col, _)) = texts
            .iter()
            .find(|(col, text)| !claimed.contains(col) && text.contains(&needle))
        {
            columns.insert(field, *col);
        }
    }
    columns
}
