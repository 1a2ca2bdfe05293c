// ==========================================
// 印刷生产日报系统 - 单元格网格模型
// ==========================================
// 用途: 外部表格解码器的输出抽象（行 → 列字母 → 单元格值）
// 红线: 网格加载后不可变，解析阶段只读
// ==========================================

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// ==========================================
// CellValue - 单元格值
// ==========================================
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CellValue {
    #[default]
    Null,
    Number(f64),
    Text(String),
    DateTime(NaiveDateTime),
}

static NULL_CELL: CellValue = CellValue::Null;

impl CellValue {
    /// 共享的 Null 引用（缺失单元格统一返回）
    pub fn null_ref() -> &'static CellValue {
        &NULL_CELL
    }

    /// 是否为空（Null 或仅含空白的文本）
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Null => true,
            CellValue::Text(s) => s.trim().is_empty(),
            CellValue::Number(_) | CellValue::DateTime(_) => false,
        }
    }

    /// 解析为数值
    ///
    /// - Number: 有限值原样返回
    /// - Text: TRIM 后按浮点数解析
    /// - Null / DateTime: None
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) if n.is_finite() => Some(*n),
            CellValue::Number(_) => None,
            CellValue::Text(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
            CellValue::Null | CellValue::DateTime(_) => None,
        }
    }

    /// 解析为整数（仅接受整值数字或纯整数文本）
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            CellValue::Number(n) if n.is_finite() && n.fract() == 0.0 => Some(*n as i64),
            CellValue::Number(_) => None,
            CellValue::Text(s) => {
                let trimmed = s.trim();
                trimmed.parse::<i64>().ok().or_else(|| {
                    trimmed
                        .parse::<f64>()
                        .ok()
                        .filter(|n| n.is_finite() && n.fract() == 0.0)
                        .map(|n| n as i64)
                })
            }
            CellValue::Null | CellValue::DateTime(_) => None,
        }
    }

    /// 转为 TRIM 后的非空文本
    pub fn as_text(&self) -> Option<String> {
        match self {
            CellValue::Null => None,
            CellValue::Text(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    Some(trimmed.to_string())
                }
            }
            CellValue::Number(n) => Some(format_number(*n)),
            CellValue::DateTime(dt) => Some(dt.format("%Y-%m-%d %H:%M:%S").to_string()),
        }
    }

    /// 转为小写文本（空值返回空字符串），用于标签匹配
    pub fn normalized_label(&self) -> String {
        self.as_text().unwrap_or_default().to_lowercase()
    }
}

fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        CellValue::Number(value as f64)
    }
}

impl From<i32> for CellValue {
    fn from(value: i32) -> Self {
        CellValue::Number(value as f64)
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl From<NaiveDateTime> for CellValue {
    fn from(value: NaiveDateTime) -> Self {
        CellValue::DateTime(value)
    }
}

// ==========================================
// Column - 列引用（0 基序号，按字母显示）
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Column(pub u32);

impl Column {
    /// 从列字母解析（"A" → 0, "Z" → 25, "AA" → 26）
    pub fn from_letters(letters: &str) -> Option<Column> {
        let trimmed = letters.trim();
        if trimmed.is_empty() {
            return None;
        }

        let mut index: u32 = 0;
        for ch in trimmed.chars() {
            if !ch.is_ascii_alphabetic() {
                return None;
            }
            let digit = (ch.to_ascii_uppercase() as u32) - ('A' as u32) + 1;
            index = index.checked_mul(26)?.checked_add(digit)?;
        }
        Some(Column(index - 1))
    }

    /// 列字母
    pub fn letters(&self) -> String {
        let mut n = self.0 + 1;
        let mut out = Vec::new();
        while n > 0 {
            let rem = (n - 1) % 26;
            out.push((b'A' + rem as u8) as char);
            n = (n - 1) / 26;
        }
        out.iter().rev().collect()
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letters())
    }
}

// ==========================================
// Row - 一行单元格
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Row {
    cells: BTreeMap<Column, CellValue>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// 链式设置单元格（列字母非法时忽略）
    pub fn with(mut self, letters: &str, value: impl Into<CellValue>) -> Self {
        if let Some(col) = Column::from_letters(letters) {
            self.set(col, value.into());
        }
        self
    }

    pub fn set(&mut self, col: Column, value: CellValue) {
        if matches!(value, CellValue::Null) {
            self.cells.remove(&col);
        } else {
            self.cells.insert(col, value);
        }
    }

    /// 读取单元格，缺失时返回 Null
    pub fn cell(&self, col: Column) -> &CellValue {
        self.cells.get(&col).unwrap_or(&NULL_CELL)
    }

    /// 按列顺序遍历非缺失单元格
    pub fn cells(&self) -> impl Iterator<Item = (Column, &CellValue)> {
        self.cells.iter().map(|(c, v)| (*c, v))
    }

    /// 整行是否空白
    pub fn is_blank(&self) -> bool {
        self.cells.values().all(CellValue::is_blank)
    }
}

// ==========================================
// Grid - 工作表快照
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Grid {
    rows: Vec<Row>,
}

impl Grid {
    pub fn new(rows: Vec<Row>) -> Self {
        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row(&self, index: usize) -> Option<&Row> {
        self.rows.get(index)
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// 读取指定行列的单元格，越界返回 Null
    pub fn cell(&self, index: usize, col: Column) -> &CellValue {
        self.rows.get(index).map(|r| r.cell(col)).unwrap_or(&NULL_CELL)
    }
}

impl From<Vec<Row>> for Grid {
    fn from(rows: Vec<Row>) -> Self {
        Grid::new(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_letters_roundtrip() {
        assert_eq!(Column::from_letters("A"), Some(Column(0)));
        assert_eq!(Column::from_letters("q"), Some(Column(16)));
        assert_eq!(Column::from_letters("AA"), Some(Column(26)));
        assert_eq!(Column(27).letters(), "AB");
        assert_eq!(Column(25).to_string(), "Z");
        assert_eq!(Column::from_letters("A1"), None);
        assert_eq!(Column::from_letters(""), None);
    }

    #[test]
    fn test_row_ordering_follows_columns() {
        let row = Row::new().with("AA", "late").with("B", 2.0).with("A", "first");
        let cols: Vec<String> = row.cells().map(|(c, _)| c.letters()).collect();
        assert_eq!(cols, vec!["A", "B", "AA"]);
    }

    #[test]
    fn test_cell_number_parsing() {
        assert_eq!(CellValue::from(3.5).as_number(), Some(3.5));
        assert_eq!(CellValue::from(" 42 ").as_number(), Some(42.0));
        assert_eq!(CellValue::from("n/a").as_number(), None);
        assert_eq!(CellValue::Null.as_number(), None);
        assert_eq!(CellValue::Number(f64::NAN).as_number(), None);
    }

    #[test]
    fn test_cell_integer_parsing() {
        assert_eq!(CellValue::from(0).as_integer(), Some(0));
        assert_eq!(CellValue::from("1203").as_integer(), Some(1203));
        assert_eq!(CellValue::from("17.0").as_integer(), Some(17));
        assert_eq!(CellValue::from(0.25).as_integer(), None);
        assert_eq!(CellValue::from("Works Order").as_integer(), None);
    }

    #[test]
    fn test_blank_detection() {
        assert!(Row::new().with("A", "   ").is_blank());
        assert!(!Row::new().with("C", 0).is_blank());
        assert_eq!(CellValue::from(12.0).as_text(), Some("12".to_string()));
    }

    #[test]
    fn test_grid_out_of_range_is_null() {
        let grid = Grid::new(vec![Row::new().with("A", 1)]);
        assert_eq!(grid.cell(0, Column(0)), &CellValue::Number(1.0));
        assert_eq!(grid.cell(5, Column(0)), &CellValue::Null);
    }
}
