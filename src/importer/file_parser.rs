// ==========================================
// 印刷生产日报系统 - 文件解析器实现
// ==========================================
// 职责: 外部表格文件 → Grid（行号 = 工作表 0 基行号，列号 = 工作表列）
// 支持: Excel (.xlsx/.xlsm/.xls/.xlsb) / CSV (.csv)
// ==========================================

use crate::domain::cell::{CellValue, Column, Grid, Row};
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::report_importer_trait::FileParser;
use calamine::{open_workbook_auto, Data, Reader};
use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use csv::{ReaderBuilder, StringRecord};
use std::path::Path;
use tracing::debug;

const EXCEL_EXTENSIONS: [&str; 4] = ["xlsx", "xlsm", "xls", "xlsb"];

fn ensure_exists(path: &Path) -> ImportResult<()> {
    if path.exists() {
        Ok(())
    } else {
        Err(ImportError::FileNotFound(path.display().to_string()))
    }
}

fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase()
}

// ==========================================
// CSV Parser 实现
// ==========================================
pub struct CsvParser;

impl CsvParser {
    fn convert_field(raw: &str) -> CellValue {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return CellValue::Null;
        }
        match trimmed.parse::<f64>() {
            Ok(n) if n.is_finite() => CellValue::Number(n),
            _ => CellValue::Text(raw.to_string()),
        }
    }

    /// 解码单条逻辑记录；空文本得到空行
    fn decode_record(text: &str) -> ImportResult<Row> {
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(text.as_bytes());

        let mut record = StringRecord::new();
        let mut row = Row::new();
        if reader.read_record(&mut record)? {
            for (col_idx, value) in record.iter().enumerate() {
                row.set(Column(col_idx as u32), Self::convert_field(value));
            }
        }
        Ok(row)
    }
}

/// 按物理行切分逻辑记录
///
/// 引号未闭合时与下一行合并（单元格内换行），空行保留为空记录。
/// csv 读取器会吞掉空行，所以这里自行切分，保证行号 = 工作表行号。
fn split_logical_records(content: &str) -> Vec<String> {
    let mut records = Vec::new();
    let mut pending = String::new();
    let mut open_quote = false;

    for line in content.lines() {
        if open_quote {
            pending.push('\n');
        }
        pending.push_str(line);
        if line.matches('"').count() % 2 == 1 {
            open_quote = !open_quote;
        }
        if !open_quote {
            records.push(std::mem::take(&mut pending));
        }
    }
    if open_quote {
        records.push(pending);
    }
    records
}

impl FileParser for CsvParser {
    fn parse_to_grid(&self, file_path: &Path) -> ImportResult<Grid> {
        ensure_exists(file_path)?;

        let ext = extension_of(file_path);
        if ext != "csv" {
            return Err(ImportError::UnsupportedFormat(ext));
        }

        let content = std::fs::read_to_string(file_path)?;
        let content = content.trim_start_matches('\u{feff}');

        let rows = split_logical_records(content)
            .iter()
            .map(|text| Self::decode_record(text))
            .collect::<ImportResult<Vec<Row>>>()?;

        debug!(path = %file_path.display(), rows = rows.len(), "CSV 加载完成");
        Ok(Grid::new(rows))
    }
}

// ==========================================
// Excel Parser 实现
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct ExcelParser {
    sheet_name: Option<String>, // None = 第一个工作表
}

impl ExcelParser {
    pub fn new(sheet_name: Option<String>) -> Self {
        Self { sheet_name }
    }

    fn convert_cell(cell: &Data) -> CellValue {
        match cell {
            Data::Empty | Data::Error(_) => CellValue::Null,
            Data::Int(i) => CellValue::Number(*i as f64),
            Data::Float(f) => CellValue::Number(*f),
            Data::String(s) => CellValue::Text(s.clone()),
            Data::Bool(b) => CellValue::Text(if *b { "TRUE" } else { "FALSE" }.to_string()),
            Data::DateTime(dt) => excel_serial_to_datetime(dt.as_f64())
                .map(CellValue::DateTime)
                .unwrap_or(CellValue::Number(dt.as_f64())),
            Data::DateTimeIso(s) => parse_iso_datetime(s)
                .map(CellValue::DateTime)
                .unwrap_or_else(|| CellValue::Text(s.clone())),
            Data::DurationIso(s) => CellValue::Text(s.clone()),
        }
    }
}

/// Excel 序列值（1899-12-30 起算的天数）→ 日期时间，四舍五入到秒
pub fn excel_serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    let seconds = (serial * 86_400.0).round() as i64;
    epoch.checked_add_signed(TimeDelta::try_seconds(seconds)?)
}

fn parse_iso_datetime(raw: &str) -> Option<NaiveDateTime> {
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw.trim(), fmt).ok())
}

impl FileParser for ExcelParser {
    fn parse_to_grid(&self, file_path: &Path) -> ImportResult<Grid> {
        ensure_exists(file_path)?;

        let ext = extension_of(file_path);
        if !EXCEL_EXTENSIONS.contains(&ext.as_str()) {
            return Err(ImportError::UnsupportedFormat(ext));
        }

        let mut workbook = open_workbook_auto(file_path)?;

        let sheet_names = workbook.sheet_names();
        let sheet_name = match &self.sheet_name {
            Some(name) => {
                if !sheet_names.iter().any(|s| s == name) {
                    return Err(ImportError::SheetNotFound(name.clone()));
                }
                name.clone()
            }
            None => sheet_names.first().cloned().ok_or_else(|| {
                ImportError::ExcelParseError("Excel 文件无工作表".to_string())
            })?,
        };

        let range = workbook.worksheet_range(&sheet_name)?;

        // 保留已用区域的行列偏移
        let (row_offset, col_offset) = range.start().unwrap_or((0, 0));
        let mut rows: Vec<Row> = (0..row_offset).map(|_| Row::new()).collect();
        for data_row in range.rows() {
            let mut row = Row::new();
            for (col_idx, cell) in data_row.iter().enumerate() {
                row.set(Column(col_offset + col_idx as u32), Self::convert_cell(cell));
            }
            rows.push(row);
        }

        debug!(
            path = %file_path.display(),
            sheet = %sheet_name,
            rows = rows.len(),
            "Excel 加载完成"
        );
        Ok(Grid::new(rows))
    }
}

// ==========================================
// 通用文件解析器（根据扩展名自动选择）
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct UniversalFileParser {
    sheet_name: Option<String>,
}

impl UniversalFileParser {
    pub fn new(sheet_name: Option<String>) -> Self {
        Self { sheet_name }
    }
}

impl FileParser for UniversalFileParser {
    fn parse_to_grid(&self, file_path: &Path) -> ImportResult<Grid> {
        ensure_exists(file_path)?;

        let ext = extension_of(file_path);
        match ext.as_str() {
            "csv" => CsvParser.parse_to_grid(file_path),
            e if EXCEL_EXTENSIONS.contains(&e) => {
                ExcelParser::new(self.sheet_name.clone()).parse_to_grid(file_path)
            }
            _ => Err(ImportError::UnsupportedFormat(ext)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::Builder;

    fn csv_file(lines: &[&str]) -> tempfile::NamedTempFile {
        let mut temp_file = Builder::new().suffix(".csv").tempfile().unwrap();
        for line in lines {
            writeln!(temp_file, "{}", line).unwrap();
        }
        temp_file
    }

    #[test]
    fn test_csv_parser_maps_cells() {
        let temp_file = csv_file(&["Press 4,,", "4501,12000,06:40", " , 2.5 ,Production"]);
        let grid = CsvParser.parse_to_grid(temp_file.path()).unwrap();

        assert_eq!(grid.len(), 3);
        assert_eq!(grid.cell(0, Column(0)), &CellValue::from("Press 4"));
        assert_eq!(grid.cell(0, Column(1)), &CellValue::Null);
        assert_eq!(grid.cell(1, Column(0)).as_integer(), Some(4501));
        assert_eq!(grid.cell(1, Column(2)), &CellValue::from("06:40"));
        assert_eq!(grid.cell(2, Column(0)), &CellValue::Null);
        assert_eq!(grid.cell(2, Column(1)), &CellValue::Number(2.5));
    }

    #[test]
    fn test_csv_blank_lines_keep_row_numbers() {
        let temp_file = csv_file(&["first", "", "third"]);
        let grid = CsvParser.parse_to_grid(temp_file.path()).unwrap();
        assert_eq!(grid.len(), 3);
        assert!(grid.row(1).unwrap().is_blank());
        assert_eq!(grid.cell(2, Column(0)), &CellValue::from("third"));
    }

    #[test]
    fn test_csv_blank_lines_before_header_keep_header_row() {
        let temp_file = csv_file(&[
            "Press 2",
            "",
            "Start,End,Shift,Team,Actual Line Hours",
            "06:00,14:00,Earlies,A,8",
            "",
            "",
            "Works Order",
        ]);
        let grid = CsvParser.parse_to_grid(temp_file.path()).unwrap();

        assert_eq!(grid.len(), 7);
        assert_eq!(grid.cell(2, Column(0)), &CellValue::from("Start"));
        assert_eq!(grid.cell(3, Column(2)), &CellValue::from("Earlies"));
        assert!(grid.row(4).unwrap().is_blank());
        assert!(grid.row(5).unwrap().is_blank());
        assert_eq!(grid.cell(6, Column(0)), &CellValue::from("Works Order"));
    }

    #[test]
    fn test_csv_quoted_newline_stays_in_one_row() {
        let temp_file = csv_file(&["\"Wash up", "and re-ink\",10", "", "next"]);
        let grid = CsvParser.parse_to_grid(temp_file.path()).unwrap();

        assert_eq!(grid.len(), 3);
        assert_eq!(grid.cell(0, Column(0)), &CellValue::from("Wash up\nand re-ink"));
        assert_eq!(grid.cell(0, Column(1)), &CellValue::Number(10.0));
        assert!(grid.row(1).unwrap().is_blank());
        assert_eq!(grid.cell(2, Column(0)), &CellValue::from("next"));
    }

    #[test]
    fn test_split_logical_records() {
        let records = split_logical_records("a,b\r\n\r\n\"x\ny\",1\nz");
        assert_eq!(records, vec!["a,b", "", "\"x\ny\",1", "z"]);
    }

    #[test]
    fn test_csv_parser_file_not_found() {
        let result = CsvParser.parse_to_grid(Path::new("non_existent.csv"));
        assert!(matches!(result, Err(ImportError::FileNotFound(_))));
    }

    #[test]
    fn test_universal_parser_rejects_unknown_extension() {
        let temp_file = Builder::new().suffix(".txt").tempfile().unwrap();
        let result = UniversalFileParser::default().parse_to_grid(temp_file.path());
        assert!(matches!(result, Err(ImportError::UnsupportedFormat(ext)) if ext == "txt"));
    }

    #[test]
    fn test_excel_serial_conversion() {
        let dt = excel_serial_to_datetime(45355.25).unwrap();
        assert_eq!(dt.to_string(), "2024-03-04 06:00:00");

        let time_only = excel_serial_to_datetime(0.2916666666).unwrap();
        assert_eq!(time_only.format("%H:%M:%S").to_string(), "07:00:00");
    }

    #[test]
    fn test_excel_cell_mapping() {
        assert_eq!(ExcelParser::convert_cell(&Data::Empty), CellValue::Null);
        assert_eq!(ExcelParser::convert_cell(&Data::Int(7)), CellValue::Number(7.0));
        assert_eq!(
            ExcelParser::convert_cell(&Data::Bool(true)),
            CellValue::from("TRUE")
        );
        assert_eq!(
            ExcelParser::convert_cell(&Data::DateTimeIso("2024-03-04T22:15:00".to_string()))
                .as_text(),
            Some("2024-03-04 22:15:00".to_string())
        );
        assert_eq!(
            ExcelParser::convert_cell(&Data::DateTimeIso("22:15:00".to_string())),
            CellValue::from("22:15:00")
        );
    }
}
