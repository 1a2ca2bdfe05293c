// ==========================================
// 印刷生产日报系统 - 解析诊断
// ==========================================
// 职责: 逐行异常的结构化记录（随报告返回，不走日志旁路）
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// DiagnosticKind - 诊断类型
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiagnosticKind {
    NoHeaderFound,    // 未找到班次表头，班次列表为空
    UnparseableTime,  // 时间单元格无法解析，字段置空
    InvalidTeam,      // 班组非法，该行丢弃
    InvalidShiftName, // 班次名非法，视为工单区开始
    MissingAnchor,    // 工单无 Production 锚点行，跳过事件扫描
}

impl DiagnosticKind {
    pub fn level(&self) -> DiagnosticLevel {
        match self {
            DiagnosticKind::InvalidShiftName => DiagnosticLevel::Info,
            DiagnosticKind::NoHeaderFound
            | DiagnosticKind::UnparseableTime
            | DiagnosticKind::InvalidTeam
            | DiagnosticKind::MissingAnchor => DiagnosticLevel::Warning,
        }
    }
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticKind::NoHeaderFound => write!(f, "NO_HEADER_FOUND"),
            DiagnosticKind::UnparseableTime => write!(f, "UNPARSEABLE_TIME"),
            DiagnosticKind::InvalidTeam => write!(f, "INVALID_TEAM"),
            DiagnosticKind::InvalidShiftName => write!(f, "INVALID_SHIFT_NAME"),
            DiagnosticKind::MissingAnchor => write!(f, "MISSING_ANCHOR"),
        }
    }
}

// ==========================================
// DiagnosticLevel - 诊断级别
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiagnosticLevel {
    Warning, // 数据缺失或被丢弃
    Info,    // 结构识别提示
}

impl fmt::Display for DiagnosticLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticLevel::Warning => write!(f, "WARNING"),
            DiagnosticLevel::Info => write!(f, "INFO"),
        }
    }
}

// ==========================================
// Diagnostic - 单条诊断
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub level: DiagnosticLevel,
    pub row_index: Option<usize>, // 网格行号（0 基），表级诊断为 None
    pub message: String,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, row_index: Option<usize>, message: impl Into<String>) -> Self {
        Self {
            kind,
            level: kind.level(),
            row_index,
            message: message.into(),
        }
    }

    pub fn at_row(kind: DiagnosticKind, row_index: usize, message: impl Into<String>) -> Self {
        Self::new(kind, Some(row_index), message)
    }
}

// ==========================================
// DiagnosticSummary - 诊断汇总
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosticSummary {
    pub total: usize,
    pub warning: usize,
    pub info: usize,
}

impl DiagnosticSummary {
    pub fn from_diagnostics(diagnostics: &[Diagnostic]) -> Self {
        let warning = diagnostics
            .iter()
            .filter(|d| matches!(d.level, DiagnosticLevel::Warning))
            .count();
        let info = diagnostics
            .iter()
            .filter(|d| matches!(d.level, DiagnosticLevel::Info))
            .count();

        Self {
            total: diagnostics.len(),
            warning,
            info,
        }
    }
}
