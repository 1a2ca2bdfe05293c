// ==========================================
// 印刷生产日报系统 - 时间归一化
// ==========================================
// 职责: 单元格 → "HH:MM"（纯函数，无副作用）
// 优先级: DateTime → [0,1) 日小数 → HH:MM[:SS] 文本 → None
// ==========================================

use crate::domain::cell::CellValue;
use chrono::Timelike;
use regex::Regex;
use std::sync::LazyLock;

/// 一天的分钟数
pub const MINUTES_PER_DAY: u32 = 1440;

// 日小数换算分钟时吸收二进制浮点误差（如 7/24 × 1440 = 419.999...）
const SERIAL_EPSILON_MINUTES: f64 = 1e-6;

static STRICT_TIME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{1,2}):(\d{2})(?::(\d{2}))?$").expect("valid time pattern")
});

// 冒号分隔的数字片段（如 "14:20:00"、"1:2:3:4"）
static COLON_GROUP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+(?::\d+)+").expect("valid colon group pattern"));

/// 将单元格归一化为 "HH:MM"
pub fn normalize_time(cell: &CellValue) -> Option<String> {
    match cell {
        CellValue::DateTime(dt) => Some(format_hh_mm(dt.hour(), dt.minute())),
        CellValue::Number(n) => from_day_fraction(*n),
        CellValue::Text(s) => from_text(s),
        CellValue::Null => None,
    }
}

/// "HH:MM" → 午夜起算分钟数
pub fn minutes_since_midnight(hh_mm: &str) -> Option<u32> {
    let caps = STRICT_TIME.captures(hh_mm.trim())?;
    let hour: u32 = caps.get(1)?.as_str().parse().ok()?;
    let minute: u32 = caps.get(2)?.as_str().parse().ok()?;
    if hour >= 24 || minute >= 60 {
        return None;
    }
    Some(hour * 60 + minute)
}

/// 分钟数 → "HH:MM"（超过一天取模）
pub fn format_minutes(minutes: u32) -> String {
    let m = minutes % MINUTES_PER_DAY;
    format_hh_mm(m / 60, m % 60)
}

/// 区间时长（分钟），end < start 视为跨午夜
pub fn interval_minutes(start: &str, end: &str) -> Option<u32> {
    let s = minutes_since_midnight(start)?;
    let e = minutes_since_midnight(end)?;
    if e >= s {
        Some(e - s)
    } else {
        Some(MINUTES_PER_DAY - s + e)
    }
}

fn format_hh_mm(hour: u32, minute: u32) -> String {
    format!("{:02}:{:02}", hour, minute)
}

fn from_day_fraction(value: f64) -> Option<String> {
    if !value.is_finite() || !(0.0..1.0).contains(&value) {
        return None;
    }
    let minutes = (value * MINUTES_PER_DAY as f64 + SERIAL_EPSILON_MINUTES).floor() as u32;
    Some(format_minutes(minutes.min(MINUTES_PER_DAY - 1)))
}

fn from_text(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Some(caps) = STRICT_TIME.captures(trimmed) {
        return build_time(caps.get(1)?.as_str(), caps.get(2)?.as_str());
    }

    // 含日期/星期的长文本: 仅当恰好一个冒号片段且其为 HH:MM[:SS] 时采用，多个视为歧义
    let mut groups = COLON_GROUP.find_iter(trimmed);
    let only = groups.next()?;
    if groups.next().is_some() {
        return None;
    }
    let caps = STRICT_TIME.captures(only.as_str())?;
    build_time(caps.get(1)?.as_str(), caps.get(2)?.as_str())
}

fn build_time(hour: &str, minute: &str) -> Option<String> {
    let hour: u32 = hour.parse().ok()?;
    let minute: u32 = minute.parse().ok()?;
    if hour >= 24 || minute >= 60 {
        return None;
    }
    Some(format_hh_mm(hour, minute))
}
