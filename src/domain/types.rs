// ==========================================
// 印刷生产日报系统 - 领域类型定义
// ==========================================
// 依据: 班次表结构约定（早/中/夜三班，A/B/C 三个班组）
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 班次名称 (Shift Name)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShiftName {
    Earlies, // 早班
    Lates,   // 中班
    Nights,  // 夜班
}

impl ShiftName {
    pub const ALL: [ShiftName; 3] = [ShiftName::Earlies, ShiftName::Lates, ShiftName::Nights];

    pub fn as_str(&self) -> &'static str {
        match self {
            ShiftName::Earlies => "Earlies",
            ShiftName::Lates => "Lates",
            ShiftName::Nights => "Nights",
        }
    }

    /// 从单元格文本识别班次（大小写不敏感的子串匹配）
    pub fn detect(raw: &str) -> Option<ShiftName> {
        let lower = raw.to_lowercase();
        Self::ALL
            .into_iter()
            .find(|name| lower.contains(&name.as_str().to_lowercase()))
    }
}

impl fmt::Display for ShiftName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// 班组 (Team)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Team {
    A,
    B,
    C,
}

impl Team {
    pub fn from_letter(letter: char) -> Option<Team> {
        match letter.to_ascii_uppercase() {
            'A' => Some(Team::A),
            'B' => Some(Team::B),
            'C' => Some(Team::C),
            _ => None,
        }
    }
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Team::A => write!(f, "A"),
            Team::B => write!(f, "B"),
            Team::C => write!(f, "C"),
        }
    }
}

// ==========================================
// 跨午夜区间重叠口径 (Overlap Mode)
// ==========================================
// LEGACY: 单侧跨午夜取子区间最大值，双侧跨午夜求和
// CIRCULAR: 任意组合均对子区间求和
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OverlapMode {
    #[default]
    Legacy,
    Circular,
}

impl OverlapMode {
    pub fn parse(raw: &str) -> Option<OverlapMode> {
        match raw.trim().to_uppercase().as_str() {
            "LEGACY" => Some(OverlapMode::Legacy),
            "CIRCULAR" => Some(OverlapMode::Circular),
            _ => None,
        }
    }
}

impl fmt::Display for OverlapMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OverlapMode::Legacy => write!(f, "LEGACY"),
            OverlapMode::Circular => write!(f, "CIRCULAR"),
        }
    }
}
