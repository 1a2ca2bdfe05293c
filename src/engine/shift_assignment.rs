// ==========================================
// 印刷生产日报系统 - 班次分配引擎
// ==========================================
// 职责: 按生产区间与班次区间在 1440 分钟时钟上的重叠量分配班次
// 规则:
//   - 取重叠最大的班次；并列取输入顺序靠前者
//   - 无正重叠或任一时间缺失 → 不分配
// 重叠计算（end < start 视为跨午夜）:
//   - 均不跨午夜: max(0, min(e1,e2) - max(s1,s2))
//   - 仅一方跨午夜: 拆为 [s,1440) 与 [0,e)，Legacy 取两者最大值，Circular 求和
//   - 双方跨午夜: Legacy 为 late/late + early/early 之和，Circular 另计交叉段
// ==========================================

use crate::domain::report::{ShiftRecord, TimeInterval};
use crate::domain::types::OverlapMode;
use crate::importer::time_normalizer::{minutes_since_midnight, MINUTES_PER_DAY};

// ==========================================
// ClockInterval - 时钟区间（午夜起算分钟）
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockInterval {
    pub start: u32,
    pub end: u32,
}

impl ClockInterval {
    pub fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    /// 从 "HH:MM" 区间构造（任一端缺失或非法返回 None）
    pub fn from_interval(interval: &TimeInterval) -> Option<Self> {
        let start = minutes_since_midnight(interval.start.as_deref()?)?;
        let end = minutes_since_midnight(interval.end.as_deref()?)?;
        Some(Self::new(start, end))
    }

    pub fn wraps(&self) -> bool {
        self.end < self.start
    }

    // 跨午夜区间拆分: 晚段 [start,1440)、早段 [0,end)
    fn late(&self) -> (u32, u32) {
        (self.start, MINUTES_PER_DAY)
    }

    fn early(&self) -> (u32, u32) {
        (0, self.end)
    }

    fn span(&self) -> (u32, u32) {
        (self.start, self.end)
    }
}

/// 线性区间重叠
fn linear_overlap(a: (u32, u32), b: (u32, u32)) -> u32 {
    a.1.min(b.1).saturating_sub(a.0.max(b.0))
}

/// 两个时钟区间的重叠分钟数
pub fn overlap_minutes(a: ClockInterval, b: ClockInterval, mode: OverlapMode) -> u32 {
    match (a.wraps(), b.wraps()) {
        (false, false) => linear_overlap(a.span(), b.span()),
        (true, false) => single_wrap_overlap(a, b, mode),
        (false, true) => single_wrap_overlap(b, a, mode),
        (true, true) => {
            let paired = linear_overlap(a.late(), b.late()) + linear_overlap(a.early(), b.early());
            match mode {
                OverlapMode::Legacy => paired,
                OverlapMode::Circular => {
                    paired
                        + linear_overlap(a.late(), b.early())
                        + linear_overlap(a.early(), b.late())
                }
            }
        }
    }
}

fn single_wrap_overlap(wrapping: ClockInterval, plain: ClockInterval, mode: OverlapMode) -> u32 {
    let late = linear_overlap(wrapping.late(), plain.span());
    let early = linear_overlap(wrapping.early(), plain.span());
    match mode {
        OverlapMode::Legacy => late.max(early),
        OverlapMode::Circular => late + early,
    }
}

// ==========================================
// ShiftAssignment - 分配结果
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShiftAssignment {
    pub shift_index: usize,
    pub overlap_minutes: u32,
}

// ==========================================
// ShiftAssignmentEngine - 班次分配引擎
// ==========================================
#[derive(Debug, Clone, Copy, Default)]
pub struct ShiftAssignmentEngine {
    mode: OverlapMode,
}

impl ShiftAssignmentEngine {
    pub fn new(mode: OverlapMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> OverlapMode {
        self.mode
    }

    /// 为生产区间选择重叠最大的班次
    ///
    /// # 参数
    /// - `production`: 工单生产区间
    /// - `shifts`: 班次列表（输入顺序即并列时的优先级）
    ///
    /// # 返回
    /// 命中的班次序号与重叠分钟；无正重叠时返回 None
    pub fn assign(
        &self,
        production: &TimeInterval,
        shifts: &[ShiftRecord],
    ) -> Option<ShiftAssignment> {
        let production = ClockInterval::from_interval(production)?;

        let mut best: Option<ShiftAssignment> = None;
        for (index, shift) in shifts.iter().enumerate() {
            let interval = TimeInterval::new(shift.start_time.clone(), shift.end_time.clone());
            let Some(clock) = ClockInterval::from_interval(&interval) else {
                continue;
            };

            let overlap = overlap_minutes(production, clock, self.mode);
            if overlap == 0 {
                continue;
            }
            // 严格大于，保证并列时取靠前者
            if best.map_or(true, |b| overlap > b.overlap_minutes) {
                best = Some(ShiftAssignment {
                    shift_index: index,
                    overlap_minutes: overlap,
                });
            }
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::{ShiftName, Team};

    fn clock(start: &str, end: &str) -> ClockInterval {
        ClockInterval::from_interval(&interval(start, end)).unwrap()
    }

    fn interval(start: &str, end: &str) -> TimeInterval {
        TimeInterval::new(Some(start.to_string()), Some(end.to_string()))
    }

    fn shift(start: &str, end: &str, name: ShiftName, team: Team) -> ShiftRecord {
        ShiftRecord {
            start_time: Some(start.to_string()),
            end_time: Some(end.to_string()),
            shift_name: name,
            team,
            actual_hours: None,
            make_ready_minutes: None,
            other_logged_minutes: None,
            row_index: 0,
        }
    }

    fn standard_shifts() -> Vec<ShiftRecord> {
        vec![
            shift("06:00", "14:00", ShiftName::Earlies, Team::A),
            shift("14:00", "22:00", ShiftName::Lates, Team::B),
            shift("22:00", "06:00", ShiftName::Nights, Team::C),
        ]
    }

    #[test]
    fn test_linear_overlap() {
        let mode = OverlapMode::Legacy;
        assert_eq!(overlap_minutes(clock("07:00", "12:00"), clock("06:00", "14:00"), mode), 300);
        assert_eq!(overlap_minutes(clock("07:00", "12:00"), clock("14:00", "22:00"), mode), 0);
        assert_eq!(overlap_minutes(clock("13:00", "15:00"), clock("14:00", "22:00"), mode), 60);
    }

    #[test]
    fn test_single_wrap_legacy_takes_max() {
        // 22:00-06:00 对 05:00-23:00: 晚段 60，早段 60
        let nights = clock("22:00", "06:00");
        let day = clock("05:00", "23:00");
        assert_eq!(overlap_minutes(nights, day, OverlapMode::Legacy), 60);
        assert_eq!(overlap_minutes(nights, day, OverlapMode::Circular), 120);
    }

    #[test]
    fn test_both_wrap() {
        let a = clock("23:00", "05:00");
        let b = clock("22:00", "06:00");
        assert_eq!(overlap_minutes(a, b, OverlapMode::Legacy), 360);
        assert_eq!(overlap_minutes(a, b, OverlapMode::Circular), 360);

        // 交叉段仅在 Circular 中计入
        let c = clock("02:00", "01:00");
        let d = clock("23:00", "03:00");
        assert_eq!(overlap_minutes(c, d, OverlapMode::Legacy), 120);
        assert_eq!(overlap_minutes(c, d, OverlapMode::Circular), 180);
    }

    #[test]
    fn test_overlap_symmetry() {
        let samples = [
            clock("06:00", "14:00"),
            clock("22:00", "06:00"),
            clock("23:00", "05:00"),
            clock("05:00", "23:00"),
            clock("13:30", "13:45"),
            clock("02:00", "01:00"),
        ];
        for mode in [OverlapMode::Legacy, OverlapMode::Circular] {
            for a in samples {
                for b in samples {
                    assert_eq!(overlap_minutes(a, b, mode), overlap_minutes(b, a, mode));
                }
            }
        }
    }

    #[test]
    fn test_contained_interval_overlap_is_its_length() {
        let outer = clock("06:00", "14:00");
        let inner = clock("08:15", "09:45");
        assert_eq!(overlap_minutes(inner, outer, OverlapMode::Legacy), 90);

        let outer_wrap = clock("22:00", "06:00");
        let inner_wrap = clock("23:00", "01:00");
        assert_eq!(overlap_minutes(inner_wrap, outer_wrap, OverlapMode::Legacy), 120);
    }

    #[test]
    fn test_assign_day_run_to_earlies() {
        let engine = ShiftAssignmentEngine::default();
        let result = engine.assign(&interval("07:00", "12:00"), &standard_shifts());
        assert_eq!(
            result,
            Some(ShiftAssignment {
                shift_index: 0,
                overlap_minutes: 300
            })
        );
    }

    #[test]
    fn test_assign_overnight_run_to_nights() {
        let engine = ShiftAssignmentEngine::default();
        let shifts = standard_shifts();
        let result = engine.assign(&interval("23:00", "05:00"), &shifts).unwrap();
        assert_eq!(shifts[result.shift_index].shift_name, ShiftName::Nights);
        assert_eq!(shifts[result.shift_index].team, Team::C);
        assert_eq!(result.overlap_minutes, 360);
    }

    #[test]
    fn test_tie_goes_to_first_shift() {
        let engine = ShiftAssignmentEngine::default();
        let result = engine.assign(&interval("13:00", "15:00"), &standard_shifts()).unwrap();
        assert_eq!(result.shift_index, 0);
        assert_eq!(result.overlap_minutes, 60);
    }

    #[test]
    fn test_no_assignment_without_times_or_overlap() {
        let engine = ShiftAssignmentEngine::default();
        let shifts = standard_shifts();
        assert_eq!(engine.assign(&TimeInterval::default(), &shifts), None);
        assert_eq!(
            engine.assign(&TimeInterval::new(Some("07:00".to_string()), None), &shifts),
            None
        );
        assert_eq!(engine.assign(&interval("07:00", "12:00"), &[]), None);

        let partial = vec![shift("06:00", "07:00", ShiftName::Earlies, Team::A)];
        assert_eq!(engine.assign(&interval("08:00", "09:00"), &partial), None);
    }

    #[test]
    fn test_shift_with_missing_time_skipped() {
        let engine = ShiftAssignmentEngine::default();
        let mut shifts = standard_shifts();
        shifts[0].start_time = None;
        let result = engine.assign(&interval("07:00", "15:00"), &shifts).unwrap();
        assert_eq!(result.shift_index, 1);
    }
}
