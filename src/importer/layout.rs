// ==========================================
// 印刷生产日报系统 - 固定列约定
// ==========================================
// 依据: 日报导出格式（列位置不可在运行时调整）
// 说明: 班次表按表头文本定位列；工单表使用固定列
// ==========================================

use crate::domain::cell::Column;

/// A 列: 班次/工单判别列（工单号）
pub const COL_DISCRIMINANT: Column = Column(0);

/// B 列: 合格产量
pub const COL_GOOD_PRODUCTION: Column = Column(1);

/// C 列: LHE
pub const COL_LHE: Column = Column(2);

/// D 列: 废品率 %
pub const COL_SPOILAGE_PERCENT: Column = Column(3);

/// F 列: 行类型标签（"Make Ready" / "Production"）
pub const COL_ROW_LABEL: Column = Column(5);

/// G 列: 区间开始
pub const COL_INTERVAL_START: Column = Column(6);

/// H 列: 区间结束
pub const COL_INTERVAL_END: Column = Column(7);

/// O 列: 备注/事件类别
pub const COL_COMMENT: Column = Column(14);

/// P 列: 停机分钟
pub const COL_MINUTES: Column = Column(15);

/// Q 列: 废品数量
pub const COL_UNITS: Column = Column(16);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contract_letters() {
        let letters: Vec<String> = [
            COL_DISCRIMINANT,
            COL_GOOD_PRODUCTION,
            COL_LHE,
            COL_SPOILAGE_PERCENT,
            COL_ROW_LABEL,
            COL_INTERVAL_START,
            COL_INTERVAL_END,
            COL_COMMENT,
            COL_MINUTES,
            COL_UNITS,
        ]
        .iter()
        .map(|c| c.letters())
        .collect();

        assert_eq!(letters, vec!["A", "B", "C", "D", "F", "G", "H", "O", "P", "Q"]);
    }
}
