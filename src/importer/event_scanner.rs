// ==========================================
// 印刷生产日报系统 - 停机/废品事件扫描
// ==========================================
// 范围: 锚点（Production 行）下一行 → 下一个 A 列为数字的行（不含）或文件末尾
// 规则: O 列备注、P 列分钟、Q 列数量
//   - P、Q 均无法解析 → 跳过该行
//   - 备注非空且 P 可解析 → DowntimeEvent
//   - 备注非空且 Q 可解析 → SpoilageEvent（与停机事件互不影响）
// ==========================================

use crate::domain::cell::Grid;
use crate::domain::report::{DowntimeEvent, SpoilageEvent};
use crate::importer::layout::{COL_COMMENT, COL_DISCRIMINANT, COL_MINUTES, COL_UNITS};
use crate::importer::work_order_extractor::work_order_number;
use tracing::{debug, warn};

// ==========================================
// EventScan - 单个工单的事件
// ==========================================
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventScan {
    pub downtime: Vec<DowntimeEvent>,
    pub spoilage: Vec<SpoilageEvent>,
}

/// 从锚点行之后扫描事件；anchor 为 None 时返回空结果
pub fn scan_events(grid: &Grid, anchor: Option<usize>) -> EventScan {
    let anchor = match anchor {
        Some(a) => a,
        None => {
            warn!("工单缺少 Production 锚点，跳过事件扫描");
            return EventScan::default();
        }
    };

    let mut scan = EventScan::default();
    for row in grid.rows().iter().skip(anchor + 1) {
        if work_order_number(row.cell(COL_DISCRIMINANT)).is_some() {
            break;
        }

        let minutes = row.cell(COL_MINUTES).as_number();
        let units = row.cell(COL_UNITS).as_number();
        if minutes.is_none() && units.is_none() {
            continue;
        }

        let category = match row.cell(COL_COMMENT).as_text() {
            Some(text) => text,
            None => continue,
        };

        if let Some(minutes) = minutes {
            scan.downtime.push(DowntimeEvent {
                category: category.clone(),
                minutes,
            });
        }
        if let Some(units) = units {
            scan.spoilage.push(SpoilageEvent { category, units });
        }
    }

    debug!(
        anchor,
        downtime = scan.downtime.len(),
        spoilage = scan.spoilage.len(),
        "事件扫描完成"
    );
    scan
}
