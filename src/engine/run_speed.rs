// ==========================================
// 印刷生产日报系统 - 运行速度计算
// ==========================================
// 职责: 提供运行速度公式接口（装配器仅依赖 trait）
// 默认公式: 合格产量 / 净运行小时
//   净运行分钟 = 生产分钟 - 停机分钟（可配置是否扣除停机）
// ==========================================

/// 运行速度公式
pub trait RunSpeedFormula: Send + Sync {
    /// 计算运行速度
    ///
    /// # 参数
    /// - `good_production`: 合格产量
    /// - `production_minutes`: 生产区间时长（分钟）
    /// - `downtime_minutes`: 停机合计（分钟）
    fn run_speed(
        &self,
        good_production: f64,
        production_minutes: f64,
        downtime_minutes: f64,
    ) -> f64;
}

// ==========================================
// NetRunSpeed - 每小时产量（净运行时间）
// ==========================================
#[derive(Debug, Clone, Copy)]
pub struct NetRunSpeed {
    pub deduct_downtime: bool,
}

impl NetRunSpeed {
    pub fn new(deduct_downtime: bool) -> Self {
        Self { deduct_downtime }
    }
}

impl Default for NetRunSpeed {
    fn default() -> Self {
        Self::new(true)
    }
}

impl RunSpeedFormula for NetRunSpeed {
    fn run_speed(
        &self,
        good_production: f64,
        production_minutes: f64,
        downtime_minutes: f64,
    ) -> f64 {
        let downtime = if self.deduct_downtime {
            downtime_minutes
        } else {
            0.0
        };
        let net_minutes = production_minutes - downtime;
        if net_minutes <= 0.0 {
            return 0.0;
        }

        let speed = good_production / (net_minutes / 60.0);
        if speed.is_finite() {
            speed
        } else {
            0.0
        }
    }
}
