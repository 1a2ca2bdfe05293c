// ==========================================
// 印刷生产日报系统 - 生产日报 Repository Trait
// ==========================================
// 职责: 定义日报持久化接口（不包含业务逻辑）
// 红线: Repository 不含解析规则，只做数据 CRUD
// ==========================================

use crate::domain::report::ProductionReport;
use crate::repository::error::RepositoryResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

// ==========================================
// ReportSummary - 日报汇总行
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub report_id: String,
    pub press: String,
    pub report_date: String,
    pub shift_count: usize,
    pub work_order_count: usize,
    pub warning_count: usize,
    pub info_count: usize,
    pub total_good_production: f64,
    pub imported_at: String, // RFC3339
}

// ==========================================
// ProductionReportRepository Trait
// ==========================================
// 实现者: ProductionReportRepositoryImpl（使用 rusqlite）
#[async_trait]
pub trait ProductionReportRepository: Send + Sync {
    /// 保存整份日报（单事务）
    ///
    /// # 返回
    /// - Ok(report_id): 新生成的 UUID
    /// - Err: 数据库错误（整个事务回滚）
    async fn save_report(&self, report: &ProductionReport) -> RepositoryResult<String>;

    /// 查询日报汇总
    async fn get_report_summary(&self, report_id: &str) -> RepositoryResult<Option<ReportSummary>>;

    /// 按机台列出日报（按日期、导入时间排序）
    async fn list_reports_by_press(&self, press: &str) -> RepositoryResult<Vec<ReportSummary>>;

    /// 删除日报（子表级联删除）
    ///
    /// # 返回
    /// - Ok(true): 已删除
    /// - Ok(false): 不存在
    async fn delete_report(&self, report_id: &str) -> RepositoryResult<bool>;
}
