// ==========================================
// 印刷生产日报系统 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// 职责: 提供数据访问接口，屏蔽数据库细节
// 约束: 所有查询使用参数化
// ==========================================

pub mod error;
pub mod production_report_repo;
pub mod production_report_repo_impl;

// 重导出核心仓储
pub use error::{RepositoryError, RepositoryResult};
pub use production_report_repo::{ProductionReportRepository, ReportSummary};
pub use production_report_repo_impl::ProductionReportRepositoryImpl;
