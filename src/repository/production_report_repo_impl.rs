// ==========================================
// 印刷生产日报系统 - 生产日报 Repository 实现
// ==========================================
// 存储: production_report + 子表
//   shift_record / work_order / downtime_event / spoilage_event / parse_diagnostic
// 说明: 工单所属班次以班次序号落库（弱引用，可空）
// ==========================================

use crate::db::{configure_sqlite_connection, init_schema, open_sqlite_connection};
use crate::domain::diagnostics::Diagnostic;
use crate::domain::report::{ProductionReport, ReportWorkOrder, ShiftRecord};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::production_report_repo::{ProductionReportRepository, ReportSummary};
use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction};
use std::sync::{Arc, Mutex};
use tracing::{debug, info};
use uuid::Uuid;

const SUMMARY_COLUMNS: &str = "report_id, press, report_date, shift_count, work_order_count, \
     warning_count, info_count, total_good_production, imported_at";

// ==========================================
// ProductionReportRepositoryImpl
// ==========================================
pub struct ProductionReportRepositoryImpl {
    conn: Arc<Mutex<Connection>>,
}

impl ProductionReportRepositoryImpl {
    /// 创建新的 Repository 实例（会确保表结构存在）
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;
        init_schema(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建（与 ConfigManager 共享连接）
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> RepositoryResult<Self> {
        {
            let guard = conn
                .lock()
                .map_err(|e| RepositoryError::LockError(e.to_string()))?;
            configure_sqlite_connection(&guard)?;
            init_schema(&guard)?;
        }
        Ok(Self { conn })
    }

    fn lock(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn insert_header_tx(
        tx: &Transaction,
        report_id: &str,
        report: &ProductionReport,
        imported_at: &str,
    ) -> RepositoryResult<()> {
        let summary = report.diagnostic_summary();
        tx.execute(
            r#"
            INSERT INTO production_report (
                report_id, press, report_date, shift_count, work_order_count,
                warning_count, info_count, total_good_production, imported_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
            params![
                report_id,
                report.press,
                report.date,
                report.shifts.len() as i64,
                report.work_orders.len() as i64,
                summary.warning as i64,
                summary.info as i64,
                report.total_good_production(),
                imported_at,
            ],
        )?;
        Ok(())
    }

    fn insert_shifts_tx(
        tx: &Transaction,
        report_id: &str,
        shifts: &[ShiftRecord],
    ) -> RepositoryResult<()> {
        let mut stmt = tx.prepare(
            r#"
            INSERT INTO shift_record (
                report_id, ordinal, start_time, end_time, shift_name, team,
                actual_hours, make_ready_minutes, other_logged_minutes, row_index
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
        )?;

        for (ordinal, shift) in shifts.iter().enumerate() {
            stmt.execute(params![
                report_id,
                ordinal as i64,
                shift.start_time,
                shift.end_time,
                shift.shift_name.as_str(),
                shift.team.to_string(),
                shift.actual_hours,
                shift.make_ready_minutes,
                shift.other_logged_minutes,
                shift.row_index as i64,
            ])?;
        }
        Ok(())
    }

    fn insert_work_orders_tx(
        tx: &Transaction,
        report_id: &str,
        work_orders: &[ReportWorkOrder],
    ) -> RepositoryResult<()> {
        let mut wo_stmt = tx.prepare(
            r#"
            INSERT INTO work_order (
                report_id, ordinal, work_order_number, good_production, lhe, spoilage_percent,
                make_ready_start, make_ready_end, production_start, production_end,
                row_index, anchor_row, assigned_shift_ordinal, shift_overlap_minutes, run_speed
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)
            "#,
        )?;
        let mut downtime_stmt = tx.prepare(
            "INSERT INTO downtime_event (report_id, work_order_ordinal, seq, category, minutes)
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )?;
        let mut spoilage_stmt = tx.prepare(
            "INSERT INTO spoilage_event (report_id, work_order_ordinal, seq, category, units)
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )?;

        for (ordinal, wo) in work_orders.iter().enumerate() {
            let record = &wo.record;
            wo_stmt.execute(params![
                report_id,
                ordinal as i64,
                record.work_order_number,
                record.good_production,
                record.lhe,
                record.spoilage_percent,
                record.make_ready.start,
                record.make_ready.end,
                record.production.start,
                record.production.end,
                record.row_index as i64,
                wo.anchor_row.map(|r| r as i64),
                wo.assigned_shift.map(|s| s as i64),
                wo.shift_overlap_minutes,
                wo.run_speed,
            ])?;

            for (seq, event) in wo.downtime.iter().enumerate() {
                downtime_stmt.execute(params![
                    report_id,
                    ordinal as i64,
                    seq as i64,
                    event.category,
                    event.minutes
                ])?;
            }
            for (seq, event) in wo.spoilage.iter().enumerate() {
                spoilage_stmt.execute(params![
                    report_id,
                    ordinal as i64,
                    seq as i64,
                    event.category,
                    event.units
                ])?;
            }
        }
        Ok(())
    }

    fn insert_diagnostics_tx(
        tx: &Transaction,
        report_id: &str,
        diagnostics: &[Diagnostic],
    ) -> RepositoryResult<()> {
        let mut stmt = tx.prepare(
            "INSERT INTO parse_diagnostic (report_id, seq, kind, level, row_index, message)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )?;
        for (seq, diagnostic) in diagnostics.iter().enumerate() {
            stmt.execute(params![
                report_id,
                seq as i64,
                diagnostic.kind.to_string(),
                diagnostic.level.to_string(),
                diagnostic.row_index.map(|r| r as i64),
                diagnostic.message,
            ])?;
        }
        Ok(())
    }

    fn map_summary(row: &Row) -> rusqlite::Result<ReportSummary> {
        Ok(ReportSummary {
            report_id: row.get(0)?,
            press: row.get(1)?,
            report_date: row.get(2)?,
            shift_count: row.get::<_, i64>(3)? as usize,
            work_order_count: row.get::<_, i64>(4)? as usize,
            warning_count: row.get::<_, i64>(5)? as usize,
            info_count: row.get::<_, i64>(6)? as usize,
            total_good_production: row.get(7)?,
            imported_at: row.get(8)?,
        })
    }
}

#[async_trait]
impl ProductionReportRepository for ProductionReportRepositoryImpl {
    async fn save_report(&self, report: &ProductionReport) -> RepositoryResult<String> {
        let report_id = Uuid::new_v4().to_string();
        let imported_at = Utc::now().to_rfc3339();

        let mut conn = self.lock()?;
        let tx = conn
            .transaction()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        Self::insert_header_tx(&tx, &report_id, report, &imported_at)?;
        Self::insert_shifts_tx(&tx, &report_id, &report.shifts)?;
        Self::insert_work_orders_tx(&tx, &report_id, &report.work_orders)?;
        Self::insert_diagnostics_tx(&tx, &report_id, &report.diagnostics)?;

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        info!(
            report_id = %report_id,
            press = %report.press,
            date = %report.date,
            work_orders = report.work_orders.len(),
            "日报已落库"
        );
        Ok(report_id)
    }

    async fn get_report_summary(&self, report_id: &str) -> RepositoryResult<Option<ReportSummary>> {
        let conn = self.lock()?;
        let sql = format!(
            "SELECT {} FROM production_report WHERE report_id = ?1",
            SUMMARY_COLUMNS
        );
        let summary = conn
            .query_row(&sql, params![report_id], Self::map_summary)
            .optional()?;
        Ok(summary)
    }

    async fn list_reports_by_press(&self, press: &str) -> RepositoryResult<Vec<ReportSummary>> {
        let conn = self.lock()?;
        let sql = format!(
            "SELECT {} FROM production_report WHERE press = ?1 ORDER BY report_date, imported_at",
            SUMMARY_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params![press], Self::map_summary)?;

        let mut summaries = Vec::new();
        for row in rows {
            summaries.push(row?);
        }
        debug!(press = %press, count = summaries.len(), "按机台查询日报");
        Ok(summaries)
    }

    async fn delete_report(&self, report_id: &str) -> RepositoryResult<bool> {
        let conn = self.lock()?;
        let affected = conn.execute(
            "DELETE FROM production_report WHERE report_id = ?1",
            params![report_id],
        )?;
        Ok(affected > 0)
    }
}
