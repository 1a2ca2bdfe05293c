// ==========================================
// 印刷生产日报系统 - SQLite 连接与建表
// ==========================================
// 目标:
// - 统一所有 Connection::open 的 PRAGMA 行为（外键、busy_timeout）
// - 建表幂等，可对已有库重复执行
// ==========================================

use rusqlite::Connection;
use rusqlite::OptionalExtension;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, warn};

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 当前代码所期望的 schema_version
pub const CURRENT_SCHEMA_VERSION: i64 = 1;

/// 配置 SQLite 连接的统一 PRAGMA
///
/// 说明：foreign_keys 与 busy_timeout 都需要“每个连接”单独配置
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// 打开 SQLite 连接并应用统一配置
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// 读取 schema_version（若表不存在则返回 None）
pub fn read_schema_version(conn: &Connection) -> rusqlite::Result<Option<i64>> {
    let has_table: bool = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version' LIMIT 1",
            [],
            |_row| Ok(true),
        )
        .optional()?
        .unwrap_or(false);

    if !has_table {
        return Ok(None);
    }

    let v: Option<i64> =
        conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))?;
    Ok(v)
}

const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS schema_version (
    version     INTEGER PRIMARY KEY,
    applied_at  TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS config_kv (
    key         TEXT PRIMARY KEY,
    value       TEXT NOT NULL,
    updated_at  TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS production_report (
    report_id       TEXT PRIMARY KEY,
    press           TEXT NOT NULL,
    report_date     TEXT NOT NULL,
    shift_count     INTEGER NOT NULL,
    work_order_count INTEGER NOT NULL,
    warning_count   INTEGER NOT NULL,
    info_count      INTEGER NOT NULL,
    total_good_production REAL NOT NULL,
    imported_at     TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_production_report_press
    ON production_report (press, report_date);

CREATE TABLE IF NOT EXISTS shift_record (
    report_id       TEXT NOT NULL REFERENCES production_report(report_id) ON DELETE CASCADE,
    ordinal         INTEGER NOT NULL,
    start_time      TEXT,
    end_time        TEXT,
    shift_name      TEXT NOT NULL,
    team            TEXT NOT NULL,
    actual_hours    REAL,
    make_ready_minutes REAL,
    other_logged_minutes REAL,
    row_index       INTEGER NOT NULL,
    PRIMARY KEY (report_id, ordinal)
);

CREATE TABLE IF NOT EXISTS work_order (
    report_id       TEXT NOT NULL REFERENCES production_report(report_id) ON DELETE CASCADE,
    ordinal         INTEGER NOT NULL,
    work_order_number INTEGER NOT NULL,
    good_production REAL,
    lhe             REAL,
    spoilage_percent REAL,
    make_ready_start TEXT,
    make_ready_end  TEXT,
    production_start TEXT,
    production_end  TEXT,
    row_index       INTEGER NOT NULL,
    anchor_row      INTEGER,
    assigned_shift_ordinal INTEGER,
    shift_overlap_minutes INTEGER NOT NULL,
    run_speed       REAL NOT NULL,
    PRIMARY KEY (report_id, ordinal)
);

CREATE TABLE IF NOT EXISTS downtime_event (
    report_id       TEXT NOT NULL,
    work_order_ordinal INTEGER NOT NULL,
    seq             INTEGER NOT NULL,
    category        TEXT NOT NULL,
    minutes         REAL NOT NULL,
    PRIMARY KEY (report_id, work_order_ordinal, seq),
    FOREIGN KEY (report_id, work_order_ordinal)
        REFERENCES work_order(report_id, ordinal) ON DELETE CASCADE
);

CREATE TABLE IF NOT EXISTS spoilage_event (
    report_id       TEXT NOT NULL,
    work_order_ordinal INTEGER NOT NULL,
    seq             INTEGER NOT NULL,
    category        TEXT NOT NULL,
    units           REAL NOT NULL,
    PRIMARY KEY (report_id, work_order_ordinal, seq),
    FOREIGN KEY (report_id, work_order_ordinal)
        REFERENCES work_order(report_id, ordinal) ON DELETE CASCADE
);

CREATE TABLE IF NOT EXISTS parse_diagnostic (
    report_id       TEXT NOT NULL REFERENCES production_report(report_id) ON DELETE CASCADE,
    seq             INTEGER NOT NULL,
    kind            TEXT NOT NULL,
    level           TEXT NOT NULL,
    row_index       INTEGER,
    message         TEXT NOT NULL,
    PRIMARY KEY (report_id, seq)
);
"#;

/// 建表（幂等）并登记 schema_version
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA_SQL)?;

    match read_schema_version(conn)? {
        Some(v) if v == CURRENT_SCHEMA_VERSION => {
            debug!(version = v, "schema 已是最新");
        }
        Some(v) => {
            warn!(
                found = v,
                expected = CURRENT_SCHEMA_VERSION,
                "schema_version 与代码期望不一致"
            );
        }
        None => {
            conn.execute(
                "INSERT INTO schema_version (version) VALUES (?1)",
                [CURRENT_SCHEMA_VERSION],
            )?;
        }
    }
    Ok(())
}

/// 环境变量: 显式指定 DB 路径
pub const DB_PATH_ENV: &str = "PRESS_REPORT_DB_PATH";

/// 默认数据库路径
///
/// 优先级: PRESS_REPORT_DB_PATH → 用户数据目录/press-report/press_report.db → ./press_report.db
pub fn get_default_db_path() -> String {
    if let Ok(path) = std::env::var(DB_PATH_ENV) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./press_report.db");
    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join("press-report");
        // 目录创建失败时回退到当前目录
        if std::fs::create_dir_all(&dir).is_ok() {
            path = dir.join("press_report.db");
        }
    }
    path.to_string_lossy().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_schema_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        configure_sqlite_connection(&conn).unwrap();

        init_schema(&conn).unwrap();
        init_schema(&conn).unwrap();

        assert_eq!(read_schema_version(&conn).unwrap(), Some(CURRENT_SCHEMA_VERSION));
        let tables: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name IN \
                 ('production_report','shift_record','work_order','downtime_event','spoilage_event','parse_diagnostic','config_kv')",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(tables, 7);
    }

    #[test]
    fn test_schema_version_absent_on_fresh_db() {
        let conn = Connection::open_in_memory().unwrap();
        assert_eq!(read_schema_version(&conn).unwrap(), None);
    }
}
