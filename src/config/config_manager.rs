// ==========================================
// 印刷生产日报系统 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写
// 存储: config_kv 表 (key-value)
// 规则: 缺失或无法识别的值回落到默认值（记 warn 日志）
// ==========================================

use crate::config::import_config_trait::ImportConfigReader;
use crate::db::{configure_sqlite_connection, init_schema, open_sqlite_connection};
use crate::domain::types::OverlapMode;
use crate::importer::error::{ImportError, ImportResult};
use async_trait::async_trait;
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};
use tracing::warn;

// ==========================================
// 配置键
// ==========================================
pub mod config_keys {
    // ===== 文件读取 =====
    pub const IMPORT_SHEET_NAME: &str = "import_sheet_name"; // 空值 = 第一个工作表

    // ===== 班次分配 =====
    pub const SHIFT_OVERLAP_MODE: &str = "shift_overlap_mode"; // LEGACY | CIRCULAR

    // ===== 运行速度 =====
    pub const RUN_SPEED_DEDUCT_DOWNTIME: &str = "run_speed_deduct_downtime"; // true | false
}

fn config_error(key: &str, message: impl ToString) -> ImportError {
    ImportError::ConfigReadError {
        key: key.to_string(),
        message: message.to_string(),
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "y" => Some(true),
        "false" | "0" | "no" | "n" => Some(false),
        _ => None,
    }
}

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例（会确保表结构存在）
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> ImportResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        init_schema(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：对传入连接再次应用统一 PRAGMA 与建表（幂等）
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> ImportResult<Self> {
        {
            let conn_guard = conn
                .lock()
                .map_err(|e| config_error("*", format!("锁获取失败: {}", e)))?;
            configure_sqlite_connection(&conn_guard)?;
            init_schema(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    /// 从 config_kv 表读取配置值
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    pub fn get_config_value(&self, key: &str) -> ImportResult<Option<String>> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| config_error(key, format!("锁获取失败: {}", e)))?;

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(config_error(key, e)),
        }
    }

    /// 写入配置值（UPSERT）
    pub fn set_config_value(&self, key: &str, value: &str) -> ImportResult<()> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| config_error(key, format!("锁获取失败: {}", e)))?;

        conn.execute(
            "INSERT INTO config_kv (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = ?2, updated_at = datetime('now')",
            params![key, value],
        )
        .map_err(|e| config_error(key, e))?;
        Ok(())
    }

    fn get_config_or_default(&self, key: &str, default: &str) -> ImportResult<String> {
        Ok(self
            .get_config_value(key)?
            .unwrap_or_else(|| default.to_string()))
    }
}

// ==========================================
// ImportConfigReader Trait 实现
// ==========================================
#[async_trait]
impl ImportConfigReader for ConfigManager {
    async fn get_sheet_name(&self) -> ImportResult<Option<String>> {
        let value = self.get_config_or_default(config_keys::IMPORT_SHEET_NAME, "")?;
        let trimmed = value.trim();
        if trimmed.is_empty() {
            Ok(None)
        } else {
            Ok(Some(trimmed.to_string()))
        }
    }

    async fn get_overlap_mode(&self) -> ImportResult<OverlapMode> {
        let value = self.get_config_or_default(config_keys::SHIFT_OVERLAP_MODE, "LEGACY")?;
        match OverlapMode::parse(&value) {
            Some(mode) => Ok(mode),
            None => {
                warn!(
                    key = config_keys::SHIFT_OVERLAP_MODE,
                    value = %value,
                    "无法识别的重叠模式，使用 LEGACY"
                );
                Ok(OverlapMode::default())
            }
        }
    }

    async fn get_deduct_downtime(&self) -> ImportResult<bool> {
        let value = self.get_config_or_default(config_keys::RUN_SPEED_DEDUCT_DOWNTIME, "true")?;
        match parse_bool(&value) {
            Some(flag) => Ok(flag),
            None => {
                warn!(
                    key = config_keys::RUN_SPEED_DEDUCT_DOWNTIME,
                    value = %value,
                    "无法识别的布尔值，使用 true"
                );
                Ok(true)
            }
        }
    }
}

// ==========================================
// DefaultImportConfig - 内存配置（无数据库时使用）
// ==========================================
#[derive(Debug, Clone)]
pub struct DefaultImportConfig {
    pub sheet_name: Option<String>,
    pub overlap_mode: OverlapMode,
    pub deduct_downtime: bool,
}

impl Default for DefaultImportConfig {
    fn default() -> Self {
        Self {
            sheet_name: None,
            overlap_mode: OverlapMode::Legacy,
            deduct_downtime: true,
        }
    }
}

#[async_trait]
impl ImportConfigReader for DefaultImportConfig {
    async fn get_sheet_name(&self) -> ImportResult<Option<String>> {
        Ok(self.sheet_name.clone())
    }

    async fn get_overlap_mode(&self) -> ImportResult<OverlapMode> {
        Ok(self.overlap_mode)
    }

    async fn get_deduct_downtime(&self) -> ImportResult<bool> {
        Ok(self.deduct_downtime)
    }
}
