// ==========================================
// 印刷生产日报系统 - 仓储层错误类型
// ==========================================
// 工具: thiserror 派生宏
// 说明: 日报按 report_id 单事务写入，约束冲突单独区分
// ==========================================

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("数据库连接失败: {0}")]
    DatabaseConnectionError(String),

    #[error("数据库锁获取失败: {0}")]
    LockError(String),

    #[error("日报事务失败: {0}")]
    DatabaseTransactionError(String),

    #[error("数据库查询失败: {0}")]
    DatabaseQueryError(String),

    // 重复 report_id / 序号
    #[error("日报子表主键冲突: {0}")]
    DuplicateKey(String),

    // 子表引用了不存在的日报或工单
    #[error("日报子表外键冲突: {0}")]
    DanglingReference(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<rusqlite::Error> for RepositoryError {
    fn from(err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::SqliteFailure(code, msg) => {
                let detail = msg.unwrap_or_else(|| code.to_string());
                match code.extended_code {
                    rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
                    | rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE => {
                        RepositoryError::DuplicateKey(detail)
                    }
                    rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY => {
                        RepositoryError::DanglingReference(detail)
                    }
                    _ => RepositoryError::DatabaseQueryError(detail),
                }
            }
            other => RepositoryError::DatabaseQueryError(other.to_string()),
        }
    }
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;
