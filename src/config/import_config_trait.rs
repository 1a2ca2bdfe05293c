// ==========================================
// 印刷生产日报系统 - 导入配置读取 Trait
// ==========================================
// 职责: 定义日报导入所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// 说明: 固定列约定与表头扫描窗口为编译期常量，不在此处配置
// ==========================================

use crate::domain::types::OverlapMode;
use crate::importer::error::ImportResult;
use async_trait::async_trait;

// ==========================================
// ImportConfigReader Trait
// ==========================================
// 用途: 日报导入所需的配置读取接口
// 实现者: ConfigManager（config_kv 表）、DefaultImportConfig（内存默认值）
#[async_trait]
pub trait ImportConfigReader: Send + Sync {
    /// 获取要读取的工作表名
    ///
    /// # 返回
    /// - Some(name): 指定工作表
    /// - None: 使用第一个工作表
    async fn get_sheet_name(&self) -> ImportResult<Option<String>>;

    /// 获取班次重叠计算模式
    ///
    /// # 默认值
    /// - LEGACY
    async fn get_overlap_mode(&self) -> ImportResult<OverlapMode>;

    /// 运行速度是否扣除停机时间
    ///
    /// # 默认值
    /// - true
    async fn get_deduct_downtime(&self) -> ImportResult<bool>;
}
