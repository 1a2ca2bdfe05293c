// ==========================================
// 印刷生产日报系统 - 日报导入器实现
// ==========================================
// 流程: 读取配置 → 后台加载网格 → 同步装配日报 → （可选）落库
// 并发: 仅网格加载走 spawn_blocking；批量导入严格顺序执行
// ==========================================

use crate::config::ImportConfigReader;
use crate::domain::cell::Grid;
use crate::domain::report::ReportContext;
use crate::engine::report_assembler::ReportAssembler;
use crate::engine::run_speed::NetRunSpeed;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::file_parser::UniversalFileParser;
use crate::importer::report_importer_trait::{FileParser, ImportOutcome, ReportImporter};
use crate::repository::ProductionReportRepository;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, instrument};

// ==========================================
// ReportImporterImpl - 日报导入器实现
// ==========================================
pub struct ReportImporterImpl<C>
where
    C: ImportConfigReader,
{
    // 配置读取器
    config: C,

    // 数据访问层（None 时只解析不落库）
    repository: Option<Arc<dyn ProductionReportRepository>>,
}

impl<C> ReportImporterImpl<C>
where
    C: ImportConfigReader,
{
    /// 创建只解析不落库的导入器
    pub fn new(config: C) -> Self {
        Self {
            config,
            repository: None,
        }
    }

    /// 挂载日报仓储（导入成功后落库）
    pub fn with_repository(mut self, repository: Arc<dyn ProductionReportRepository>) -> Self {
        self.repository = Some(repository);
        self
    }

    /// 按当前配置构造装配器
    async fn build_assembler(&self) -> ImportResult<ReportAssembler> {
        let overlap_mode = self.config.get_overlap_mode().await?;
        let deduct_downtime = self.config.get_deduct_downtime().await?;
        debug!(%overlap_mode, deduct_downtime, "装配器配置");
        Ok(ReportAssembler::new(
            overlap_mode,
            Box::new(NetRunSpeed::new(deduct_downtime)),
        ))
    }

    /// 在阻塞线程池中加载网格
    async fn load_grid(&self, path: PathBuf) -> ImportResult<Grid> {
        let sheet_name = self.config.get_sheet_name().await?;
        let parser = UniversalFileParser::new(sheet_name);
        tokio::task::spawn_blocking(move || parser.parse_to_grid(&path)).await?
    }
}

#[async_trait]
impl<C> ReportImporter for ReportImporterImpl<C>
where
    C: ImportConfigReader + Send + Sync,
{
    #[instrument(
        skip(self, file_path, context),
        fields(press = %context.press, date = %context.date)
    )]
    async fn import_file<P: AsRef<Path> + Send>(
        &self,
        file_path: P,
        context: ReportContext,
    ) -> ImportResult<ImportOutcome> {
        let start_time = Instant::now();
        let path = file_path.as_ref().to_path_buf();
        info!(file_path = %path.display(), "开始导入日报");

        // === 步骤 1: 加载网格 ===
        let grid = self.load_grid(path.clone()).await?;
        debug!(rows = grid.len(), "网格加载完成");

        // === 步骤 2: 装配日报 ===
        let assembler = self.build_assembler().await?;
        let report = assembler.assemble(&context, &grid)?;

        // === 步骤 3: 落库 ===
        let report_id = match &self.repository {
            Some(repository) => {
                let id = repository
                    .save_report(&report)
                    .await
                    .map_err(|e| ImportError::PersistenceError(e.to_string()))?;
                Some(id)
            }
            None => None,
        };

        let elapsed_ms = start_time.elapsed().as_millis() as u64;
        info!(
            file_path = %path.display(),
            work_orders = report.work_orders.len(),
            diagnostics = report.diagnostics.len(),
            report_id = ?report_id,
            elapsed_ms,
            "日报导入完成"
        );

        Ok(ImportOutcome {
            report,
            report_id,
            elapsed_ms,
        })
    }

    async fn batch_import(
        &self,
        files: Vec<(PathBuf, ReportContext)>,
    ) -> Vec<Result<ImportOutcome, String>> {
        let total = files.len();
        info!(total, "开始批量导入");

        let mut results = Vec::with_capacity(total);
        for (path, context) in files {
            match self.import_file(&path, context).await {
                Ok(outcome) => results.push(Ok(outcome)),
                Err(e) => {
                    error!(file_path = %path.display(), error = %e, "日报导入失败");
                    results.push(Err(format!("{}: {}", path.display(), e)));
                }
            }
        }

        let succeeded = results.iter().filter(|r| r.is_ok()).count();
        info!(total, succeeded, failed = total - succeeded, "批量导入完成");
        results
    }
}
