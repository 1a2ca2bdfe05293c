// ==========================================
// 印刷生产日报系统 - 命令行入口
// ==========================================
// 用法:
//   press-report <file> <press> <date> [--db <path>] [--save] [--sheet <name>] [--log-json]
//
// 输出: 日报 JSON 打印到 stdout，日志输出到 stderr
// 落库: 指定 --db 或 --save（默认库路径，可用 PRESS_REPORT_DB_PATH 覆盖）
// ==========================================

use anyhow::{bail, Context};
use press_report::config::{ConfigManager, DefaultImportConfig, ImportConfigReader};
use press_report::db::get_default_db_path;
use press_report::importer::{ReportImporter, ReportImporterImpl};
use press_report::repository::ProductionReportRepositoryImpl;
use press_report::{logging, ReportContext, APP_NAME, VERSION};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info};

const USAGE: &str =
    "用法: press-report <file> <press> <date> [--db <path>] [--save] [--sheet <name>] [--log-json]";

#[derive(Debug)]
struct CliArgs {
    file: PathBuf,
    press: String,
    date: String,
    db_path: Option<String>,
    save: bool,
    sheet: Option<String>,
    log_json: bool,
}

impl CliArgs {
    fn parse(args: impl Iterator<Item = String>) -> anyhow::Result<Self> {
        let mut positional = Vec::new();
        let mut db_path = None;
        let mut save = false;
        let mut sheet = None;
        let mut log_json = false;

        let mut args = args.peekable();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => db_path = Some(args.next().context("--db 缺少路径参数")?),
                "--sheet" => sheet = Some(args.next().context("--sheet 缺少工作表名")?),
                "--save" => save = true,
                "--log-json" => log_json = true,
                "-h" | "--help" => bail!("{}", USAGE),
                other if other.starts_with("--") => bail!("未知参数: {}\n{}", other, USAGE),
                _ => positional.push(arg),
            }
        }

        if positional.len() != 3 {
            bail!("{}", USAGE);
        }
        let mut positional = positional.into_iter();
        Ok(Self {
            file: PathBuf::from(positional.next().unwrap_or_default()),
            press: positional.next().unwrap_or_default(),
            date: positional.next().unwrap_or_default(),
            db_path,
            save,
            sheet,
            log_json,
        })
    }

    /// 需要落库时的数据库路径
    fn resolved_db_path(&self) -> Option<String> {
        match (&self.db_path, self.save) {
            (Some(path), _) => Some(path.clone()),
            (None, true) => Some(get_default_db_path()),
            (None, false) => None,
        }
    }
}

/// 合并数据库配置与命令行覆写
async fn resolve_config(
    db_path: Option<&str>,
    sheet_override: Option<String>,
) -> anyhow::Result<DefaultImportConfig> {
    let mut config = DefaultImportConfig::default();
    if let Some(path) = db_path {
        let manager = ConfigManager::new(path)?;
        config.sheet_name = manager.get_sheet_name().await?;
        config.overlap_mode = manager.get_overlap_mode().await?;
        config.deduct_downtime = manager.get_deduct_downtime().await?;
    }
    if sheet_override.is_some() {
        config.sheet_name = sheet_override;
    }
    Ok(config)
}

async fn run(args: CliArgs) -> anyhow::Result<()> {
    let db_path = args.resolved_db_path();

    info!("{} v{}", APP_NAME, VERSION);

    let config = resolve_config(db_path.as_deref(), args.sheet.clone()).await?;
    let mut importer = ReportImporterImpl::new(config);
    if let Some(path) = &db_path {
        info!(db_path = %path, "使用数据库");
        let repository = ProductionReportRepositoryImpl::new(path)?;
        importer = importer.with_repository(Arc::new(repository));
    }

    let outcome = importer
        .import_file(&args.file, ReportContext::new(args.press, args.date))
        .await?;

    println!("{}", serde_json::to_string_pretty(&outcome)?);
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = match CliArgs::parse(std::env::args().skip(1)) {
        Ok(args) => args,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::from(2);
        }
    };

    if args.log_json {
        logging::init_json();
    } else {
        logging::init();
    }

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "日报导入失败");
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> anyhow::Result<CliArgs> {
        CliArgs::parse(args.iter().map(|s| s.to_string()))
    }

    #[test]
    fn test_parse_positional_and_flags() {
        let args = parse(&[
            "day.xlsx",
            "P7",
            "2024-03-04",
            "--sheet",
            "Daily",
            "--log-json",
        ])
        .unwrap();
        assert_eq!(args.file, PathBuf::from("day.xlsx"));
        assert_eq!(args.press, "P7");
        assert_eq!(args.date, "2024-03-04");
        assert_eq!(args.sheet.as_deref(), Some("Daily"));
        assert!(args.log_json);
        assert!(args.resolved_db_path().is_none());
    }

    #[test]
    fn test_explicit_db_wins() {
        let args = parse(&["day.csv", "P7", "2024-03-04", "--save", "--db", "/tmp/r.db"]).unwrap();
        assert_eq!(args.resolved_db_path().as_deref(), Some("/tmp/r.db"));
    }

    #[test]
    fn test_rejects_bad_arguments() {
        assert!(parse(&["day.csv", "P7"]).is_err());
        assert!(parse(&["day.csv", "P7", "2024-03-04", "--verbose"]).is_err());
        assert!(parse(&["day.csv", "P7", "2024-03-04", "--db"]).is_err());
    }
}
