// ==========================================
// 文件编码管理 - 命令行入口
// ==========================================
// 命令:
// - preview <file>          解析并展示层级（不发起远程调用）
// - import <file> [--yes]   解析 → 确认 → 对账 → 批量执行 → 报告
// - export <out.xlsx>       导出远程全部编码
// - history [--limit N]     最近的导入批次
// - config list | set       本地配置
// ==========================================

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use doc_codes::api::{ApiError, ImportPreview};
use doc_codes::app::{get_default_db_path, AppState, WizardEvent, WizardState};
use doc_codes::importer::error_report::fatal_message;
use doc_codes::importer::SpreadsheetSource;

#[derive(Parser, Debug)]
#[command(name = "doc-codes", version, about = "文件编码管理 - 父/子编码批量导入")]
struct Cli {
    /// 本地数据库路径（配置 + 导入审计）
    #[arg(long, global = true)]
    db: Option<String>,

    /// 远程 API 地址（覆盖配置）
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// 以 JSON 格式输出日志
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// 解析文件并展示待导入的层级
    Preview { file: PathBuf },

    /// 导入文件
    Import {
        file: PathBuf,
        /// 跳过交互确认
        #[arg(long)]
        yes: bool,
    },

    /// 导出远程全部编码到工作簿
    Export { out: PathBuf },

    /// 最近的导入批次
    History {
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },

    /// 本地配置
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// 列出生效配置
    List,
    /// 写入配置
    Set { key: String, value: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.log_json {
        doc_codes::logging::init_json();
    } else {
        doc_codes::logging::init();
    }

    let db_path = cli.db.unwrap_or_else(get_default_db_path);
    tracing::info!(version = doc_codes::VERSION, db_path = %db_path, "{}", doc_codes::APP_NAME);

    let state = AppState::new(db_path, cli.api_url)
        .await
        .context("无法初始化AppState")?;

    match cli.command {
        Command::Preview { file } => run_preview(&state, file),
        Command::Import { file, yes } => run_import(&state, file, yes).await,
        Command::Export { out } => run_export(&state, out).await,
        Command::History { limit } => run_history(&state, limit).await,
        Command::Config { action } => run_config(&state, action),
    }
}

fn parse_file(state: &AppState, file: PathBuf) -> Result<Option<ImportPreview>> {
    let source = SpreadsheetSource::from_path(file);
    match state.import_api.preview(&source) {
        Ok(preview) => Ok(Some(preview)),
        Err(ApiError::Import(e)) => {
            eprintln!("{}", fatal_message(&e));
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

fn print_preview(preview: &ImportPreview) {
    println!(
        "{}: {} 个父编码, {} 个子编码",
        preview.file_name, preview.parent_count, preview.child_count
    );
    for parent in &preview.parents {
        println!(
            "  {} [{}] {} v{} {} {}",
            parent.code,
            parent.department_code,
            parent.document_name,
            parent.version,
            parent.approval_date,
            parent.status
        );
        for child in &parent.children {
            println!(
                "    └ {} {} v{} {} {}",
                child.code, child.document_name, child.version, child.approval_date, child.status
            );
        }
    }
}

fn run_preview(state: &AppState, file: PathBuf) -> Result<()> {
    if let Some(preview) = parse_file(state, file)? {
        print_preview(&preview);
    }
    Ok(())
}

fn confirm(prompt: &str) -> Result<bool> {
    print!("{} [y/N] ", prompt);
    io::stdout().flush()?;

    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes" | "s" | "si" | "sí"))
}

async fn run_import(state: &AppState, file: PathBuf, yes: bool) -> Result<()> {
    let Some(preview) = parse_file(state, file)? else {
        return Ok(());
    };
    print_preview(&preview);

    let wizard = WizardState::Idle.transition(WizardEvent::FileParsed {
        file_name: preview.file_name.clone(),
        parents: preview.parents,
    })?;
    let wizard = wizard.transition(WizardEvent::RequestConfirm)?;

    if !yes && !confirm("确认导入?")? {
        let wizard = wizard.transition(WizardEvent::Cancel)?;
        tracing::info!(state = wizard.name(), "用户取消导入");
        return Ok(());
    }

    let wizard = wizard.transition(WizardEvent::Confirm)?;
    let parents = wizard.parents().map(<[_]>::to_vec).unwrap_or_default();

    // 对账前读取一次远程快照
    if let Err(e) = state.refresh_known_parents().await {
        let wizard = wizard.transition(WizardEvent::ApplyFailed(e.to_string()))?;
        tracing::error!(state = wizard.name(), error = %e, "读取远程父编码失败，导入未执行");
        return Err(e.into());
    }
    let (outcome, refreshed) = state.run_import(parents, Some(preview.file_name)).await;
    let wizard = wizard.transition(WizardEvent::ApplyFinished(outcome.summary.clone()))?;
    tracing::debug!(state = wizard.name(), refreshed, "导入向导结束");

    println!("{}", outcome.report.message);
    if let Some(path) = &outcome.error_log_path {
        println!("{}", path.display());
    }
    if let Some(reason) = &outcome.error_log_write_error {
        eprintln!("{}", reason);
        if let Some(log) = &outcome.report.error_log {
            eprint!("{}", log.to_text());
        }
    }
    Ok(())
}

async fn run_export(state: &AppState, out: PathBuf) -> Result<()> {
    state.refresh_known_parents().await?;
    let parents = state.known_parents().await;
    let rows = state.import_api.export(&parents, &out)?;
    println!("{} ({} 行)", out.display(), rows);
    Ok(())
}

async fn run_history(state: &AppState, limit: usize) -> Result<()> {
    let batches = state.import_api.recent_batches(limit).await?;
    if batches.is_empty() {
        println!("暂无导入记录");
    }
    for batch in batches {
        println!(
            "{}  {}  {}  成功={} 失败={} 新建父={} 新建子={} 跳过子={} ({} ms)",
            batch.imported_at.format("%Y-%m-%d %H:%M:%S"),
            batch.batch_id,
            batch.file_name.as_deref().unwrap_or("-"),
            batch.success_count,
            batch.failure_count,
            batch.created_parents,
            batch.created_children,
            batch.skipped_children,
            batch.elapsed_ms
        );
        for line in &batch.error_lines {
            println!("    {}", line);
        }
    }
    Ok(())
}

fn run_config(state: &AppState, action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::List => {
            for (key, value) in state.config_manager.get_effective_config()? {
                println!("{} = {}", key, value);
            }
        }
        ConfigAction::Set { key, value } => {
            state.config_manager.set_config_value(&key, &value)?;
            println!("{} = {}", key, value);
        }
    }
    Ok(())
}
