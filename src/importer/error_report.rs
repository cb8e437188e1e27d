// ==========================================
// 文件编码管理 - 导入结果报告
// ==========================================
// 职责: 执行汇总 → 用户通知 + 可下载的失败明细（纯文本，一行一条）
// 说明: 明细文件仅在存在失败时生成
// ==========================================

use crate::domain::import::{ImportErrorLog, ImportSummary};
use crate::i18n::t_with_args;
use crate::importer::error::{ImportError, ImportResult};
use chrono::Utc;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// 通知类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ImportNotification {
    /// 全部成功
    Success { processed: usize },
    /// 无新增（全部已存在）
    NothingNew,
    /// 部分失败（成功数 / 失败数）
    PartialFailure { succeeded: usize, failed: usize },
}

/// 导入报告
#[derive(Debug, Clone, Serialize)]
pub struct ImportReport {
    pub notification: ImportNotification,
    pub message: String,
    /// 仅在存在失败时提供
    pub error_log: Option<ImportErrorLog>,
}

impl ImportReport {
    pub fn has_download(&self) -> bool {
        self.error_log.is_some()
    }
}

/// 根据执行汇总生成报告
pub fn build_report(summary: &ImportSummary) -> ImportReport {
    if summary.has_failures() {
        let succeeded = summary.success_count.to_string();
        let failed = summary.failure_count.to_string();
        return ImportReport {
            notification: ImportNotification::PartialFailure {
                succeeded: summary.success_count,
                failed: summary.failure_count,
            },
            message: t_with_args(
                "import.partial_failure",
                &[("succeeded", succeeded.as_str()), ("failed", failed.as_str())],
            ),
            error_log: Some(summary.errors.clone()),
        };
    }

    if summary.is_noop() {
        return ImportReport {
            notification: ImportNotification::NothingNew,
            message: t_with_args("import.nothing_new", &[]),
            error_log: None,
        };
    }

    let processed = summary.success_count.to_string();
    ImportReport {
        notification: ImportNotification::Success {
            processed: summary.success_count,
        },
        message: t_with_args("import.success", &[("count", processed.as_str())]),
        error_log: None,
    }
}

/// 阻断型错误的提示文案
pub fn fatal_message(err: &ImportError) -> String {
    if matches!(err, ImportError::NoValidCodes) {
        return t_with_args("import.no_valid_codes", &[]);
    }
    let reason = err.to_string();
    t_with_args("import.fatal", &[("reason", reason.as_str())])
}

/// 失败明细文件名
pub fn error_log_file_name(batch_id: &str) -> String {
    let short_id: String = batch_id.chars().take(8).collect();
    format!(
        "errores_importacion_{}_{}.txt",
        Utc::now().format("%Y%m%d_%H%M%S"),
        short_id
    )
}

/// 写出失败明细（空日志不生成文件）
///
/// # 返回
/// - Ok(Some(PathBuf)): 文件路径
/// - Ok(None): 无失败
pub fn write_error_log(
    log: &ImportErrorLog,
    dir: &Path,
    batch_id: &str,
) -> ImportResult<Option<PathBuf>> {
    if log.is_empty() {
        return Ok(None);
    }

    fs::create_dir_all(dir)?;
    let path = dir.join(error_log_file_name(batch_id));
    fs::write(&path, log.to_text())?;

    info!(path = %path.display(), lines = log.len(), "失败明细已写出");
    Ok(Some(path))
}
