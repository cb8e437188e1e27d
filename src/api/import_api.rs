// ==========================================
// 文件编码管理 - 编码导入API
// ==========================================
// 职责: 封装导入管道（预览 → 对账 → 批量执行 → 报告/审计）与导出、历史查询
// 说明: 已知父编码集合由调用方（AppState）持有，此处只读取/返回快照
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::domain::document_code::ParentCode;
use crate::domain::import::{ImportBatch, ImportPlan, ImportSummary};
use crate::engine::{BulkApplyOrchestrator, Reconciler};
use crate::importer::error_report::{build_report, write_error_log, ImportReport};
use crate::importer::export_flattener::write_workbook;
use crate::importer::{CodeImporter, SpreadsheetSource};
use crate::repository::{DocumentCodeRepository, ImportBatchRepository};
use chrono::Utc;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, instrument, warn};

/// 预览响应（确认前展示）
#[derive(Debug, Clone, Serialize)]
pub struct ImportPreview {
    /// 源文件名
    pub file_name: String,
    /// 解析出的父编码（含已去重的子编码）
    pub parents: Vec<ParentCode>,
    pub parent_count: usize,
    pub child_count: usize,
}

/// 批量执行响应
#[derive(Debug, Clone, Serialize)]
pub struct ImportOutcome {
    pub summary: ImportSummary,
    pub report: ImportReport,
    /// 失败明细文件（仅在存在失败时生成）
    pub error_log_path: Option<PathBuf>,
    /// 失败明细文件写出失败的原因（明细仍在 report.error_log 中）
    pub error_log_write_error: Option<String>,
    /// 耗时（毫秒）
    pub elapsed_ms: i64,
}

/// 编码导入API
pub struct ImportApi {
    importer: CodeImporter,
    reconciler: Reconciler,
    orchestrator: BulkApplyOrchestrator,
    code_repo: Arc<dyn DocumentCodeRepository>,
    batch_repo: Arc<dyn ImportBatchRepository>,
    error_log_dir: PathBuf,
    export_sheet_name: String,
}

impl ImportApi {
    /// 创建新的ImportApi实例
    ///
    /// # 参数
    /// - code_repo: 远程编码仓储
    /// - batch_repo: 导入审计仓储
    /// - error_log_dir: 失败明细输出目录
    /// - export_sheet_name: 导出工作表名称
    pub fn new(
        code_repo: Arc<dyn DocumentCodeRepository>,
        batch_repo: Arc<dyn ImportBatchRepository>,
        error_log_dir: PathBuf,
        export_sheet_name: String,
    ) -> Self {
        Self {
            importer: CodeImporter::default(),
            reconciler: Reconciler::new(),
            orchestrator: BulkApplyOrchestrator::new(code_repo.clone()),
            code_repo,
            batch_repo,
            error_log_dir,
            export_sheet_name,
        }
    }

    /// 解析文件为待确认的层级
    ///
    /// # 返回
    /// - Err(ApiError::Import): CSV / 无法读取 / 无工作表 / 无有效编码
    pub fn preview(&self, source: &SpreadsheetSource) -> ApiResult<ImportPreview> {
        let parents = self.importer.preview(source)?;
        let child_count = parents.iter().map(|p| p.children.len()).sum();

        Ok(ImportPreview {
            file_name: source.file_name(),
            parent_count: parents.len(),
            child_count,
            parents,
        })
    }

    /// 读取远程全部父编码（对账快照 / 执行后刷新）
    pub async fn fetch_known_parents(&self) -> ApiResult<Vec<ParentCode>> {
        Ok(self.code_repo.list_parents().await?)
    }

    /// 生成对账计划（纯内存）
    pub fn plan(&self, parsed: Vec<ParentCode>, known: &[ParentCode]) -> ImportPlan {
        self.reconciler.plan(parsed, known)
    }

    /// 执行导入计划并生成报告
    ///
    /// 远程调用开始后不再返回错误：单项失败只体现在汇总中，
    /// 明细文件或审计写入失败仅记录告警
    #[instrument(skip(self, plan), fields(parents = plan.parents.len()))]
    pub async fn apply(&self, plan: ImportPlan, file_name: Option<String>) -> ImportOutcome {
        let start = Instant::now();

        let summary = self.orchestrator.apply(plan).await;
        let report = build_report(&summary);
        let (error_log_path, error_log_write_error) =
            match write_error_log(&summary.errors, &self.error_log_dir, &summary.batch_id) {
                Ok(path) => (path, None),
                Err(e) => {
                    warn!(
                        batch_id = %summary.batch_id,
                        dir = %self.error_log_dir.display(),
                        error = %e,
                        "失败明细写出失败"
                    );
                    (None, Some(e.to_string()))
                }
            };
        let elapsed_ms = start.elapsed().as_millis() as i64;

        let batch = ImportBatch::from_summary(&summary, file_name, Utc::now(), elapsed_ms);
        if let Err(e) = self.batch_repo.insert_batch(&batch).await {
            warn!(batch_id = %summary.batch_id, error = %e, "导入审计写入失败");
        }

        info!(
            batch_id = %summary.batch_id,
            notification = ?report.notification,
            elapsed_ms,
            "导入完成"
        );

        ImportOutcome {
            summary,
            report,
            error_log_path,
            error_log_write_error,
            elapsed_ms,
        }
    }

    /// 导出层级到工作簿
    ///
    /// # 返回
    /// - Ok(usize): 写出的数据行数（不含表头）
    pub fn export(&self, parents: &[ParentCode], path: &Path) -> ApiResult<usize> {
        if parents.is_empty() {
            return Err(ApiError::InvalidInput("没有可导出的编码".to_string()));
        }
        Ok(write_workbook(parents, path, &self.export_sheet_name)?)
    }

    /// 最近的导入批次
    pub async fn recent_batches(&self, limit: usize) -> ApiResult<Vec<ImportBatch>> {
        if limit == 0 {
            return Err(ApiError::InvalidInput("limit 必须大于 0".to_string()));
        }
        Ok(self.batch_repo.get_recent_batches(limit).await?)
    }

    /// 按批次 ID 查询
    pub async fn get_batch(&self, batch_id: &str) -> ApiResult<ImportBatch> {
        Ok(self.batch_repo.get_batch(batch_id).await?)
    }
}
