// ==========================================
// 文件编码管理 - 批量执行编排器
// ==========================================
// 职责: 按导入计划依次调用远程创建接口，逐项记录成功/失败
// 顺序: 父编码严格串行（按解析顺序），子编码在其父编码之后串行
// 失败策略:
// - 父编码创建失败 → 记录错误，跳过其全部子编码，继续下一个父编码
// - 子编码创建失败 → 记录错误（含父/子编码），继续下一个子编码
// - 单项失败不重试，不中断批次
// ==========================================

use crate::domain::import::{
    ImportErrorLog, ImportPlan, ImportSummary, ParentApplyResult, ParentApplyStatus,
    ParentOutcome, PlannedParent,
};
use crate::i18n::t_with_args;
use crate::repository::document_code_repo::DocumentCodeRepository;
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

// ==========================================
// ApplyTally - 折叠累加器
// ==========================================
// 每处理一个父编码产出一个新的累加器
#[derive(Debug, Default)]
struct ApplyTally {
    parents: Vec<ParentApplyResult>,
    errors: ImportErrorLog,
    failure_count: usize,
}

impl ApplyTally {
    fn into_summary(self, batch_id: String) -> ImportSummary {
        let success_count = self.parents.iter().filter(|p| p.counts_as_success()).count();
        let created_parents = self
            .parents
            .iter()
            .filter(|p| matches!(p.status, ParentApplyStatus::Created { .. }))
            .count();
        let created_children = self.parents.iter().map(|p| p.children_created).sum();
        let skipped_children = self.parents.iter().map(|p| p.children_skipped).sum();

        ImportSummary {
            batch_id,
            total_parents: self.parents.len(),
            success_count,
            failure_count: self.failure_count,
            created_parents,
            created_children,
            skipped_children,
            parents: self.parents,
            errors: self.errors,
        }
    }
}

// ==========================================
// BulkApplyOrchestrator - 批量执行编排器
// ==========================================
pub struct BulkApplyOrchestrator {
    repository: Arc<dyn DocumentCodeRepository>,
}

impl BulkApplyOrchestrator {
    /// 创建新的编排器实例
    ///
    /// # 参数
    /// - repository: 远程编码仓储
    pub fn new(repository: Arc<dyn DocumentCodeRepository>) -> Self {
        Self { repository }
    }

    /// 执行导入计划（自动生成批次 ID）
    pub async fn apply(&self, plan: ImportPlan) -> ImportSummary {
        self.apply_with_batch_id(plan, Uuid::new_v4().to_string())
            .await
    }

    /// 执行导入计划
    ///
    /// # 返回
    /// 不可变的执行汇总；单项失败不会以 Err 形式返回
    #[instrument(skip(self, plan), fields(batch_id = %batch_id, parents = plan.parents.len()))]
    pub async fn apply_with_batch_id(&self, plan: ImportPlan, batch_id: String) -> ImportSummary {
        info!(
            expected_remote_calls = plan.expected_remote_calls(),
            "开始批量执行"
        );

        let tally = stream::iter(plan.parents)
            .fold(ApplyTally::default(), |tally, planned| {
                let repository = Arc::clone(&self.repository);
                async move { apply_parent(repository.as_ref(), planned, tally).await }
            })
            .await;

        let summary = tally.into_summary(batch_id);
        info!(
            success_count = summary.success_count,
            failure_count = summary.failure_count,
            created_parents = summary.created_parents,
            created_children = summary.created_children,
            skipped_children = summary.skipped_children,
            "批量执行完成"
        );
        summary
    }
}

/// 处理单个父编码及其子编码
async fn apply_parent(
    repository: &dyn DocumentCodeRepository,
    planned: PlannedParent,
    mut tally: ApplyTally,
) -> ApplyTally {
    let code = planned.parent.code.clone();
    let children_skipped = planned.children.len() - planned.children_to_create().count();

    let status = match planned.outcome {
        ParentOutcome::Reuse { existing_id } => {
            debug!(parent_code = %code, existing_id, "复用已有父编码");
            ParentApplyStatus::Reused { id: existing_id }
        }
        ParentOutcome::Create => match repository.create_parent(&planned.parent.to_fields()).await {
            Ok(created) => {
                debug!(parent_code = %code, id = created.id, "父编码已创建");
                ParentApplyStatus::Created { id: created.id }
            }
            Err(err) => {
                let reason = err.to_string();
                warn!(parent_code = %code, reason = %reason, "父编码创建失败，跳过其子编码");
                tally.errors.push(t_with_args(
                    "import.parent_failed",
                    &[("code", code.as_str()), ("reason", reason.as_str())],
                ));
                tally.failure_count += 1;
                tally.parents.push(ParentApplyResult {
                    code,
                    status: ParentApplyStatus::Failed,
                    children_created: 0,
                    children_skipped,
                    children_failed: 0,
                });
                return tally;
            }
        },
    };

    let parent_id = match status {
        ParentApplyStatus::Created { id } | ParentApplyStatus::Reused { id } => id,
        ParentApplyStatus::Failed => return tally,
    };

    let mut children_created = 0;
    let mut children_failed = 0;
    for child in planned.children_to_create() {
        match repository.create_child(parent_id, &child.to_fields()).await {
            Ok(created) => {
                debug!(parent_code = %code, child_code = %child.code, id = created.id, "子编码已创建");
                children_created += 1;
            }
            Err(err) => {
                let reason = err.to_string();
                warn!(
                    parent_code = %code,
                    child_code = %child.code,
                    reason = %reason,
                    "子编码创建失败"
                );
                tally.errors.push(t_with_args(
                    "import.child_failed",
                    &[
                        ("code", child.code.as_str()),
                        ("parent", code.as_str()),
                        ("reason", reason.as_str()),
                    ],
                ));
                tally.failure_count += 1;
                children_failed += 1;
            }
        }
    }

    tally.parents.push(ParentApplyResult {
        code,
        status,
        children_created,
        children_skipped,
        children_failed,
    });
    tally
}
