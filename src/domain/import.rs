// ==========================================
// 文件编码管理 - 导入领域模型
// ==========================================
// 职责: 对账计划 / 执行汇总 / 错误日志 / 导入批次审计
// 生命周期: 计划与汇总每次导入重新计算，不持久化（批次审计除外）
// ==========================================

use crate::domain::document_code::{ChildCode, ParentCode};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ==========================================
// ReconciliationOutcome - 对账结论
// ==========================================

/// 父编码对账结论
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ParentOutcome {
    Reuse { existing_id: i64 }, // 远程已存在，复用其 ID
    Create,                     // 需要创建
}

/// 子编码对账结论
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChildOutcome {
    Skip,   // 已存在于复用的父编码下
    Create, // 需要创建
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedChild {
    pub child: ChildCode,
    pub outcome: ChildOutcome,
}

/// 单个父编码的执行计划
///
/// `parent.children` 已移入 `children`，此处为空列表
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedParent {
    pub parent: ParentCode,
    pub outcome: ParentOutcome,
    pub children: Vec<PlannedChild>,
}

impl PlannedParent {
    pub fn children_to_create(&self) -> impl Iterator<Item = &ChildCode> {
        self.children
            .iter()
            .filter(|c| c.outcome == ChildOutcome::Create)
            .map(|c| &c.child)
    }
}

// ==========================================
// ImportPlan - 对账计划
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportPlan {
    pub parents: Vec<PlannedParent>,
}

impl ImportPlan {
    pub fn parents_to_create(&self) -> usize {
        self.parents
            .iter()
            .filter(|p| p.outcome == ParentOutcome::Create)
            .count()
    }

    pub fn children_to_create(&self) -> usize {
        self.parents.iter().map(|p| p.children_to_create().count()).sum()
    }

    pub fn children_to_skip(&self) -> usize {
        self.parents
            .iter()
            .flat_map(|p| p.children.iter())
            .filter(|c| c.outcome == ChildOutcome::Skip)
            .count()
    }

    /// 全部成功时将发出的远程创建调用数
    pub fn expected_remote_calls(&self) -> usize {
        self.parents_to_create() + self.children_to_create()
    }

    /// 计划中没有任何创建动作
    pub fn is_noop(&self) -> bool {
        self.expected_remote_calls() == 0
    }
}

// ==========================================
// 执行结果
// ==========================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ParentApplyStatus {
    Created { id: i64 },
    Reused { id: i64 },
    Failed,
}

/// 单个父编码的执行结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParentApplyResult {
    pub code: String,
    pub status: ParentApplyStatus,
    pub children_created: usize,
    pub children_skipped: usize,
    pub children_failed: usize,
}

impl ParentApplyResult {
    /// 是否计入成功数: 新建父编码，或复用且至少新建了一个子编码
    pub fn counts_as_success(&self) -> bool {
        match self.status {
            ParentApplyStatus::Created { .. } => true,
            ParentApplyStatus::Reused { .. } => self.children_created > 0,
            ParentApplyStatus::Failed => false,
        }
    }
}

// ==========================================
// ImportErrorLog - 失败明细
// ==========================================
// 一条失败的创建调用对应一行，按记录顺序
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImportErrorLog {
    lines: Vec<String>,
}

impl ImportErrorLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: impl Into<String>) {
        // 单行化，保证“一行一条”
        let message: String = message.into();
        self.lines.push(message.replace(['\r', '\n'], " "));
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// 纯文本内容（每行一条，末尾换行）
    pub fn to_text(&self) -> String {
        let mut text = self.lines.join("\n");
        if !text.is_empty() {
            text.push('\n');
        }
        text
    }
}

// ==========================================
// ImportSummary - 执行汇总（不可变）
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportSummary {
    pub batch_id: String,
    pub total_parents: usize,    // 计划内父编码数
    pub success_count: usize,    // 成功父编码数（见 counts_as_success）
    pub failure_count: usize,    // 失败的创建调用数
    pub created_parents: usize,
    pub created_children: usize,
    pub skipped_children: usize,
    pub parents: Vec<ParentApplyResult>,
    pub errors: ImportErrorLog,
}

impl ImportSummary {
    pub fn has_failures(&self) -> bool {
        self.failure_count > 0
    }

    /// 全部已存在: 没有任何新增也没有失败
    pub fn is_noop(&self) -> bool {
        self.success_count == 0 && self.failure_count == 0
    }
}

// ==========================================
// ImportBatch - 导入批次审计记录
// ==========================================
// 对齐: import_batch 表
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportBatch {
    pub batch_id: String,             // 批次 ID（UUID）
    pub file_name: Option<String>,    // 源文件名
    pub total_parents: i64,           // 计划内父编码数
    pub success_count: i64,           // 成功父编码数
    pub failure_count: i64,           // 失败调用数
    pub created_parents: i64,         // 新建父编码数
    pub created_children: i64,        // 新建子编码数
    pub skipped_children: i64,        // 跳过的子编码数
    pub error_lines: Vec<String>,     // 失败明细
    pub imported_at: DateTime<Utc>,   // 完成时间
    pub elapsed_ms: i64,              // 耗时（毫秒）
}

impl ImportBatch {
    pub fn from_summary(
        summary: &ImportSummary,
        file_name: Option<String>,
        imported_at: DateTime<Utc>,
        elapsed_ms: i64,
    ) -> Self {
        Self {
            batch_id: summary.batch_id.clone(),
            file_name,
            total_parents: summary.total_parents as i64,
            success_count: summary.success_count as i64,
            failure_count: summary.failure_count as i64,
            created_parents: summary.created_parents as i64,
            created_children: summary.created_children as i64,
            skipped_children: summary.skipped_children as i64,
            error_lines: summary.errors.lines().to_vec(),
            imported_at,
            elapsed_ms,
        }
    }
}
