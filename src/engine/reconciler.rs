// ==========================================
// 文件编码管理 - 对账引擎
// ==========================================
// 职责: 解析出的层级 × 已知父编码快照 → 导入计划
// 输入: 层级构建器输出 + 导入前的已知父编码（ID 已分配）
// 输出: ImportPlan（每个父编码 REUSE/CREATE，每个子编码 SKIP/CREATE）
// 红线: 纯内存计算，不发起任何远程调用
// ==========================================

use crate::domain::document_code::ParentCode;
use crate::domain::import::{
    ChildOutcome, ImportPlan, ParentOutcome, PlannedChild, PlannedParent,
};
use std::collections::HashMap;
use tracing::{debug, instrument};

// ==========================================
// Reconciler - 对账引擎
// ==========================================
#[derive(Debug, Default, Clone, Copy)]
pub struct Reconciler;

impl Reconciler {
    pub fn new() -> Self {
        Self
    }

    /// 生成导入计划
    ///
    /// # 规则
    /// - 父编码按业务编码精确匹配已知集合；未命中 → CREATE（子编码全部 CREATE）
    /// - 命中 → REUSE(已知 ID)；子编码已存在于已知父编码下 → SKIP，否则 CREATE
    /// - 计划顺序与解析顺序一致
    #[instrument(skip_all, fields(parsed = parsed.len(), known = known.len()))]
    pub fn plan(&self, parsed: Vec<ParentCode>, known: &[ParentCode]) -> ImportPlan {
        // 已知集合中若有重复业务编码，以第一条为准
        let mut index: HashMap<&str, &ParentCode> = HashMap::with_capacity(known.len());
        for parent in known {
            index.entry(parent.code.as_str()).or_insert(parent);
        }

        let parents = parsed
            .into_iter()
            .map(|parent| match index.get(parent.code.as_str()) {
                Some(existing) => Self::plan_reuse(parent, existing),
                None => Self::plan_create(parent),
            })
            .collect::<Vec<_>>();

        let plan = ImportPlan { parents };
        debug!(
            parents_to_create = plan.parents_to_create(),
            children_to_create = plan.children_to_create(),
            children_to_skip = plan.children_to_skip(),
            "对账完成"
        );
        plan
    }

    fn plan_create(mut parent: ParentCode) -> PlannedParent {
        let children = std::mem::take(&mut parent.children)
            .into_iter()
            .map(|child| PlannedChild {
                child,
                outcome: ChildOutcome::Create,
            })
            .collect();

        PlannedParent {
            parent,
            outcome: ParentOutcome::Create,
            children,
        }
    }

    fn plan_reuse(mut parent: ParentCode, existing: &ParentCode) -> PlannedParent {
        let children = std::mem::take(&mut parent.children)
            .into_iter()
            .map(|child| {
                let outcome = if existing.has_child(&child.code) {
                    ChildOutcome::Skip
                } else {
                    ChildOutcome::Create
                };
                PlannedChild { child, outcome }
            })
            .collect();

        PlannedParent {
            parent,
            outcome: ParentOutcome::Reuse {
                existing_id: existing.id,
            },
            children,
        }
    }
}
