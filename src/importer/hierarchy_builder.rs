// ==========================================
// 文件编码管理 - 层级构建器实现
// ==========================================
// 阶段 2: 反范式行 → 父编码（含去重子编码列表）
// 去重策略: 首次出现优先；批次内重复直接丢弃，不计为错误
// ==========================================

use crate::domain::document_code::{ImportRow, ParentCode};
use crate::importer::code_importer_trait::HierarchyBuilder as HierarchyBuilderTrait;
use std::collections::{HashMap, HashSet};
use tracing::debug;

pub struct HierarchyBuilder;

impl HierarchyBuilderTrait for HierarchyBuilder {
    fn build(&self, rows: &[ImportRow]) -> Vec<ParentCode> {
        let mut parents: Vec<ParentCode> = Vec::new();
        // 父编码 → parents 下标（保持首次出现顺序）
        let mut first_occurrence: HashMap<&str, usize> = HashMap::new();
        // 每个父编码下已出现的子编码
        let mut seen_children: Vec<HashSet<&str>> = Vec::new();
        let mut dropped_children = 0usize;

        for row in rows {
            if row.parent_code.is_empty() {
                continue;
            }

            let idx = match first_occurrence.get(row.parent_code.as_str()) {
                Some(idx) => *idx,
                None => {
                    parents.push(row.to_parent());
                    seen_children.push(HashSet::new());
                    let idx = parents.len() - 1;
                    first_occurrence.insert(row.parent_code.as_str(), idx);
                    idx
                }
            };

            if !row.has_child() {
                continue;
            }

            if seen_children[idx].insert(row.child_code.as_str()) {
                parents[idx].children.push(row.to_child());
            } else {
                dropped_children += 1;
                debug!(
                    row_number = row.row_number,
                    parent_code = %row.parent_code,
                    child_code = %row.child_code,
                    "批次内重复子编码，已丢弃"
                );
            }
        }

        debug!(
            rows = rows.len(),
            parents = parents.len(),
            dropped_children,
            "层级构建完成"
        );

        parents
    }
}
