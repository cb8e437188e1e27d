// ==========================================
// 文件编码管理 - 编码导入器
// ==========================================
// 职责: 整合同步解析管道，从文件到待确认的层级
// 流程: 解析 → 映射（含清洗）→ 层级构建
// 说明: 纯同步计算，不发起任何远程调用
// ==========================================

use crate::domain::document_code::{ImportRow, ParentCode};
use crate::importer::code_importer_trait::{FieldMapper, FileParser, HierarchyBuilder};
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::field_mapper::FieldMapper as FieldMapperImpl;
use crate::importer::file_parser::{ExcelParser, SpreadsheetSource};
use crate::importer::hierarchy_builder::HierarchyBuilder as HierarchyBuilderImpl;
use tracing::{debug, error, info, instrument};

pub struct CodeImporter {
    file_parser: Box<dyn FileParser>,
    field_mapper: Box<dyn FieldMapper>,
    hierarchy_builder: Box<dyn HierarchyBuilder>,
}

impl CodeImporter {
    pub fn new(
        file_parser: Box<dyn FileParser>,
        field_mapper: Box<dyn FieldMapper>,
        hierarchy_builder: Box<dyn HierarchyBuilder>,
    ) -> Self {
        Self {
            file_parser,
            field_mapper,
            hierarchy_builder,
        }
    }

    /// 步骤 1-2: 解析文件并映射为 ImportRow（按文件顺序）
    #[instrument(skip(self, source), fields(file = %source.file_name()))]
    pub fn parse_rows(&self, source: &SpreadsheetSource) -> ImportResult<Vec<ImportRow>> {
        let raw_rows = self.file_parser.parse_to_raw_rows(source).map_err(|e| {
            error!(error = %e, "文件解析失败");
            e
        })?;

        let total_rows = raw_rows.len();
        let rows: Vec<ImportRow> = raw_rows
            .into_iter()
            .filter_map(|(row_number, cells)| self.field_mapper.map_to_import_row(&cells, row_number))
            .collect();

        debug!(
            total_rows,
            mapped = rows.len(),
            skipped = total_rows - rows.len(),
            "字段映射完成"
        );
        Ok(rows)
    }

    /// 步骤 3: 折叠为层级，供用户确认
    ///
    /// # 返回
    /// - Err(ImportError::NoValidCodes): 没有任何有效父编码，流程在确认前终止
    pub fn preview(&self, source: &SpreadsheetSource) -> ImportResult<Vec<ParentCode>> {
        let rows = self.parse_rows(source)?;
        let parents = self.hierarchy_builder.build(&rows);

        if parents.is_empty() {
            return Err(ImportError::NoValidCodes);
        }

        info!(
            file = %source.file_name(),
            parents = parents.len(),
            children = parents.iter().map(|p| p.children.len()).sum::<usize>(),
            "文件解析完成，等待确认"
        );
        Ok(parents)
    }
}

impl Default for CodeImporter {
    fn default() -> Self {
        Self::new(
            Box::new(ExcelParser),
            Box::new(FieldMapperImpl::default()),
            Box::new(HierarchyBuilderImpl),
        )
    }
}
