// ==========================================
// 文件编码管理 - 字段映射器实现
// ==========================================
// 职责: 固定列序 → ImportRow（含清洗）
// 列序: 与导出列序完全一致（见 HEADERS）
// ==========================================

use crate::domain::document_code::ImportRow;
use crate::domain::types::CodeStatus;
use crate::importer::code_importer_trait::{DataCleaner, FieldMapper as FieldMapperTrait};
use crate::importer::data_cleaner::DataCleaner as DataCleanerImpl;
use calamine::Data;

/// 列索引（0 起）
pub mod columns {
    pub const DEPARTMENT_CODE: usize = 0;
    pub const PARENT_CODE: usize = 1;
    pub const DOCUMENT_TYPE: usize = 2;
    pub const DOCUMENT_NAME: usize = 3;
    pub const PARENT_VERSION: usize = 4;
    pub const PARENT_APPROVAL_DATE: usize = 5;
    pub const CHILD_CODE: usize = 6;
    pub const CHILD_DOCUMENT_NAME: usize = 7;
    pub const CHILD_VERSION: usize = 8;
    pub const CHILD_APPROVAL_DATE: usize = 9;
    pub const STATUS: usize = 10;
    /// 可选第 12 列: 父编码状态（缺省时沿用第 11 列）
    pub const PARENT_STATUS: usize = 11;
}

/// 固定 11 列表头（导入时跳过，导出时写入）
pub const HEADERS: [&str; 11] = [
    "Departamento",
    "Código Padre",
    "Tipo Documento",
    "Nombre Documento",
    "Versión Padre",
    "Fecha Aprobación Padre",
    "Código Hijo",
    "Nombre Documento Hijo",
    "Versión Hijo",
    "Fecha Aprobación Hijo",
    "Estado Hijo",
];

pub struct FieldMapper {
    cleaner: Box<dyn DataCleaner>,
}

impl FieldMapper {
    pub fn new(cleaner: Box<dyn DataCleaner>) -> Self {
        Self { cleaner }
    }
}

impl Default for FieldMapper {
    fn default() -> Self {
        Self::new(Box::new(DataCleanerImpl))
    }
}

impl FieldMapperTrait for FieldMapper {
    fn map_to_import_row(&self, cells: &[Data], row_number: usize) -> Option<ImportRow> {
        let text = |idx: usize| self.cleaner.cell_text(cells.get(idx));

        // 父编码为空: 无法锚定父编码，直接丢弃
        let parent_code = text(columns::PARENT_CODE);
        if parent_code.is_empty() {
            return None;
        }

        let child_status = CodeStatus::from_cell(&text(columns::STATUS));
        let parent_status = CodeStatus::parse(&text(columns::PARENT_STATUS)).unwrap_or(child_status);

        Some(ImportRow {
            row_number,
            department_code: text(columns::DEPARTMENT_CODE),
            parent_code,
            document_type: text(columns::DOCUMENT_TYPE),
            document_name: text(columns::DOCUMENT_NAME),
            parent_version: self.cleaner.cell_version(cells.get(columns::PARENT_VERSION)),
            parent_approval_date: self.cleaner.cell_date(cells.get(columns::PARENT_APPROVAL_DATE)),
            parent_status,
            child_code: text(columns::CHILD_CODE),
            child_document_name: text(columns::CHILD_DOCUMENT_NAME),
            child_version: self.cleaner.cell_version(cells.get(columns::CHILD_VERSION)),
            child_approval_date: self.cleaner.cell_date(cells.get(columns::CHILD_APPROVAL_DATE)),
            child_status,
        })
    }
}
