// ==========================================
// 文件编码管理 - 导入层
// ==========================================
// 职责: 表格文件 → 父/子编码层级；层级 → 导出表格；结果报告
// 支持: Excel 工作簿（拒绝 CSV）
// ==========================================

// 模块声明
pub mod code_importer;
pub mod code_importer_trait;
pub mod data_cleaner;
pub mod error;
pub mod error_report;
pub mod export_flattener;
pub mod field_mapper;
pub mod file_parser;
pub mod hierarchy_builder;

// 重导出核心类型
pub use code_importer::CodeImporter;
pub use data_cleaner::DataCleaner as DataCleanerImpl;
pub use error::{ImportError, ImportResult};
pub use error_report::{build_report, ImportNotification, ImportReport};
pub use export_flattener::{flatten, write_workbook, ExportRow};
pub use field_mapper::{FieldMapper as FieldMapperImpl, HEADERS};
pub use file_parser::{ExcelParser, SpreadsheetSource};
pub use hierarchy_builder::HierarchyBuilder as HierarchyBuilderImpl;

// 重导出 Trait 接口
pub use code_importer_trait::{DataCleaner, FieldMapper, FileParser, HierarchyBuilder};
