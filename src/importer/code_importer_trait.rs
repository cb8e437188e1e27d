// ==========================================
// 文件编码管理 - 编码导入 Trait
// ==========================================
// 职责: 定义导入管道各阶段接口（不包含实现）
// 管道: 文件解析 → 字段映射（含清洗）→ 层级构建
// ==========================================

use crate::domain::document_code::{ImportRow, ParentCode};
use crate::importer::error::ImportResult;
use crate::importer::file_parser::SpreadsheetSource;
use calamine::Data;

// ==========================================
// FileParser Trait
// ==========================================
// 用途: 文件解析接口（阶段 0）
// 实现者: ExcelParser
pub trait FileParser: Send + Sync {
    /// 读取第一个工作表的数据行（已跳过表头）
    ///
    /// # 返回
    /// - Ok(Vec<(行号, 单元格)>): 行号从 1 开始计（表头为第 1 行）
    /// - Err: CSV 拒绝 / 文件无法打开 / 无工作表
    fn parse_to_raw_rows(&self, source: &SpreadsheetSource) -> ImportResult<Vec<(usize, Vec<Data>)>>;
}

// ==========================================
// FieldMapper Trait
// ==========================================
// 用途: 字段映射接口（阶段 1）
// 实现者: FieldMapper
pub trait FieldMapper: Send + Sync {
    /// 将原始单元格映射为 ImportRow
    ///
    /// # 返回
    /// - Some(ImportRow): 映射成功
    /// - None: 父编码为空（静默丢弃，不计为错误）
    fn map_to_import_row(&self, cells: &[Data], row_number: usize) -> Option<ImportRow>;
}

// ==========================================
// DataCleaner Trait
// ==========================================
// 用途: 单元格标准化接口
// 实现者: DataCleaner
pub trait DataCleaner: Send + Sync {
    /// 单元格 → 去空白文本（空单元格返回空字符串）
    fn cell_text(&self, cell: Option<&Data>) -> String;

    /// 单元格 → 版本号（无法解析或 < 1 时回落为 1）
    fn cell_version(&self, cell: Option<&Data>) -> i32;

    /// 单元格 → ISO 日期 YYYY-MM-DD（无法识别返回空字符串）
    fn cell_date(&self, cell: Option<&Data>) -> String;
}

// ==========================================
// HierarchyBuilder Trait
// ==========================================
// 用途: 行折叠为父→子层级（阶段 2）
// 实现者: HierarchyBuilder
pub trait HierarchyBuilder: Send + Sync {
    /// 折叠导入行
    ///
    /// # 规则
    /// - 父编码按首次出现顺序，首次出现的父字段生效
    /// - 同一父编码下子编码按业务编码去重，保留首次出现
    fn build(&self, rows: &[ImportRow]) -> Vec<ParentCode>;
}
