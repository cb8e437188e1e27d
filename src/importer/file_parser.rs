// ==========================================
// 文件编码管理 - 文件解析器实现
// ==========================================
// 阶段 0: 文件读取与解析
// 支持: Excel 工作簿（仅第一个工作表）
// 拒绝: CSV（扩展名或 MIME 类型命中即拒绝，不进入解析）
// ==========================================

use crate::importer::code_importer_trait::FileParser;
use crate::importer::error::{ImportError, ImportResult};
use calamine::{open_workbook_auto, Data, Ods, Reader, Xls, Xlsb, Xlsx};
use std::fmt::Display;
use std::io::{Cursor, Read, Seek};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// CSV 的 MIME 类型
const CSV_MIME_TYPES: &[&str] = &["text/csv", "application/csv", "text/comma-separated-values"];

// ==========================================
// SpreadsheetSource - 上传文件
// ==========================================
#[derive(Debug, Clone)]
pub enum SpreadsheetSource {
    /// 本地文件
    Path(PathBuf),
    /// 内存中的上传内容（附声明的文件名/MIME）
    Bytes {
        file_name: String,
        mime_type: Option<String>,
        data: Vec<u8>,
    },
}

impl SpreadsheetSource {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Self {
        SpreadsheetSource::Path(path.as_ref().to_path_buf())
    }

    pub fn from_bytes(file_name: impl Into<String>, mime_type: Option<String>, data: Vec<u8>) -> Self {
        SpreadsheetSource::Bytes {
            file_name: file_name.into(),
            mime_type,
            data,
        }
    }

    /// 文件名（不含目录）
    pub fn file_name(&self) -> String {
        match self {
            SpreadsheetSource::Path(path) => path
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("unknown")
                .to_string(),
            SpreadsheetSource::Bytes { file_name, .. } => file_name.clone(),
        }
    }

    /// 声明的扩展名（小写）
    pub fn extension(&self) -> String {
        let name = match self {
            SpreadsheetSource::Path(path) => path.to_string_lossy().to_string(),
            SpreadsheetSource::Bytes { file_name, .. } => file_name.clone(),
        };
        Path::new(&name)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase()
    }

    pub fn mime_type(&self) -> Option<&str> {
        match self {
            SpreadsheetSource::Path(_) => None,
            SpreadsheetSource::Bytes { mime_type, .. } => mime_type.as_deref(),
        }
    }

    /// 是否为 CSV（扩展名或 MIME 任一命中）
    pub fn is_csv(&self) -> bool {
        let mime_is_csv = self
            .mime_type()
            .map(|m| {
                let m = m.trim().to_lowercase();
                CSV_MIME_TYPES.iter().any(|csv| m.starts_with(csv))
            })
            .unwrap_or(false);
        self.extension() == "csv" || mime_is_csv
    }
}

// ==========================================
// 工作簿格式
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WorkbookFormat {
    Xlsx,
    Xls,
    Xlsb,
    Ods,
}

fn detect_format(source: &SpreadsheetSource) -> ImportResult<WorkbookFormat> {
    if source.is_csv() {
        return Err(ImportError::CsvRejected(source.file_name()));
    }

    match source.extension().as_str() {
        "xlsx" | "xlsm" => Ok(WorkbookFormat::Xlsx),
        "xls" => Ok(WorkbookFormat::Xls),
        "xlsb" => Ok(WorkbookFormat::Xlsb),
        "ods" => Ok(WorkbookFormat::Ods),
        other => Err(ImportError::UnsupportedFormat(other.to_string())),
    }
}

// ==========================================
// Excel Parser 实现
// ==========================================
pub struct ExcelParser;

impl FileParser for ExcelParser {
    fn parse_to_raw_rows(&self, source: &SpreadsheetSource) -> ImportResult<Vec<(usize, Vec<Data>)>> {
        // 格式检查先于任何读取
        let format = detect_format(source)?;

        match source {
            SpreadsheetSource::Path(path) => {
                if !path.exists() {
                    return Err(ImportError::FileNotFound(path.display().to_string()));
                }
                let mut workbook = open_workbook_auto(path)?;
                read_first_sheet(&mut workbook)
            }
            SpreadsheetSource::Bytes { data, .. } => {
                let cursor = Cursor::new(data.as_slice());
                match format {
                    WorkbookFormat::Xlsx => read_first_sheet(&mut open_reader::<_, Xlsx<_>>(cursor)?),
                    WorkbookFormat::Xls => read_first_sheet(&mut open_reader::<_, Xls<_>>(cursor)?),
                    WorkbookFormat::Xlsb => read_first_sheet(&mut open_reader::<_, Xlsb<_>>(cursor)?),
                    WorkbookFormat::Ods => read_first_sheet(&mut open_reader::<_, Ods<_>>(cursor)?),
                }
            }
        }
    }
}

fn open_reader<RS, R>(reader: RS) -> ImportResult<R>
where
    RS: Read + Seek,
    R: Reader<RS>,
    R::Error: Display,
{
    R::new(reader).map_err(|e| ImportError::ExcelParseError(e.to_string()))
}

/// 读取第一个工作表，返回 (行号, 单元格) 列表
///
/// 单元格按工作表绝对列对齐（区域不从 A 列开始时左侧补空）
fn read_first_sheet<RS, R>(workbook: &mut R) -> ImportResult<Vec<(usize, Vec<Data>)>>
where
    RS: Read + Seek,
    R: Reader<RS>,
    R::Error: Display,
{
    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or(ImportError::WorksheetMissing)?;

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| ImportError::ExcelParseError(e.to_string()))?;

    let (start_row, start_col) = range
        .start()
        .map(|(r, c)| (r as usize, c as usize))
        .unwrap_or((0, 0));

    let mut rows = Vec::new();
    for (idx, row) in range.rows().enumerate() {
        let absolute_row = start_row + idx;

        // 第 1 行为表头
        if absolute_row == 0 {
            continue;
        }

        // 跳过完全空白的行
        if row.iter().all(|cell| matches!(cell, Data::Empty)) {
            continue;
        }

        let mut cells = vec![Data::Empty; start_col];
        cells.extend(row.iter().cloned());
        rows.push((absolute_row + 1, cells));
    }

    if rows.is_empty() {
        warn!(sheet = %sheet_name, "工作表无数据行");
    }
    debug!(sheet = %sheet_name, rows = rows.len(), "工作表读取完成");

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_xlsxwriter::Workbook;

    fn workbook_bytes(rows: &[&[&str]]) -> Vec<u8> {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        for (r, row) in rows.iter().enumerate() {
            for (c, value) in row.iter().enumerate() {
                if !value.is_empty() {
                    sheet.write_string(r as u32, c as u16, *value).unwrap();
                }
            }
        }
        workbook.save_to_buffer().unwrap()
    }

    #[test]
    fn test_csv_rejected_by_extension() {
        let parser = ExcelParser;
        let source = SpreadsheetSource::from_path("codigos.csv");
        let result = parser.parse_to_raw_rows(&source);
        assert!(matches!(result, Err(ImportError::CsvRejected(_))));
    }

    #[test]
    fn test_csv_rejected_by_mime() {
        let parser = ExcelParser;
        let source = SpreadsheetSource::from_bytes(
            "codigos.xlsx",
            Some("text/csv; charset=utf-8".to_string()),
            b"a,b,c".to_vec(),
        );
        let result = parser.parse_to_raw_rows(&source);
        assert!(matches!(result, Err(ImportError::CsvRejected(_))));
    }

    #[test]
    fn test_unsupported_extension() {
        let parser = ExcelParser;
        let source = SpreadsheetSource::from_bytes("codigos.txt", None, vec![]);
        let result = parser.parse_to_raw_rows(&source);
        assert!(matches!(result, Err(ImportError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_file_not_found() {
        let parser = ExcelParser;
        let source = SpreadsheetSource::from_path("non_existent.xlsx");
        let result = parser.parse_to_raw_rows(&source);
        assert!(matches!(result, Err(ImportError::FileNotFound(_))));
    }

    #[test]
    fn test_unreadable_workbook() {
        let parser = ExcelParser;
        let source = SpreadsheetSource::from_bytes("codigos.xlsx", None, b"not a zip".to_vec());
        let result = parser.parse_to_raw_rows(&source);
        assert!(matches!(result, Err(ImportError::ExcelParseError(_))));
    }

    #[test]
    fn test_header_skipped_and_blank_rows_dropped() {
        let bytes = workbook_bytes(&[
            &["Departamento", "Código Padre"],
            &["RRHH", "VAL-001"],
            &["", ""],
            &["RRHH", "VAL-002"],
        ]);

        let parser = ExcelParser;
        let source = SpreadsheetSource::from_bytes("codigos.xlsx", None, bytes);
        let rows = parser.parse_to_raw_rows(&source).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].0, 2);
        assert_eq!(rows[1].0, 4);
        assert_eq!(rows[1].1[1], Data::String("VAL-002".to_string()));
    }

    #[test]
    fn test_columns_stay_aligned_when_first_column_empty() {
        let bytes = workbook_bytes(&[
            &["", "Código Padre", "Tipo"],
            &["", "VAL-001", "PMV"],
        ]);

        let parser = ExcelParser;
        let source = SpreadsheetSource::from_bytes("codigos.xlsx", None, bytes);
        let rows = parser.parse_to_raw_rows(&source).unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].1[0], Data::Empty);
        assert_eq!(rows[0].1[1], Data::String("VAL-001".to_string()));
    }
}
