// ==========================================
// 文件编码管理 - 导出展开器
// ==========================================
// 职责: 层级 → 扁平行（层级构建的逆变换）+ 写出工作簿
// 规则: 无子编码的父编码输出 1 行；N 个子编码输出 N 行
// 列序: 与导入列序一致（见 field_mapper::HEADERS）
// ==========================================

use crate::domain::document_code::ParentCode;
use crate::domain::types::CodeStatus;
use crate::importer::error::ImportResult;
use crate::importer::field_mapper::HEADERS;
use rust_xlsxwriter::{Format, Workbook, Worksheet};
use serde::Serialize;
use std::path::Path;
use tracing::info;

/// 一行导出数据
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportRow {
    pub department_code: String,
    pub parent_code: String,
    pub document_type: String,
    pub document_name: String,
    pub parent_version: i32,
    pub parent_approval_date: String,
    pub child_code: String,
    pub child_document_name: String,
    pub child_version: Option<i32>, // 无子编码时为空单元格
    pub child_approval_date: String,
    pub status: CodeStatus,         // 子编码状态；无子编码时为父编码状态
}

/// 展开层级
pub fn flatten(parents: &[ParentCode]) -> Vec<ExportRow> {
    let mut rows = Vec::new();

    for parent in parents {
        let base = ExportRow {
            department_code: parent.department_code.clone(),
            parent_code: parent.code.clone(),
            document_type: parent.document_type.clone(),
            document_name: parent.document_name.clone(),
            parent_version: parent.version,
            parent_approval_date: parent.approval_date.clone(),
            child_code: String::new(),
            child_document_name: String::new(),
            child_version: None,
            child_approval_date: String::new(),
            status: parent.status,
        };

        if parent.children.is_empty() {
            rows.push(base);
            continue;
        }

        for child in &parent.children {
            rows.push(ExportRow {
                child_code: child.code.clone(),
                child_document_name: child.document_name.clone(),
                child_version: Some(child.version),
                child_approval_date: child.approval_date.clone(),
                status: child.status,
                ..base.clone()
            });
        }
    }

    rows
}

/// 构建工作簿（单工作表，加粗表头）
pub fn build_workbook(parents: &[ParentCode], sheet_name: &str) -> ImportResult<Workbook> {
    let rows = flatten(parents);

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(sheet_name)?;

    let header_format = Format::new().set_bold();
    for (col, name) in HEADERS.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, *name, &header_format)?;
    }

    for (idx, row) in rows.iter().enumerate() {
        write_row(worksheet, (idx + 1) as u32, row)?;
    }

    Ok(workbook)
}

/// 导出到文件
pub fn write_workbook<P: AsRef<Path>>(
    parents: &[ParentCode],
    path: P,
    sheet_name: &str,
) -> ImportResult<usize> {
    let mut workbook = build_workbook(parents, sheet_name)?;
    workbook.save(path.as_ref())?;

    let row_count = flatten(parents).len();
    info!(
        path = %path.as_ref().display(),
        parents = parents.len(),
        rows = row_count,
        "编码导出完成"
    );
    Ok(row_count)
}

/// 导出到内存（下载用）
pub fn workbook_to_buffer(parents: &[ParentCode], sheet_name: &str) -> ImportResult<Vec<u8>> {
    let mut workbook = build_workbook(parents, sheet_name)?;
    Ok(workbook.save_to_buffer()?)
}

fn write_row(ws: &mut Worksheet, row: u32, data: &ExportRow) -> ImportResult<()> {
    write_text(ws, row, 0, &data.department_code)?;
    write_text(ws, row, 1, &data.parent_code)?;
    write_text(ws, row, 2, &data.document_type)?;
    write_text(ws, row, 3, &data.document_name)?;
    ws.write_number(row, 4, data.parent_version as f64)?;
    write_text(ws, row, 5, &data.parent_approval_date)?;
    write_text(ws, row, 6, &data.child_code)?;
    write_text(ws, row, 7, &data.child_document_name)?;
    if let Some(version) = data.child_version {
        ws.write_number(row, 8, version as f64)?;
    }
    write_text(ws, row, 9, &data.child_approval_date)?;
    ws.write_string(row, 10, data.status.as_str())?;
    Ok(())
}

fn write_text(ws: &mut Worksheet, row: u32, col: u16, value: &str) -> ImportResult<()> {
    // 空值留空单元格
    if !value.is_empty() {
        ws.write_string(row, col, value)?;
    }
    Ok(())
}
