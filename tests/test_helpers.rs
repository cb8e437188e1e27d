// ==========================================
// 测试辅助函数
// ==========================================
// 职责: 临时数据库、内存版远程仓储、测试工作簿生成
// ==========================================

#![allow(dead_code)]

use async_trait::async_trait;
use doc_codes::api::ImportApi;
use doc_codes::db::open_sqlite_connection;
use doc_codes::domain::{ChildCode, ChildFields, CreatedRecord, ParentCode, ParentFields};
use doc_codes::repository::{
    DocumentCodeRepository, ImportBatchRepository, ImportBatchRepositoryImpl, RepositoryError,
    RepositoryResult,
};
use rust_xlsxwriter::{Format, Workbook};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::{NamedTempFile, TempDir};

/// 创建临时测试数据库并初始化 schema
///
/// # 返回
/// - NamedTempFile: 临时数据库文件（需要保持存活）
/// - String: 数据库文件路径
pub fn create_test_db() -> (NamedTempFile, String) {
    doc_codes::logging::init_test();
    let temp_file = NamedTempFile::new().unwrap();
    let db_path = temp_file.path().to_str().unwrap().to_string();
    open_sqlite_connection(&db_path).unwrap();
    (temp_file, db_path)
}

// ==========================================
// MockCodeRepository - 内存版远程编码服务
// ==========================================
// - 创建成功的记录立即出现在 list_parents 中
// - failing 中的编码（父或子）创建时返回 409
#[derive(Default)]
pub struct MockCodeRepository {
    parents: Mutex<Vec<ParentCode>>,
    failing: Mutex<HashSet<String>>,
    calls: Mutex<Vec<String>>,
    next_id: Mutex<i64>,
}

impl MockCodeRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// 预置已存在的父编码
    pub fn with_parents(parents: Vec<ParentCode>) -> Self {
        let next_id = parents
            .iter()
            .flat_map(|p| std::iter::once(p.id).chain(p.children.iter().map(|c| c.id)))
            .max()
            .unwrap_or(0);
        Self {
            parents: Mutex::new(parents),
            next_id: Mutex::new(next_id),
            ..Self::default()
        }
    }

    pub fn fail_on(&self, code: &str) {
        self.failing.lock().unwrap().insert(code.to_string());
    }

    /// 创建调用记录（按调用顺序）
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn stored(&self) -> Vec<ParentCode> {
        self.parents.lock().unwrap().clone()
    }

    fn allocate_id(&self) -> i64 {
        let mut next = self.next_id.lock().unwrap();
        *next += 1;
        *next
    }

    fn check(&self, code: &str) -> RepositoryResult<()> {
        if self.failing.lock().unwrap().contains(code) {
            return Err(RepositoryError::Remote {
                status: 409,
                message: format!("El código {} no es válido", code),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentCodeRepository for MockCodeRepository {
    async fn list_parents(&self) -> RepositoryResult<Vec<ParentCode>> {
        Ok(self.stored())
    }

    async fn create_parent(&self, fields: &ParentFields) -> RepositoryResult<CreatedRecord> {
        self.calls.lock().unwrap().push(format!("parent:{}", fields.code));
        self.check(&fields.code)?;

        let id = self.allocate_id();
        self.parents.lock().unwrap().push(ParentCode {
            id,
            code: fields.code.clone(),
            document_type: fields.document_type.clone(),
            document_name: fields.document_name.clone(),
            department_code: fields.department_code.clone(),
            approval_date: fields.approval_date.clone(),
            version: fields.version,
            status: fields.status,
            children: Vec::new(),
        });
        Ok(CreatedRecord { id })
    }

    async fn create_child(
        &self,
        parent_id: i64,
        fields: &ChildFields,
    ) -> RepositoryResult<CreatedRecord> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("child:{}@{}", fields.code, parent_id));
        self.check(&fields.code)?;

        let id = self.allocate_id();
        let mut parents = self.parents.lock().unwrap();
        let parent = parents
            .iter_mut()
            .find(|p| p.id == parent_id)
            .ok_or_else(|| RepositoryError::Remote {
                status: 404,
                message: format!("parent {} not found", parent_id),
            })?;
        parent.children.push(ChildCode {
            id,
            code: fields.code.clone(),
            document_name: fields.document_name.clone(),
            approval_date: fields.approval_date.clone(),
            version: fields.version,
            status: fields.status,
            parent_id,
        });
        Ok(CreatedRecord { id })
    }
}

/// 用内存仓储 + 临时数据库组装 ImportApi
pub fn build_import_api(
    code_repo: Arc<MockCodeRepository>,
    db_path: &str,
    error_log_dir: &Path,
) -> ImportApi {
    let batch_repo: Arc<dyn ImportBatchRepository> =
        Arc::new(ImportBatchRepositoryImpl::new(db_path).unwrap());
    ImportApi::new(
        code_repo,
        batch_repo,
        error_log_dir.to_path_buf(),
        "Codigos".to_string(),
    )
}

// ==========================================
// 测试工作簿
// ==========================================

/// 一个单元格
#[derive(Debug, Clone)]
pub enum Cell {
    Text(&'static str),
    Number(f64),
    /// 日期格式的数值单元格（读取时为原生日期）
    Date(f64),
    Empty,
}

/// 标准 11 列数据行（字符串版）
pub fn text_row(values: [&'static str; 11]) -> Vec<Cell> {
    values
        .into_iter()
        .map(|v| if v.is_empty() { Cell::Empty } else { Cell::Text(v) })
        .collect()
}

/// 写出测试工作簿（第 1 行为表头）
pub fn write_test_workbook(dir: &TempDir, name: &str, rows: &[Vec<Cell>]) -> PathBuf {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    let date_format = Format::new().set_num_format("yyyy-mm-dd");

    for (col, header) in doc_codes::importer::HEADERS.iter().enumerate() {
        worksheet.write_string(0, col as u16, *header).unwrap();
    }

    for (r, row) in rows.iter().enumerate() {
        let r = (r + 1) as u32;
        for (c, cell) in row.iter().enumerate() {
            let c = c as u16;
            match cell {
                Cell::Text(v) => {
                    worksheet.write_string(r, c, *v).unwrap();
                }
                Cell::Number(v) => {
                    worksheet.write_number(r, c, *v).unwrap();
                }
                Cell::Date(v) => {
                    worksheet.write_number_with_format(r, c, *v, &date_format).unwrap();
                }
                Cell::Empty => {}
            }
        }
    }

    let path = dir.path().join(name);
    workbook.save(&path).unwrap();
    path
}
