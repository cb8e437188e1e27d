// ==========================================
// 文件编码管理 - 编码领域模型
// ==========================================
// 职责: 父编码 / 子编码 / 导入行
// 红线: 业务编码（code）是去重与对账的唯一自然键
// ==========================================

use crate::domain::types::CodeStatus;
use serde::{Deserialize, Serialize};

/// 未落库记录的占位 ID
pub const UNPERSISTED_ID: i64 = 0;

// ==========================================
// ParentCode - 父编码
// ==========================================
// 生命周期: 导入时由层级构建器创建（id=0），或从远程 API 读取（id 已分配）
// 所有权: 父编码独占其子编码列表
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParentCode {
    #[serde(default)]
    pub id: i64,                  // 远程 ID（0 = 未落库）
    pub code: String,             // 业务编码（批次内唯一）
    #[serde(default)]
    pub document_type: String,    // 文件类型
    #[serde(default)]
    pub document_name: String,    // 文件名称
    #[serde(default)]
    pub department_code: String,  // 部门编码
    #[serde(default)]
    pub approval_date: String,    // 批准日期（YYYY-MM-DD 或空）
    #[serde(default = "default_version")]
    pub version: i32,             // 版本号（>= 1）
    #[serde(default)]
    pub status: CodeStatus,       // 状态
    #[serde(default)]
    pub children: Vec<ChildCode>, // 子编码（有序、已去重）
}

impl ParentCode {
    pub fn is_persisted(&self) -> bool {
        self.id != UNPERSISTED_ID
    }

    /// 按业务编码查找子编码（区分大小写，精确匹配）
    pub fn find_child(&self, code: &str) -> Option<&ChildCode> {
        self.children.iter().find(|c| c.code == code)
    }

    pub fn has_child(&self, code: &str) -> bool {
        self.find_child(code).is_some()
    }

    /// 远程创建请求体
    pub fn to_fields(&self) -> ParentFields {
        ParentFields {
            code: self.code.clone(),
            document_type: self.document_type.clone(),
            document_name: self.document_name.clone(),
            department_code: self.department_code.clone(),
            approval_date: self.approval_date.clone(),
            version: self.version,
            status: self.status,
        }
    }
}

// ==========================================
// ChildCode - 子编码
// ==========================================
// 红线: 业务编码唯一性仅在所属父编码内
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChildCode {
    #[serde(default)]
    pub id: i64,               // 远程 ID（0 = 未落库）
    pub code: String,          // 业务编码（父编码内唯一）
    #[serde(default)]
    pub document_name: String, // 文件名称
    #[serde(default)]
    pub approval_date: String, // 批准日期（YYYY-MM-DD 或空）
    #[serde(default = "default_version")]
    pub version: i32,          // 版本号
    #[serde(default)]
    pub status: CodeStatus,    // 状态
    #[serde(default)]
    pub parent_id: i64,        // 所属父编码 ID（引用，非所有权）
}

impl ChildCode {
    pub fn to_fields(&self) -> ChildFields {
        ChildFields {
            code: self.code.clone(),
            document_name: self.document_name.clone(),
            approval_date: self.approval_date.clone(),
            version: self.version,
            status: self.status,
        }
    }
}

fn default_version() -> i32 {
    1
}

// ==========================================
// 远程 API 请求/响应体
// ==========================================

/// 创建父编码请求体
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParentFields {
    pub code: String,
    pub document_type: String,
    pub document_name: String,
    pub department_code: String,
    pub approval_date: String,
    pub version: i32,
    pub status: CodeStatus,
}

/// 创建子编码请求体（父 ID 走路径参数）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChildFields {
    pub code: String,
    pub document_name: String,
    pub approval_date: String,
    pub version: i32,
    pub status: CodeStatus,
}

/// 创建接口返回
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedRecord {
    pub id: i64,
}

// ==========================================
// ImportRow - 导入中间结构体
// ==========================================
// 用途: 一行反范式表格数据（父字段 + 子字段）
// 生命周期: 仅存在于解析器与层级构建器之间
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportRow {
    pub row_number: usize, // 原始文件行号（1 起，含表头）

    // 父字段
    pub department_code: String,
    pub parent_code: String,
    pub document_type: String,
    pub document_name: String,
    pub parent_version: i32,
    pub parent_approval_date: String,
    pub parent_status: CodeStatus,

    // 子字段（可能为空）
    pub child_code: String,
    pub child_document_name: String,
    pub child_version: i32,
    pub child_approval_date: String,
    pub child_status: CodeStatus,
}

impl ImportRow {
    /// 行是否携带子编码（编码与名称均非空）
    pub fn has_child(&self) -> bool {
        !self.child_code.is_empty() && !self.child_document_name.is_empty()
    }

    pub fn to_parent(&self) -> ParentCode {
        ParentCode {
            id: UNPERSISTED_ID,
            code: self.parent_code.clone(),
            document_type: self.document_type.clone(),
            document_name: self.document_name.clone(),
            department_code: self.department_code.clone(),
            approval_date: self.parent_approval_date.clone(),
            version: self.parent_version,
            status: self.parent_status,
            children: Vec::new(),
        }
    }

    pub fn to_child(&self) -> ChildCode {
        ChildCode {
            id: UNPERSISTED_ID,
            code: self.child_code.clone(),
            document_name: self.child_document_name.clone(),
            approval_date: self.child_approval_date.clone(),
            version: self.child_version,
            status: self.child_status,
            parent_id: UNPERSISTED_ID,
        }
    }
}
