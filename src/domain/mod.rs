// ==========================================
// 文件编码管理 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod document_code;
pub mod import;
pub mod types;

// 重导出核心类型
pub use document_code::{
    ChildCode, ChildFields, CreatedRecord, ImportRow, ParentCode, ParentFields, UNPERSISTED_ID,
};
pub use import::{
    ChildOutcome, ImportBatch, ImportErrorLog, ImportPlan, ImportSummary, ParentApplyResult,
    ParentApplyStatus, ParentOutcome, PlannedChild, PlannedParent,
};
pub use types::CodeStatus;
