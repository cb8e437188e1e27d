// ==========================================
// 文件编码管理 - API层
// ==========================================
// 职责: 组合导入管道，向应用层（CLI / 界面）暴露用例
// ==========================================

pub mod error;
pub mod import_api;

// 重导出
pub use error::{ApiError, ApiResult};
pub use import_api::{ImportApi, ImportOutcome, ImportPreview};
