// ==========================================
// 文件编码管理 - 应用层
// ==========================================
// 职责: 共享状态 + 导入向导状态机，连接前端（CLI / 界面）与 API
// ==========================================

pub mod state;
pub mod wizard;

// 重导出
pub use state::{get_default_db_path, AppState};
pub use wizard::{WizardError, WizardEvent, WizardState};
