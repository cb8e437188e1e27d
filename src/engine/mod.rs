// ==========================================
// 文件编码管理 - 引擎层
// ==========================================
// 职责: 对账（纯内存）+ 批量执行（远程调用）
// 红线: Engine 不拼 SQL，不直接发 HTTP，远程访问只经由仓储 Trait
// ==========================================

pub mod orchestrator;
pub mod reconciler;

// 重导出核心引擎
pub use orchestrator::BulkApplyOrchestrator;
pub use reconciler::Reconciler;
