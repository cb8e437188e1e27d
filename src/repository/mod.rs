// ==========================================
// 文件编码管理 - 数据仓储层
// ==========================================
// 职责: 远程编码 API 与本地导入审计的访问接口，屏蔽 HTTP / 数据库细节
// 红线: Repository 不含业务逻辑
// 约束: 所有 SQL 使用参数化
// ==========================================

pub mod document_code_repo;
pub mod document_code_repo_impl;
pub mod error;
pub mod import_batch_repo;
pub mod import_batch_repo_impl;

// 重导出核心仓储
pub use document_code_repo::DocumentCodeRepository;
pub use document_code_repo_impl::HttpDocumentCodeRepository;
pub use error::{RepositoryError, RepositoryResult};
pub use import_batch_repo::ImportBatchRepository;
pub use import_batch_repo_impl::ImportBatchRepositoryImpl;
