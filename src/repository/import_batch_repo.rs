// ==========================================
// 文件编码管理 - 导入批次审计 Repository Trait
// ==========================================
// 职责: 导入历史的本地持久化边界
// 红线: Repository 不含业务规则，只做数据 CRUD
// ==========================================

use crate::domain::import::ImportBatch;
use crate::repository::error::RepositoryResult;
use async_trait::async_trait;

// ==========================================
// ImportBatchRepository Trait
// ==========================================
// 实现者: ImportBatchRepositoryImpl（使用 rusqlite）
#[async_trait]
pub trait ImportBatchRepository: Send + Sync {
    /// 插入导入批次记录
    async fn insert_batch(&self, batch: &ImportBatch) -> RepositoryResult<()>;

    /// 查询最近的导入批次（按完成时间倒序）
    async fn get_recent_batches(&self, limit: usize) -> RepositoryResult<Vec<ImportBatch>>;

    /// 按批次 ID 查询
    ///
    /// # 返回
    /// - Err(NotFound): 批次不存在
    async fn get_batch(&self, batch_id: &str) -> RepositoryResult<ImportBatch>;
}
