// ==========================================
// 文件编码管理 - 编码远程仓储 Trait
// ==========================================
// 职责: 远程持久化 API 的边界（不包含实现）
// 红线: Repository 不含业务规则，只做远程 CRUD
// ==========================================

use crate::domain::document_code::{ChildFields, CreatedRecord, ParentCode, ParentFields};
use crate::repository::error::RepositoryResult;
use async_trait::async_trait;

// ==========================================
// DocumentCodeRepository Trait
// ==========================================
// 实现者: HttpDocumentCodeRepository（reqwest）
#[async_trait]
pub trait DocumentCodeRepository: Send + Sync {
    /// 读取全部父编码（含子编码）
    ///
    /// # 用途
    /// - 对账前的已知父编码快照
    /// - 批量执行后的整体刷新
    async fn list_parents(&self) -> RepositoryResult<Vec<ParentCode>>;

    /// 创建父编码
    ///
    /// # 返回
    /// - Ok(CreatedRecord): 服务端分配的 ID
    async fn create_parent(&self, fields: &ParentFields) -> RepositoryResult<CreatedRecord>;

    /// 在指定父编码下创建子编码
    ///
    /// # 参数
    /// - parent_id: 已落库的父编码 ID
    async fn create_child(
        &self,
        parent_id: i64,
        fields: &ChildFields,
    ) -> RepositoryResult<CreatedRecord>;
}
