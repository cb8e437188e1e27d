// ==========================================
// 文件编码管理 - 导入配置读取 Trait
// ==========================================
// 职责: 定义导入流程所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use crate::repository::error::RepositoryResult;
use async_trait::async_trait;
use std::path::PathBuf;
use std::time::Duration;

// ==========================================
// ImportConfigReader Trait
// ==========================================
// 实现者: ConfigManager（从 config_kv 表读取，缺失时使用默认值）
#[async_trait]
pub trait ImportConfigReader: Send + Sync {
    /// 远程 API 根地址
    ///
    /// # 默认值
    /// - http://127.0.0.1:8080/api
    async fn get_api_base_url(&self) -> RepositoryResult<String>;

    /// 单次远程请求超时
    ///
    /// # 默认值
    /// - 30 秒
    async fn get_api_timeout(&self) -> RepositoryResult<Duration>;

    /// 失败明细文件输出目录
    ///
    /// # 默认值
    /// - 当前目录
    async fn get_error_log_dir(&self) -> RepositoryResult<PathBuf>;

    /// 导出工作表名称
    ///
    /// # 默认值
    /// - Codigos
    async fn get_export_sheet_name(&self) -> RepositoryResult<String>;

    /// 界面语言
    ///
    /// # 默认值
    /// - es
    async fn get_ui_locale(&self) -> RepositoryResult<String>;
}
