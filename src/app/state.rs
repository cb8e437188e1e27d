// ==========================================
// 文件编码管理 - 应用状态
// ==========================================
// 职责: 管理应用级别的共享状态和API实例
// 共享资源: 已知父编码集合
// - 批次开始前读取一次（生成对账计划）
// - 批次结束后整体替换一次（远程刷新），批次中途从不增量修改
// ==========================================

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::api::{ApiResult, ImportApi, ImportOutcome};
use crate::config::{ConfigManager, ImportConfigReader};
use crate::db::open_sqlite_connection;
use crate::domain::document_code::ParentCode;
use crate::repository::{
    DocumentCodeRepository, HttpDocumentCodeRepository, ImportBatchRepository,
    ImportBatchRepositoryImpl,
};

/// 应用状态
///
/// 包含API实例与已知父编码集合
pub struct AppState {
    /// 数据库路径
    pub db_path: String,

    /// 编码导入API
    pub import_api: Arc<ImportApi>,

    /// 配置管理器
    pub config_manager: Arc<ConfigManager>,

    /// 已知父编码（远程快照）
    known_parents: RwLock<Vec<ParentCode>>,
}

impl AppState {
    /// 创建新的AppState实例
    ///
    /// # 参数
    /// - db_path: 本地数据库路径（配置 + 导入审计）
    /// - api_url_override: 远程 API 地址（覆盖 config_kv 中的配置）
    ///
    /// # 说明
    /// 1. 打开共享连接并建表
    /// 2. 读取配置，设置界面语言
    /// 3. 创建仓储与 ImportApi
    pub async fn new(db_path: String, api_url_override: Option<String>) -> ApiResult<Self> {
        info!(db_path = %db_path, "初始化AppState");

        let conn = Arc::new(Mutex::new(open_sqlite_connection(&db_path)?));
        let config_manager = Arc::new(ConfigManager::from_connection(conn.clone())?);

        let locale = config_manager.get_ui_locale().await?;
        crate::i18n::set_locale(&locale);

        let api_base_url = match api_url_override {
            Some(url) => url,
            None => config_manager.get_api_base_url().await?,
        };
        let timeout = config_manager.get_api_timeout().await?;
        let code_repo: Arc<dyn DocumentCodeRepository> =
            Arc::new(HttpDocumentCodeRepository::new(&api_base_url, timeout)?);
        let batch_repo: Arc<dyn ImportBatchRepository> =
            Arc::new(ImportBatchRepositoryImpl::from_connection(conn));

        let import_api = ImportApi::new(
            code_repo,
            batch_repo,
            config_manager.get_error_log_dir().await?,
            config_manager.get_export_sheet_name().await?,
        );

        info!(api_base_url = %api_base_url, locale = %locale, "AppState初始化完成");
        Ok(Self::with_components(db_path, Arc::new(import_api), config_manager))
    }

    /// 由已构建的组件组装（测试 / 嵌入场景）
    pub fn with_components(
        db_path: String,
        import_api: Arc<ImportApi>,
        config_manager: Arc<ConfigManager>,
    ) -> Self {
        Self {
            db_path,
            import_api,
            config_manager,
            known_parents: RwLock::new(Vec::new()),
        }
    }

    /// 已知父编码快照
    pub async fn known_parents(&self) -> Vec<ParentCode> {
        self.known_parents.read().await.clone()
    }

    /// 整体替换已知父编码
    pub async fn replace_known_parents(&self, parents: Vec<ParentCode>) {
        let mut guard = self.known_parents.write().await;
        *guard = parents;
    }

    /// 从远程刷新已知父编码
    ///
    /// # 返回
    /// - Ok(usize): 刷新后的父编码数
    pub async fn refresh_known_parents(&self) -> ApiResult<usize> {
        let parents = self.import_api.fetch_known_parents().await?;
        let count = parents.len();
        self.replace_known_parents(parents).await;
        info!(parents = count, "已知父编码已刷新");
        Ok(count)
    }

    /// 确认后执行导入
    ///
    /// 流程: 读取快照 → 对账 → 批量执行 → 刷新快照（无论是否有失败）
    ///
    /// # 返回
    /// - (ImportOutcome, 刷新是否成功)；远程调用开始后不再返回错误
    pub async fn run_import(
        &self,
        parsed: Vec<ParentCode>,
        file_name: Option<String>,
    ) -> (ImportOutcome, bool) {
        let snapshot = self.known_parents().await;
        let plan = self.import_api.plan(parsed, &snapshot);
        let outcome = self.import_api.apply(plan, file_name).await;

        let refreshed = match self.refresh_known_parents().await {
            Ok(_) => true,
            Err(e) => {
                warn!(error = %e, "执行后刷新已知父编码失败");
                false
            }
        };

        (outcome, refreshed)
    }
}

/// 获取默认数据库路径
///
/// 优先级: 环境变量 DOC_CODES_DB_PATH > 用户数据目录 > 当前目录
pub fn get_default_db_path() -> String {
    if let Ok(path) = std::env::var("DOC_CODES_DB_PATH") {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./doc_codes.db");

    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join("doc-codes");
        if std::fs::create_dir_all(&dir).is_ok() {
            path = dir.join("doc_codes.db");
        }
    }

    path.to_string_lossy().to_string()
}
