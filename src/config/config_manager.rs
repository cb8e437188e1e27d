// ==========================================
// 文件编码管理 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、写入
// 存储: config_kv 表 (scope_id='global')
// ==========================================

use crate::config::import_config_trait::ImportConfigReader;
use crate::db::open_sqlite_connection;
use crate::repository::error::{RepositoryError, RepositoryResult};
use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tracing::{debug, warn};

const GLOBAL_SCOPE: &str = "global";

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 会对传入连接再次应用统一 PRAGMA 与建表（幂等）
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> RepositoryResult<Self> {
        {
            let guard = conn
                .lock()
                .map_err(|e| RepositoryError::LockError(e.to_string()))?;
            crate::db::configure_sqlite_connection(&guard)?;
            crate::db::ensure_schema(&guard)?;
        }

        Ok(Self { conn })
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 读取 global scope 的配置值
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    pub fn get_config_value(&self, key: &str) -> RepositoryResult<Option<String>> {
        let conn = self.get_conn()?;

        let value = conn
            .query_row(
                "SELECT value FROM config_kv WHERE scope_id = ?1 AND key = ?2",
                params![GLOBAL_SCOPE, key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    /// 写入 global scope 的配置值（存在则覆盖）
    pub fn set_config_value(&self, key: &str, value: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;

        conn.execute(
            r#"
            INSERT INTO config_kv (scope_id, key, value, updated_at)
            VALUES (?1, ?2, ?3, datetime('now'))
            ON CONFLICT(scope_id, key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
            params![GLOBAL_SCOPE, key, value],
        )?;

        debug!(key = %key, value = %value, "配置已写入");
        Ok(())
    }

    /// 当前生效配置（已写入值覆盖默认值）
    pub fn get_effective_config(&self) -> RepositoryResult<BTreeMap<String, String>> {
        let mut effective: BTreeMap<String, String> = config_keys::DEFAULTS
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();

        let conn = self.get_conn()?;
        let mut stmt =
            conn.prepare("SELECT key, value FROM config_kv WHERE scope_id = ?1 ORDER BY key")?;
        let rows = stmt.query_map(params![GLOBAL_SCOPE], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;
        for row in rows {
            let (key, value) = row?;
            effective.insert(key, value);
        }

        Ok(effective)
    }

    fn get_config_or_default(&self, key: &str) -> RepositoryResult<String> {
        match self.get_config_value(key)? {
            Some(value) if !value.trim().is_empty() => Ok(value.trim().to_string()),
            _ => Ok(config_keys::default_for(key).to_string()),
        }
    }
}

#[async_trait]
impl ImportConfigReader for ConfigManager {
    async fn get_api_base_url(&self) -> RepositoryResult<String> {
        self.get_config_or_default(config_keys::API_BASE_URL)
    }

    async fn get_api_timeout(&self) -> RepositoryResult<Duration> {
        let raw = self.get_config_or_default(config_keys::API_TIMEOUT_SECS)?;
        let secs = match raw.parse::<u64>() {
            Ok(secs) if secs > 0 => secs,
            _ => {
                warn!(value = %raw, "api_timeout_secs 无效，使用默认值");
                config_keys::DEFAULT_API_TIMEOUT_SECS
            }
        };
        Ok(Duration::from_secs(secs))
    }

    async fn get_error_log_dir(&self) -> RepositoryResult<PathBuf> {
        Ok(PathBuf::from(
            self.get_config_or_default(config_keys::ERROR_LOG_DIR)?,
        ))
    }

    async fn get_export_sheet_name(&self) -> RepositoryResult<String> {
        self.get_config_or_default(config_keys::EXPORT_SHEET_NAME)
    }

    async fn get_ui_locale(&self) -> RepositoryResult<String> {
        self.get_config_or_default(config_keys::UI_LOCALE)
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    pub const API_BASE_URL: &str = "api_base_url";
    pub const API_TIMEOUT_SECS: &str = "api_timeout_secs";
    pub const ERROR_LOG_DIR: &str = "error_log_dir";
    pub const EXPORT_SHEET_NAME: &str = "export_sheet_name";
    pub const UI_LOCALE: &str = "ui_locale";

    pub const DEFAULT_API_TIMEOUT_SECS: u64 = 30;

    pub const DEFAULTS: [(&str, &str); 5] = [
        (API_BASE_URL, "http://127.0.0.1:8080/api"),
        (API_TIMEOUT_SECS, "30"),
        (ERROR_LOG_DIR, "."),
        (EXPORT_SHEET_NAME, "Codigos"),
        (UI_LOCALE, "es"),
    ];

    /// 未知键返回空串
    pub fn default_for(key: &str) -> &'static str {
        DEFAULTS
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| *v)
            .unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager() -> ConfigManager {
        let conn = Connection::open_in_memory().unwrap();
        ConfigManager::from_connection(Arc::new(Mutex::new(conn))).unwrap()
    }

    #[tokio::test]
    async fn test_defaults_when_absent() {
        let config = manager();

        assert_eq!(config.get_api_base_url().await.unwrap(), "http://127.0.0.1:8080/api");
        assert_eq!(config.get_api_timeout().await.unwrap(), Duration::from_secs(30));
        assert_eq!(config.get_error_log_dir().await.unwrap(), PathBuf::from("."));
        assert_eq!(config.get_export_sheet_name().await.unwrap(), "Codigos");
        assert_eq!(config.get_ui_locale().await.unwrap(), "es");
    }

    #[tokio::test]
    async fn test_set_value_overrides_default() {
        let config = manager();
        config
            .set_config_value(config_keys::API_BASE_URL, "https://codes.example.org/api")
            .unwrap();
        config.set_config_value(config_keys::UI_LOCALE, "en").unwrap();
        config.set_config_value(config_keys::UI_LOCALE, "zh-CN").unwrap();

        assert_eq!(
            config.get_api_base_url().await.unwrap(),
            "https://codes.example.org/api"
        );
        assert_eq!(config.get_ui_locale().await.unwrap(), "zh-CN");

        let effective = config.get_effective_config().unwrap();
        assert_eq!(effective.get(config_keys::UI_LOCALE).map(String::as_str), Some("zh-CN"));
        assert_eq!(effective.get(config_keys::EXPORT_SHEET_NAME).map(String::as_str), Some("Codigos"));
    }

    #[tokio::test]
    async fn test_invalid_timeout_falls_back() {
        let config = manager();
        config.set_config_value(config_keys::API_TIMEOUT_SECS, "abc").unwrap();
        assert_eq!(config.get_api_timeout().await.unwrap(), Duration::from_secs(30));

        config.set_config_value(config_keys::API_TIMEOUT_SECS, "5").unwrap();
        assert_eq!(config.get_api_timeout().await.unwrap(), Duration::from_secs(5));
    }
}
