// ==========================================
// 文件编码管理 - 编码远程仓储 HTTP 实现
// ==========================================
// 接口:
// - GET  {base}/document-codes                 → ParentCode[]
// - POST {base}/document-codes                 → { id }
// - POST {base}/document-codes/{id}/children   → { id }
// 响应可为裸对象，也可包在 { "data": ... } 中
// ==========================================

use crate::domain::document_code::{ChildFields, CreatedRecord, ParentCode, ParentFields};
use crate::repository::document_code_repo::DocumentCodeRepository;
use crate::repository::error::{RepositoryError, RepositoryResult};
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

const PARENTS_PATH: &str = "/document-codes";

#[derive(Deserialize)]
#[serde(untagged)]
enum Envelope<T> {
    Wrapped { data: T },
    Plain(T),
}

impl<T> Envelope<T> {
    fn into_inner(self) -> T {
        match self {
            Envelope::Wrapped { data } => data,
            Envelope::Plain(data) => data,
        }
    }
}

// ==========================================
// HttpDocumentCodeRepository
// ==========================================
pub struct HttpDocumentCodeRepository {
    client: Client,
    base_url: String,
}

impl HttpDocumentCodeRepository {
    /// 创建新的远程仓储实例
    ///
    /// # 参数
    /// - base_url: API 根地址（如 http://127.0.0.1:8080/api）
    /// - timeout: 单次请求超时
    pub fn new(base_url: &str, timeout: Duration) -> RepositoryResult<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl DocumentCodeRepository for HttpDocumentCodeRepository {
    async fn list_parents(&self) -> RepositoryResult<Vec<ParentCode>> {
        let url = self.url(PARENTS_PATH);
        debug!(url = %url, "读取父编码列表");

        let response = self.client.get(&url).send().await?;
        read_json(response).await
    }

    async fn create_parent(&self, fields: &ParentFields) -> RepositoryResult<CreatedRecord> {
        let url = self.url(PARENTS_PATH);
        debug!(url = %url, code = %fields.code, "创建父编码");

        let response = self.client.post(&url).json(fields).send().await?;
        read_json(response).await
    }

    async fn create_child(
        &self,
        parent_id: i64,
        fields: &ChildFields,
    ) -> RepositoryResult<CreatedRecord> {
        let url = self.url(&format!("{}/{}/children", PARENTS_PATH, parent_id));
        debug!(url = %url, code = %fields.code, parent_id, "创建子编码");

        let response = self.client.post(&url).json(fields).send().await?;
        read_json(response).await
    }
}

async fn read_json<T: DeserializeOwned>(response: Response) -> RepositoryResult<T> {
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        let message = extract_error_message(status.as_u16(), &body);
        warn!(status = status.as_u16(), message = %message, "远程调用失败");
        return Err(RepositoryError::Remote {
            status: status.as_u16(),
            message,
        });
    }

    let envelope: Envelope<T> = serde_json::from_str(&body)?;
    Ok(envelope.into_inner())
}

/// 从失败响应中提取可读原因
///
/// 优先取结构化错误的 message 字段，其次为原始响应文本，最后为状态码
pub fn extract_error_message(status: u16, body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["message", "error", "detail"] {
            if let Some(text) = value.get(key).and_then(|v| v.as_str()) {
                if !text.trim().is_empty() {
                    return text.trim().to_string();
                }
            }
        }
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        format!("HTTP {}", status)
    } else {
        trimmed.to_string()
    }
}
