//! Anthropic 托管批处理服务 - 业务能力层
//!
//! 一次性提交整个批次，执行、重试和完成通知都由供应商负责。

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::Config;
use crate::error::{ApiError, AppError, AppResult, ValidationError};
use crate::models::{AnthropicBatchRequest, BatchHandle};

/// 提交请求体
#[derive(Debug, Serialize)]
struct CreateBatchRequest<'a> {
    requests: &'a [AnthropicBatchRequest],
}

/// 提交后返回的批次对象（只取用到的字段）
#[derive(Debug, Deserialize)]
struct MessageBatch {
    id: String,
    #[serde(default)]
    processing_status: Option<String>,
}

/// Anthropic 批处理客户端
pub struct AnthropicBatchClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    version: String,
}

impl AnthropicBatchClient {
    /// 从运行时配置创建客户端，要求已设置 `ANTHROPIC_API_KEY`
    pub fn new(config: &Config) -> AppResult<Self> {
        let api_key = config.require_anthropic_api_key()?.to_string();
        Ok(Self::with_endpoint(
            &config.anthropic_api_base_url,
            api_key,
            &config.anthropic_version,
        ))
    }

    pub fn with_endpoint(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            api_key: api_key.into(),
            version: version.into(),
        }
    }

    fn batches_url(&self) -> String {
        format!("{}/messages/batches", self.base_url.trim_end_matches('/'))
    }

    /// 提交批次
    ///
    /// # 返回
    /// 返回供应商分配的批次ID和请求数量
    pub async fn submit(&self, requests: &[AnthropicBatchRequest]) -> AppResult<BatchHandle> {
        if requests.is_empty() {
            return Err(ValidationError::EmptyBatch.into());
        }

        let url = self.batches_url();
        debug!("提交 {} 条请求至 {}", requests.len(), url);

        let response = self
            .http
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", &self.version)
            .json(&CreateBatchRequest { requests })
            .send()
            .await
            .map_err(|e| AppError::api_request_failed(&url, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::BadResponse {
                endpoint: url,
                status: status.as_u16(),
                body,
            }
            .into());
        }

        let batch: MessageBatch = response
            .json()
            .await
            .map_err(|e| AppError::api_request_failed(&url, e))?;

        info!(
            "批次已提交: {} (状态: {})",
            batch.id,
            batch.processing_status.as_deref().unwrap_or("unknown")
        );

        Ok(BatchHandle {
            id: batch.id,
            request_count: requests.len(),
        })
    }
}
