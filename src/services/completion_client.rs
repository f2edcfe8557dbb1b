//! 聊天补全服务 - 业务能力层
//!
//! 只负责"发一次 chat completion 请求"能力，不关心批次和流程
//!
//! ## 技术栈
//! - 使用 `async-openai` crate 进行 API 调用（BYOT：请求和响应都是原始 JSON）
//! - 默认指向本地 Ollama 的 OpenAI 兼容端点
//!
//! 响应不经过强类型解码：本地服务返回的非标准结束原因、缺失的 `created` /
//! `object` 字段、额外的 `reasoning_content` 等都原样保留在记录里。

use async_openai::{config::OpenAIConfig, Client};
use async_trait::async_trait;
use backoff::ExponentialBackoffBuilder;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;

use crate::config::Config;

/// 单次调用失败的原因
pub type CompletionError = Box<dyn std::error::Error + Send + Sync>;

/// 聊天补全能力
///
/// 消息按原始 JSON 转发，返回供应商原始的 completion 对象，由调用方决定如何分类。
#[async_trait]
pub trait ChatCompletionClient: Send + Sync {
    async fn create_completion(
        &self,
        model: &str,
        messages: &[Value],
    ) -> Result<Value, CompletionError>;
}

/// 本地 OpenAI 兼容端点客户端
pub struct LocalCompletionClient {
    client: Client<OpenAIConfig>,
}

impl LocalCompletionClient {
    /// 创建新的本地客户端
    pub fn new(config: &Config) -> Self {
        Self::with_endpoint(&config.local_api_base_url, &config.local_api_key)
    }

    /// 使用指定端点创建客户端
    ///
    /// # 参数
    /// - `api_base`: OpenAI 兼容端点，如 `http://localhost:11434/v1`
    /// - `api_key`: API密钥
    pub fn with_endpoint(api_base: &str, api_key: &str) -> Self {
        let openai_config = OpenAIConfig::new()
            .with_api_key(api_key)
            .with_api_base(api_base);

        // 失败的请求记入响应文件后继续下一条，不做重试
        let no_retry = ExponentialBackoffBuilder::new()
            .with_max_elapsed_time(Some(Duration::ZERO))
            .build();

        Self {
            client: Client::with_config(openai_config).with_backoff(no_retry),
        }
    }
}

#[async_trait]
impl ChatCompletionClient for LocalCompletionClient {
    async fn create_completion(
        &self,
        model: &str,
        messages: &[Value],
    ) -> Result<Value, CompletionError> {
        debug!("调用本地推理端点，模型: {}，消息数: {}", model, messages.len());

        let request = json!({ "model": model, "messages": messages });
        let completion: Value = self.client.chat().create_byot(request).await?;

        Ok(completion)
    }
}

/// 读取第一个 choice 的结束原因
pub fn finish_reason(completion: &Value) -> Option<&str> {
    completion
        .get("choices")?
        .get(0)?
        .get("finish_reason")?
        .as_str()
}
