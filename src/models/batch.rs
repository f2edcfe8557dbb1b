//! 批处理请求记录
//!
//! 对应批处理请求文件（JSONL）中的一行。

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::models::message::Message;

/// OpenAI 批处理接口要求的 HTTP 方法
pub const OPENAI_BATCH_METHOD: &str = "POST";
/// OpenAI 批处理接口要求的目标路径
pub const OPENAI_BATCH_URL: &str = "/v1/chat/completions";

/// 请求体：模型、消息和生成参数，附加参数平铺在同一层
///
/// 生成批次时消息是结构化的 [`Message`]；本地执行时消息按原始 JSON 读入，
/// 原样转发给推理端点（`name`、`tool_calls`、`detail` 等字段都会保留）。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestBody<M = Message> {
    pub model: String,
    pub messages: Vec<M>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// OpenAI 方言的批处理记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenAiBatchRequest<M = Message> {
    pub custom_id: String,
    #[serde(default = "default_method")]
    pub method: String,
    #[serde(default = "default_url")]
    pub url: String,
    pub body: RequestBody<M>,
}

/// 本地执行时读入的请求：消息保持原始 JSON
pub type RawBatchRequest = OpenAiBatchRequest<Value>;

impl<M> OpenAiBatchRequest<M> {
    pub fn new(custom_id: impl Into<String>, body: RequestBody<M>) -> Self {
        Self {
            custom_id: custom_id.into(),
            method: default_method(),
            url: default_url(),
            body,
        }
    }
}

fn default_method() -> String {
    OPENAI_BATCH_METHOD.to_string()
}

fn default_url() -> String {
    OPENAI_BATCH_URL.to_string()
}

/// Anthropic 方言的批处理记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnthropicBatchRequest {
    pub custom_id: String,
    pub params: RequestBody,
}

/// 批处理请求记录（两种方言之一）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BatchRequestRecord {
    OpenAi(OpenAiBatchRequest),
    Anthropic(AnthropicBatchRequest),
}

impl BatchRequestRecord {
    pub fn custom_id(&self) -> &str {
        match self {
            BatchRequestRecord::OpenAi(r) => &r.custom_id,
            BatchRequestRecord::Anthropic(r) => &r.custom_id,
        }
    }

    pub fn payload(&self) -> &RequestBody {
        match self {
            BatchRequestRecord::OpenAi(r) => &r.body,
            BatchRequestRecord::Anthropic(r) => &r.params,
        }
    }
}

/// 托管批处理提交结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchHandle {
    pub id: String,
    pub request_count: usize,
}
