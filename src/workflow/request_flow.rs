//! 单条请求处理流程 - 流程层
//!
//! 核心职责：定义"一条请求"的完整处理流程
//!
//! 流程顺序：
//! 1. 确定模型（命令行覆盖优先于请求体中的模型）
//! 2. 调用 chat completion
//! 3. 按结束原因分类为 200 / 500，调用失败时记录错误
//!
//! 单条请求失败不会中断批次。

use tracing::{debug, warn};
use uuid::Uuid;

use crate::models::{BatchResponseRecord, RawBatchRequest, ResponseBody, STATUS_FAILED, STATUS_OK};
use crate::services::completion_client::{finish_reason, ChatCompletionClient};
use crate::utils::truncate_text;

/// 正常完成的结束原因
const FINISH_REASON_STOP: &str = "stop";

/// 生成新的请求ID
pub fn new_request_id() -> String {
    Uuid::new_v4().simple().to_string()
}

/// 单条请求处理流程
///
/// - 不持有任何文件或缓冲区
/// - 只依赖聊天补全能力
pub struct RequestFlow<'a, C: ?Sized> {
    client: &'a C,
    batch_id: String,
    model_override: Option<String>,
}

impl<'a, C: ChatCompletionClient + ?Sized> RequestFlow<'a, C> {
    pub fn new(client: &'a C, batch_id: impl Into<String>) -> Self {
        Self {
            client,
            batch_id: batch_id.into(),
            model_override: None,
        }
    }

    /// 所有请求统一使用指定模型
    pub fn with_model_override(mut self, model: Option<String>) -> Self {
        self.model_override = model.filter(|m| !m.trim().is_empty());
        self
    }

    pub fn batch_id(&self) -> &str {
        &self.batch_id
    }

    /// 处理单条请求，总是返回一条响应记录
    pub async fn run(&self, request: &RawBatchRequest) -> BatchResponseRecord {
        let model = self
            .model_override
            .as_deref()
            .unwrap_or(&request.body.model);

        debug!("[{}] 调用模型 {}", request.custom_id, model);

        let (response, error) = match self
            .client
            .create_completion(model, &request.body.messages)
            .await
        {
            Ok(completion) => {
                let status_code = match finish_reason(&completion) {
                    Some(FINISH_REASON_STOP) => STATUS_OK,
                    other => {
                        warn!(
                            "[{}] 未正常结束，结束原因: {}",
                            request.custom_id,
                            other.unwrap_or("none")
                        );
                        STATUS_FAILED
                    }
                };
                let response = ResponseBody {
                    status_code,
                    request_id: new_request_id(),
                    body: Some(completion),
                };
                (response, None)
            }
            Err(e) => {
                let message = e.to_string();
                warn!(
                    "[{}] 调用失败: {}",
                    request.custom_id,
                    truncate_text(&message, 200)
                );
                let response = ResponseBody {
                    status_code: STATUS_FAILED,
                    request_id: new_request_id(),
                    body: None,
                };
                (response, Some(message))
            }
        };

        BatchResponseRecord {
            batch_id: self.batch_id.clone(),
            custom_id: request.custom_id.clone(),
            response: Some(response),
            error,
        }
    }
}
