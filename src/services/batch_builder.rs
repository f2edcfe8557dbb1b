//! 批处理构建服务 - 业务能力层
//!
//! 把题目列表展开为批处理请求记录：每道题重复 `n_answers` 次，
//! 每条记录的 custom_id 为 `{question_id}_rep{两位序号}`。

use serde_json::{Map, Value};
use std::collections::HashSet;
use tracing::debug;

use crate::error::{AppError, AppResult, ValidationError};
use crate::models::{
    AnthropicBatchRequest, BatchRequestRecord, Dialect, Message, OpenAiBatchRequest, Question,
    RequestBody, Role,
};
use crate::services::message_formatter::format_messages;

/// 构建批处理所需的参数（已校验）
#[derive(Debug, Clone, PartialEq)]
pub struct BatchSettings {
    pub model: String,
    pub dialect: Dialect,
    pub temperature: f64,
    pub max_tokens: u32,
    pub n_answers: usize,
    pub system_message: Option<String>,
    /// 附加的供应商参数，原样合并进请求体
    pub extra_params: Map<String, Value>,
}

impl BatchSettings {
    pub fn new(model: impl Into<String>, dialect: Dialect) -> Self {
        Self {
            model: model.into(),
            dialect,
            temperature: 0.0,
            max_tokens: 1024,
            n_answers: 1,
            system_message: None,
            extra_params: Map::new(),
        }
    }
}

/// 生成 custom_id
pub fn custom_id(question_id: &str, replica: usize) -> String {
    format!("{question_id}_rep{replica:02}")
}

/// 构建批处理请求列表
///
/// 顺序：先按题目顺序，再按副本序号。
pub fn build_batch(
    questions: &[Question],
    settings: &BatchSettings,
) -> AppResult<Vec<BatchRequestRecord>> {
    if settings.n_answers == 0 {
        return Err(AppError::invalid_config("n_answers", "必须大于等于 1"));
    }

    let mut batch = Vec::with_capacity(questions.len() * settings.n_answers);
    let mut seen = HashSet::with_capacity(batch.capacity());

    for question in questions {
        // 同一道题的各个副本消息完全相同，图片只读一次
        let messages = format_messages(
            &question.question,
            question.image(),
            settings.system_message.as_deref(),
            settings.dialect,
        )?;

        for replica in 0..settings.n_answers {
            let id = custom_id(&question.question_id, replica);
            if !seen.insert(id.clone()) {
                return Err(ValidationError::DuplicateCustomId(id).into());
            }
            batch.push(build_record(id, messages.clone(), settings));
        }
    }

    debug!(
        "构建了 {} 条请求（{} 道题 × {} 个回答）",
        batch.len(),
        questions.len(),
        settings.n_answers
    );

    Ok(batch)
}

fn build_record(
    custom_id: String,
    mut messages: Vec<Message>,
    settings: &BatchSettings,
) -> BatchRequestRecord {
    let mut extra = settings.extra_params.clone();

    if settings.dialect == Dialect::Anthropic {
        // Messages API 不接受 messages 中的 system 角色，改放顶层 system 参数
        if let Some(system) = take_system_text(&mut messages) {
            extra.insert("system".to_string(), Value::String(system));
        }
    }

    let body = RequestBody {
        model: settings.model.clone(),
        messages,
        temperature: Some(settings.temperature),
        max_tokens: Some(settings.max_tokens),
        extra,
    };

    match settings.dialect {
        Dialect::OpenAi => BatchRequestRecord::OpenAi(OpenAiBatchRequest::new(custom_id, body)),
        Dialect::Anthropic => BatchRequestRecord::Anthropic(AnthropicBatchRequest {
            custom_id,
            params: body,
        }),
    }
}

fn take_system_text(messages: &mut Vec<Message>) -> Option<String> {
    match messages.first() {
        Some(first) if first.role == Role::System => {
            let text = first.text().map(str::to_string);
            messages.remove(0);
            text
        }
        _ => None,
    }
}
