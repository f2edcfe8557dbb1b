//! 对话消息模型
//!
//! 两种供应商方言共用同一套消息类型，只有图片片段的结构不同：
//! - OpenAI：`{"type": "image_url", "image_url": {"url": "data:..."}}`
//! - Anthropic：`{"type": "image", "source": {"type": "base64", ...}}`

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{AppError, ValidationError};

/// 批处理方言（请求/响应结构所属的供应商）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// OpenAI 兼容接口
    OpenAi,
    /// Anthropic Messages 接口
    Anthropic,
}

impl FromStr for Dialect {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(Dialect::OpenAi),
            "anthropic" => Ok(Dialect::Anthropic),
            _ => Err(ValidationError::InvalidFormat(s.to_string()).into()),
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dialect::OpenAi => write!(f, "openai"),
            Dialect::Anthropic => write!(f, "anthropic"),
        }
    }
}

/// 消息角色
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    Developer,
}

/// 单条对话消息
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: MessageContent,
}

impl Message {
    pub fn system(text: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: MessageContent::Text(text.into()),
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: MessageContent::Text(text.into()),
        }
    }

    pub fn user_parts(parts: Vec<ContentPart>) -> Self {
        Self {
            role: Role::User,
            content: MessageContent::Parts(parts),
        }
    }

    /// 纯文本内容（多段内容返回 None）
    pub fn text(&self) -> Option<&str> {
        match &self.content {
            MessageContent::Text(text) => Some(text),
            MessageContent::Parts(_) => None,
        }
    }
}

/// 消息内容：纯文本或多段结构化内容
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

/// 结构化内容片段
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    /// 文本片段
    Text { text: String },
    /// OpenAI 图片片段
    ImageUrl { image_url: ImageUrl },
    /// Anthropic 图片片段
    Image { source: ImageSource },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageUrl {
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ImageSource {
    Base64 { media_type: String, data: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_dialect_from_str() {
        assert_eq!("openai".parse::<Dialect>().unwrap(), Dialect::OpenAi);
        assert_eq!(" Anthropic ".parse::<Dialect>().unwrap(), Dialect::Anthropic);

        let err = "gemini".parse::<Dialect>().unwrap_err();
        assert!(matches!(
            err,
            AppError::Validation(ValidationError::InvalidFormat(ref f)) if f == "gemini"
        ));
    }

    #[test]
    fn test_image_parts_wire_shape() {
        let openai = ContentPart::ImageUrl {
            image_url: ImageUrl {
                url: "data:image/png;base64,AAAA".to_string(),
            },
        };
        assert_eq!(
            serde_json::to_value(&openai).unwrap(),
            json!({"type": "image_url", "image_url": {"url": "data:image/png;base64,AAAA"}})
        );

        let anthropic = ContentPart::Image {
            source: ImageSource::Base64 {
                media_type: "image/png".to_string(),
                data: "AAAA".to_string(),
            },
        };
        assert_eq!(
            serde_json::to_value(&anthropic).unwrap(),
            json!({"type": "image", "source": {"type": "base64", "media_type": "image/png", "data": "AAAA"}})
        );
    }

    #[test]
    fn test_text_message_wire_shape() {
        let msg = Message::user("2+2?");
        assert_eq!(
            serde_json::to_value(&msg).unwrap(),
            json!({"role": "user", "content": "2+2?"})
        );
        let back: Message = serde_json::from_value(json!({"role": "system", "content": "hi"})).unwrap();
        assert_eq!(back, Message::system("hi"));
    }
}
