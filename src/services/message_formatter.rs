//! 消息构建服务 - 业务能力层
//!
//! 只负责把"一道题"变成某个方言下的对话消息列表

use std::path::Path;

use crate::error::AppResult;
use crate::models::{ContentPart, Dialect, ImageSource, ImageUrl, Message};
use crate::utils::encode_image;

/// 构建对话消息
///
/// # 参数
/// - `question`: 题干
/// - `image_path`: 图片路径（可选），存在时用户消息为"文本 + 图片"两段内容
/// - `system_message`: 系统消息（可选），存在时放在最前面
/// - `dialect`: 目标方言，决定图片片段的结构
///
/// # 返回
/// 返回有序的消息列表
pub fn format_messages(
    question: &str,
    image_path: Option<&Path>,
    system_message: Option<&str>,
    dialect: Dialect,
) -> AppResult<Vec<Message>> {
    let mut messages = Vec::with_capacity(2);

    if let Some(system) = system_message {
        messages.push(Message::system(system));
    }

    let user = match image_path {
        None => Message::user(question),
        Some(path) => {
            let (media_type, data) = encode_image(path)?;
            Message::user_parts(vec![
                ContentPart::Text {
                    text: question.to_string(),
                },
                image_part(dialect, media_type, data),
            ])
        }
    };
    messages.push(user);

    Ok(messages)
}

fn image_part(dialect: Dialect, media_type: &str, data: String) -> ContentPart {
    match dialect {
        Dialect::OpenAi => ContentPart::ImageUrl {
            image_url: ImageUrl {
                url: format!("data:{media_type};base64,{data}"),
            },
        },
        Dialect::Anthropic => ContentPart::Image {
            source: ImageSource::Base64 {
                media_type: media_type.to_string(),
                data,
            },
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MessageContent, Role};
    use serde_json::json;

    #[test]
    fn test_text_only() {
        let messages = format_messages("2+2?", None, None, Dialect::OpenAi).unwrap();
        assert_eq!(messages, vec![Message::user("2+2?")]);
    }

    #[test]
    fn test_system_message_comes_first() {
        let messages =
            format_messages("2+2?", None, Some("Answer with a number."), Dialect::Anthropic)
                .unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, Role::System);
        assert_eq!(messages[0].text(), Some("Answer with a number."));
        assert_eq!(messages[1], Message::user("2+2?"));
    }

    #[test]
    fn test_image_parts_per_dialect() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pixel.png");
        std::fs::write(&path, b"GIF89a").unwrap();

        let openai = format_messages("What?", Some(&path), None, Dialect::OpenAi).unwrap();
        assert_eq!(
            serde_json::to_value(&openai).unwrap(),
            json!([{
                "role": "user",
                "content": [
                    {"type": "text", "text": "What?"},
                    {"type": "image_url", "image_url": {"url": "data:image/png;base64,R0lGODlh"}}
                ]
            }])
        );

        let anthropic = format_messages("What?", Some(&path), None, Dialect::Anthropic).unwrap();
        match &anthropic[0].content {
            MessageContent::Parts(parts) => {
                assert_eq!(parts.len(), 2);
                assert_eq!(
                    parts[1],
                    ContentPart::Image {
                        source: ImageSource::Base64 {
                            media_type: "image/png".to_string(),
                            data: "R0lGODlh".to_string(),
                        }
                    }
                );
            }
            other => panic!("expected parts, got {other:?}"),
        }
    }

    #[test]
    fn test_formatting_is_deterministic() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.jpg");
        std::fs::write(&path, [0xffu8, 0xd8, 0xff, 0xe0]).unwrap();

        let first = format_messages("q", Some(&path), Some("s"), Dialect::OpenAi).unwrap();
        let second = format_messages("q", Some(&path), Some("s"), Dialect::OpenAi).unwrap();
        assert_eq!(
            serde_json::to_vec(&first).unwrap(),
            serde_json::to_vec(&second).unwrap()
        );
    }

    #[test]
    fn test_unreadable_image_fails() {
        let result = format_messages("q", Some(Path::new("nope.png")), None, Dialect::OpenAi);
        assert!(result.is_err());
    }
}
