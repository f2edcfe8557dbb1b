use serde::{Deserialize, Serialize};
use std::path::Path;

/// 题目（输入 CSV 的一行）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    /// 题目ID
    pub question_id: String,
    /// 题干
    pub question: String,
    /// 图片路径（可选）
    #[serde(default)]
    pub image_path: Option<String>,
}

impl Question {
    pub fn new(question_id: impl Into<String>, question: impl Into<String>) -> Self {
        Self {
            question_id: question_id.into(),
            question: question.into(),
            image_path: None,
        }
    }

    pub fn with_image(mut self, image_path: impl Into<String>) -> Self {
        self.image_path = Some(image_path.into());
        self
    }

    /// 图片路径，空白单元格视为没有图片
    pub fn image(&self) -> Option<&Path> {
        self.image_path
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(Path::new)
    }
}
