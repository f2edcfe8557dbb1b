use crate::error::{AppError, AppResult, ValidationError};
use crate::models::question::Question;
use std::path::Path;

/// 从 CSV 文件加载题目列表
///
/// 表头驱动：`question_id`、`question` 必填，`image_path` 可选。
/// 任意一行不合法都会使整个加载失败。
pub fn load_questions(csv_path: &Path) -> AppResult<Vec<Question>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .from_path(csv_path)
        .map_err(|e| AppError::csv_failed(csv_path.display().to_string(), e))?;

    let mut questions = Vec::new();
    for (idx, row) in reader.deserialize::<Question>().enumerate() {
        // 表头占第 1 行
        let question = row.map_err(|source| ValidationError::InvalidQuestionRow {
            row: idx + 2,
            source,
        })?;
        questions.push(question);
    }

    tracing::info!("已从 {} 加载 {} 道题目", csv_path.display(), questions.len());
    Ok(questions)
}
