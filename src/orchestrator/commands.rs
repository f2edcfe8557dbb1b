//! 命令实现 - 编排层
//!
//! 每个命令对应一个完整的文件到文件的处理过程，`main.rs` 只负责参数解析和输出。

use std::path::{Path, PathBuf};
use tracing::info;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{
    load_batch_config, load_questions, AnthropicBatchRequest, BatchHandle, RawBatchRequest,
};
use crate::orchestrator::batch_runner::{run_local, RunSummary};
use crate::services::{
    build_batch, parse_batch_jsonl, tabulate, write_csv, AnthropicBatchClient, ChatCompletionClient,
    JsonlResponseWriter,
};
use crate::utils::logging::{log_startup, print_final_stats};
use crate::utils::{load_jsonl, write_jsonl, JsonlReader};
use crate::workflow::RequestFlow;

/// 默认写盘间隔
pub const DEFAULT_FLUSH_INTERVAL: usize = 100;

/// 生成新的批次ID
pub fn new_batch_id() -> String {
    Uuid::new_v4().simple().to_string()
}

fn ensure_dir(dir: &Path) -> AppResult<()> {
    std::fs::create_dir_all(dir).map_err(|e| AppError::file_write_failed(dir.display().to_string(), e))
}

/// 从 CSV 和配置文件生成批处理请求文件
///
/// # 返回
/// 返回生成的 `batch_{uuid}.jsonl` 路径
pub async fn create_batch_file(
    csv_path: &Path,
    config_path: &Path,
    output_dir: &Path,
) -> AppResult<PathBuf> {
    let settings = load_batch_config(config_path).await?.into_settings()?;
    let questions = load_questions(csv_path)?;

    let batch = build_batch(&questions, &settings)?;

    ensure_dir(output_dir)?;
    let output_path = output_dir.join(format!("batch_{}.jsonl", new_batch_id()));
    write_jsonl(&batch, &output_path)?;

    info!("已生成 {} 条请求（格式: {}）", batch.len(), settings.dialect);
    info!("批处理文件已保存至 {}", output_path.display());

    Ok(output_path)
}

/// 本地执行参数
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub flush_interval: usize,
    pub output_dir: PathBuf,
    /// 覆盖请求体中的模型
    pub model: Option<String>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            flush_interval: DEFAULT_FLUSH_INTERVAL,
            output_dir: PathBuf::from("."),
            model: None,
        }
    }
}

/// 本地执行结果
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub batch_id: String,
    pub output_path: PathBuf,
    pub summary: RunSummary,
}

/// 在本地推理端点上逐条执行批处理请求文件
///
/// 输出文件 `batch_{batch_id}_output.jsonl` 总会被创建，即使所有请求都失败。
pub async fn run_batch_file<C>(
    file_path: &Path,
    options: &RunOptions,
    client: &C,
) -> AppResult<RunOutcome>
where
    C: ChatCompletionClient + ?Sized,
{
    let requests = JsonlReader::<RawBatchRequest>::open(file_path)?;

    let batch_id = new_batch_id();
    ensure_dir(&options.output_dir)?;
    let output_path = options
        .output_dir
        .join(format!("batch_{batch_id}_output.jsonl"));
    let mut writer = JsonlResponseWriter::create(&output_path)?;

    log_startup(
        &batch_id,
        &file_path.display().to_string(),
        options.flush_interval,
    );

    let flow = RequestFlow::new(client, batch_id.clone()).with_model_override(options.model.clone());
    let summary = run_local(requests, &flow, options.flush_interval, &mut writer).await?;

    print_final_stats(
        summary.succeeded,
        summary.failed,
        summary.total,
        &output_path.display().to_string(),
    );

    Ok(RunOutcome {
        batch_id,
        output_path,
        summary,
    })
}

/// 把 Anthropic 格式的请求文件整体提交到托管批处理接口
pub async fn submit_anthropic_file(
    file_path: &Path,
    client: &AnthropicBatchClient,
) -> AppResult<BatchHandle> {
    let requests: Vec<AnthropicBatchRequest> = load_jsonl(file_path)?;
    let handle = client.submit(&requests).await?;

    info!("批次请求数: {}", handle.request_count);
    info!("批次ID: {}", handle.id);

    Ok(handle)
}

/// 把响应文件解析为 CSV 报告
///
/// # 返回
/// 返回 `{输入文件名}.csv` 路径
pub fn parse_response_file(input_path: &Path, output_dir: &Path) -> AppResult<PathBuf> {
    let records = parse_batch_jsonl(input_path)?;
    let table = tabulate(&records);

    ensure_dir(output_dir)?;
    let stem = input_path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "batch_output".to_string());
    let csv_path = output_dir.join(format!("{stem}.csv"));
    write_csv(&table, &csv_path)?;

    info!(
        "已导出 {} 行 × {} 列至 {}",
        table.rows.len(),
        table.columns.len(),
        csv_path.display()
    );

    Ok(csv_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BatchRequestRecord, BatchResponseRecord};

    #[tokio::test]
    async fn test_create_batch_file() {
        let dir = tempfile::tempdir().unwrap();
        let csv_path = dir.path().join("questions.csv");
        let config_path = dir.path().join("config.toml");
        std::fs::write(&csv_path, "question_id,question\nq1,2+2?\nq2,3+3?\n").unwrap();
        std::fs::write(
            &config_path,
            "model = \"llama3\"\nformat = \"openai\"\nn_answers = 2\n",
        )
        .unwrap();

        let out_dir = dir.path().join("nested/out");
        let path = create_batch_file(&csv_path, &config_path, &out_dir).await.unwrap();

        assert!(path.starts_with(&out_dir));
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("batch_") && name.ends_with(".jsonl"));

        let records: Vec<BatchRequestRecord> = load_jsonl(&path).unwrap();
        let ids: Vec<&str> = records.iter().map(BatchRequestRecord::custom_id).collect();
        assert_eq!(ids, vec!["q1_rep00", "q1_rep01", "q2_rep00", "q2_rep01"]);
    }

    #[tokio::test]
    async fn test_create_rejects_unknown_format() {
        let dir = tempfile::tempdir().unwrap();
        let csv_path = dir.path().join("questions.csv");
        let config_path = dir.path().join("config.toml");
        std::fs::write(&csv_path, "question_id,question\nq1,2+2?\n").unwrap();
        std::fs::write(&config_path, "model = \"m\"\nformat = \"cohere\"\n").unwrap();

        let result = create_batch_file(&csv_path, &config_path, dir.path()).await;
        tokio_test::assert_err!(result);
    }

    #[test]
    fn test_parse_response_file_names_csv_after_input() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("batch_abc_output.jsonl");
        let record = BatchResponseRecord {
            batch_id: "abc".to_string(),
            custom_id: "q1_rep00".to_string(),
            response: None,
            error: Some("boom".to_string()),
        };
        write_jsonl(&[record], &input).unwrap();

        let csv_path = parse_response_file(&input, &dir.path().join("reports")).unwrap();

        assert_eq!(csv_path.file_name().unwrap(), "batch_abc_output.csv");
        let content = std::fs::read_to_string(&csv_path).unwrap();
        assert_eq!(content, "id;custom_id;response;error\nabc;q1_rep00;;boom\n");
    }

    #[test]
    fn test_batch_ids_are_hex() {
        let id = new_batch_id();
        assert_eq!(id.len(), 32);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
