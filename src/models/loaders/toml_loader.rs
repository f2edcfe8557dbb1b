use crate::config::BatchConfig;
use crate::error::{AppError, AppResult, ConfigError};
use std::path::Path;
use tokio::fs;

/// 从 TOML 文件加载批处理配置
pub async fn load_batch_config(config_path: &Path) -> AppResult<BatchConfig> {
    let content = fs::read_to_string(config_path)
        .await
        .map_err(|e| AppError::file_read_failed(config_path.display().to_string(), e))?;

    let config: BatchConfig =
        toml::from_str(&content).map_err(|source| ConfigError::TomlParseFailed {
            path: config_path.display().to_string(),
            source,
        })?;

    tracing::debug!(
        "已加载配置: 模型 {} | 格式 {} | 每题 {} 个回答",
        config.model,
        config.format,
        config.n_answers
    );

    Ok(config)
}
