use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::{AppError, AppResult, ConfigError};
use crate::models::Dialect;
use crate::services::batch_builder::BatchSettings;

/// 运行时配置（来自环境变量）
#[derive(Clone, Debug)]
pub struct Config {
    // --- 本地推理端点（OpenAI 兼容，默认 Ollama）---
    pub local_api_base_url: String,
    pub local_api_key: String,
    // --- Anthropic 托管批处理 ---
    pub anthropic_api_key: Option<String>,
    pub anthropic_api_base_url: String,
    pub anthropic_version: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            local_api_base_url: "http://localhost:11434/v1".to_string(),
            local_api_key: "ollama".to_string(),
            anthropic_api_key: None,
            anthropic_api_base_url: "https://api.anthropic.com/v1".to_string(),
            anthropic_version: "2023-06-01".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            local_api_base_url: std::env::var("LOCAL_API_BASE_URL").unwrap_or(default.local_api_base_url),
            local_api_key: std::env::var("LOCAL_API_KEY").unwrap_or(default.local_api_key),
            anthropic_api_key: std::env::var("ANTHROPIC_API_KEY").ok().filter(|k| !k.trim().is_empty()),
            anthropic_api_base_url: std::env::var("ANTHROPIC_API_BASE_URL").unwrap_or(default.anthropic_api_base_url),
            anthropic_version: std::env::var("ANTHROPIC_VERSION").unwrap_or(default.anthropic_version),
        }
    }

    /// Anthropic API 密钥，未设置时报错
    pub fn require_anthropic_api_key(&self) -> AppResult<&str> {
        self.anthropic_api_key.as_deref().ok_or_else(|| {
            ConfigError::EnvVarNotFound {
                var_name: "ANTHROPIC_API_KEY".to_string(),
            }
            .into()
        })
    }
}

/// 请求体中由程序自己填写的字段，附加参数不得覆盖
const RESERVED_PARAMS: &[&str] = &["model", "messages", "temperature", "max_tokens"];

/// Anthropic 方言下系统消息写在顶层 `system`
const ANTHROPIC_RESERVED_PARAMS: &[&str] = &["system"];

fn is_reserved(key: &str, dialect: Dialect) -> bool {
    RESERVED_PARAMS.contains(&key)
        || (dialect == Dialect::Anthropic && ANTHROPIC_RESERVED_PARAMS.contains(&key))
}

/// 批处理配置文件（TOML）
///
/// ```toml
/// model = "llama3.2"
/// format = "openai"
/// temperature = 0.7
/// max_tokens = 512
/// n_answers = 3
/// system_message = "Answer briefly."
///
/// [kwargs]
/// top_p = 0.9
/// ```
#[derive(Clone, Debug, Deserialize)]
pub struct BatchConfig {
    pub model: String,
    /// 方言：openai / anthropic
    pub format: String,
    #[serde(default)]
    pub temperature: f64,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_n_answers")]
    pub n_answers: usize,
    #[serde(default)]
    pub system_message: Option<String>,
    /// 附加的供应商参数
    #[serde(default)]
    pub kwargs: Option<Map<String, Value>>,
}

fn default_max_tokens() -> u32 {
    1024
}

fn default_n_answers() -> usize {
    1
}

impl BatchConfig {
    /// 校验配置并转换为构建批处理所需的参数
    pub fn into_settings(self) -> AppResult<BatchSettings> {
        let dialect: Dialect = self.format.parse()?;

        if self.model.trim().is_empty() {
            return Err(AppError::invalid_config("model", "不能为空"));
        }
        if self.n_answers == 0 {
            return Err(AppError::invalid_config("n_answers", "必须大于等于 1"));
        }
        if !self.temperature.is_finite() || self.temperature < 0.0 {
            return Err(AppError::invalid_config(
                "temperature",
                format!("{} 不是合法的温度", self.temperature),
            ));
        }

        let extra_params = self.kwargs.unwrap_or_default();
        if let Some(key) = extra_params
            .keys()
            .find(|k| is_reserved(k, dialect))
        {
            return Err(ConfigError::ReservedParam { key: key.clone() }.into());
        }

        Ok(BatchSettings {
            model: self.model,
            dialect,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            n_answers: self.n_answers,
            system_message: self.system_message.filter(|s| !s.trim().is_empty()),
            extra_params,
        })
    }
}
