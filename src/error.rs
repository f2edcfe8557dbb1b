use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 文件操作错误
    #[error("文件错误: {0}")]
    File(#[from] FileError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
    /// 输入校验错误（调用方输入有误，不是运行时故障）
    #[error("输入错误: {0}")]
    Validation(#[from] ValidationError),
    /// API 调用错误
    #[error("API错误: {0}")]
    Api(#[from] ApiError),
}

/// 文件操作错误
#[derive(Debug, Error)]
pub enum FileError {
    /// 读取文件失败
    #[error("读取文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 写入文件失败
    #[error("写入文件失败 ({path}): {source}")]
    WriteFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// CSV 读写失败
    #[error("CSV处理失败 ({path}): {source}")]
    Csv {
        path: String,
        #[source]
        source: csv::Error,
    },
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// TOML 解析失败
    #[error("TOML解析失败 ({path}): {source}")]
    TomlParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    /// 环境变量不存在
    #[error("环境变量 {var_name} 不存在")]
    EnvVarNotFound { var_name: String },
    /// 字段取值非法
    #[error("配置项 {field} 取值非法: {reason}")]
    InvalidValue { field: String, reason: String },
    /// 附加参数与保留字段冲突
    #[error("附加参数 {key} 与保留字段冲突")]
    ReservedParam { key: String },
}

/// 输入校验错误
#[derive(Debug, Error)]
pub enum ValidationError {
    /// 不支持的批处理格式
    #[error("不支持的格式: {0}，可选值为 openai / anthropic")]
    InvalidFormat(String),
    /// JSONL 记录不符合预期结构
    #[error("第 {line} 行记录无效: {source}")]
    RecordValidation {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
    /// CSV 行不符合题目结构
    #[error("CSV 第 {row} 行无效: {source}")]
    InvalidQuestionRow {
        row: usize,
        #[source]
        source: csv::Error,
    },
    /// 重复的 custom_id（通常是 CSV 中题目ID重复）
    #[error("custom_id 重复: {0}")]
    DuplicateCustomId(String),
    /// 空的请求列表
    #[error("请求列表为空")]
    EmptyBatch,
}

/// API 调用错误
#[derive(Debug, Error)]
pub enum ApiError {
    /// 网络请求失败
    #[error("API请求失败 ({endpoint}): {source}")]
    RequestFailed {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    /// API 返回错误响应
    #[error("API返回错误响应 ({endpoint}): status={status}, body={body}")]
    BadResponse {
        endpoint: String,
        status: u16,
        body: String,
    },
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建文件读取错误
    pub fn file_read_failed(path: impl Into<String>, source: std::io::Error) -> Self {
        AppError::File(FileError::ReadFailed {
            path: path.into(),
            source,
        })
    }

    /// 创建文件写入错误
    pub fn file_write_failed(path: impl Into<String>, source: std::io::Error) -> Self {
        AppError::File(FileError::WriteFailed {
            path: path.into(),
            source,
        })
    }

    /// 创建 CSV 读写错误
    pub fn csv_failed(path: impl Into<String>, source: csv::Error) -> Self {
        AppError::File(FileError::Csv {
            path: path.into(),
            source,
        })
    }

    /// 创建记录校验错误
    pub fn record_invalid(line: usize, source: serde_json::Error) -> Self {
        AppError::Validation(ValidationError::RecordValidation { line, source })
    }

    /// 创建配置取值错误
    pub fn invalid_config(field: impl Into<String>, reason: impl Into<String>) -> Self {
        AppError::Config(ConfigError::InvalidValue {
            field: field.into(),
            reason: reason.into(),
        })
    }

    /// 创建API请求失败错误
    pub fn api_request_failed(endpoint: impl Into<String>, source: reqwest::Error) -> Self {
        AppError::Api(ApiError::RequestFailed {
            endpoint: endpoint.into(),
            source,
        })
    }

    /// 出错的记录行号（仅记录校验错误有）
    pub fn line(&self) -> Option<usize> {
        match self {
            AppError::Validation(ValidationError::RecordValidation { line, .. }) => Some(*line),
            _ => None,
        }
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
