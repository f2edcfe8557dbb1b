//! 批处理响应记录
//!
//! 本地执行时逐条写入响应文件，解析时再读回来。

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// 正常完成
pub const STATUS_OK: u16 = 200;
/// 其他所有情况（非 stop 的结束原因、调用异常）
pub const STATUS_FAILED: u16 = 500;

/// 单个请求的执行结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchResponseRecord {
    /// 产生该记录的批次 ID
    #[serde(rename = "id", alias = "batch_id")]
    pub batch_id: String,
    /// 对应请求的 custom_id
    pub custom_id: String,
    #[serde(default)]
    pub response: Option<ResponseBody>,
    /// 调用在产生响应之前就失败时的错误信息
    #[serde(default, deserialize_with = "deserialize_error")]
    pub error: Option<String>,
}

/// 响应体
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseBody {
    /// 应用层状态码（不是 HTTP 状态码）
    pub status_code: u16,
    pub request_id: String,
    /// 供应商返回的原始 completion 对象
    #[serde(default)]
    pub body: Option<Value>,
}

impl BatchResponseRecord {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
            && self
                .response
                .as_ref()
                .is_some_and(|r| r.status_code == STATUS_OK)
    }
}

/// `error` 既可能是字符串，也可能是托管批处理输出中的 `{code, message}` 对象
fn deserialize_error<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s),
        Some(Value::Object(map)) => match map.get("message").and_then(Value::as_str) {
            Some(message) => Some(message.to_string()),
            None => Some(Value::Object(map).to_string()),
        },
        Some(other) => Some(other.to_string()),
    })
}
