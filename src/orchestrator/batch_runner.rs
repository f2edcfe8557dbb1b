//! 本地批处理执行器 - 编排层
//!
//! ## 职责
//!
//! 逐条消费请求（惰性、单遍），把每条请求交给 `RequestFlow`，
//! 响应先进入缓冲区，缓冲区满 `flush_interval` 条时追加写入输出，
//! 输入耗尽后再写入剩余部分。
//!
//! 内存占用与 `flush_interval` 成正比，与请求总数无关。
//! 进程在某次写盘后崩溃，最多丢失 `flush_interval - 1` 条已计算的响应。

use tracing::info;

use crate::error::{AppError, AppResult};
use crate::models::{BatchResponseRecord, RawBatchRequest};
use crate::services::{ChatCompletionClient, ResponseSink};
use crate::utils::logging::log_flush;
use crate::workflow::RequestFlow;

/// 执行统计
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// 写盘次数
    pub flushes: usize,
}

/// 执行本地批处理
///
/// # 参数
/// - `requests`: 请求序列，逐条产出；遇到解码错误时先写盘已完成的响应再返回错误
/// - `flow`: 单条请求处理流程（携带批次ID和模型覆盖）
/// - `flush_interval`: 写盘间隔，必须大于等于 1
/// - `sink`: 响应输出
pub async fn run_local<C, S, I>(
    requests: I,
    flow: &RequestFlow<'_, C>,
    flush_interval: usize,
    sink: &mut S,
) -> AppResult<RunSummary>
where
    C: ChatCompletionClient + ?Sized,
    S: ResponseSink,
    I: IntoIterator<Item = AppResult<RawBatchRequest>>,
{
    if flush_interval == 0 {
        return Err(AppError::invalid_config("interval", "必须大于等于 1"));
    }

    let mut buffer: Vec<BatchResponseRecord> = Vec::with_capacity(flush_interval);
    let mut summary = RunSummary::default();

    for request in requests {
        let request = match request {
            Ok(request) => request,
            Err(e) => {
                flush(sink, &mut buffer, &mut summary)?;
                return Err(e);
            }
        };

        let record = flow.run(&request).await;
        summary.total += 1;
        if record.is_success() {
            summary.succeeded += 1;
        } else {
            summary.failed += 1;
        }
        buffer.push(record);

        if buffer.len() >= flush_interval {
            flush(sink, &mut buffer, &mut summary)?;
            log_flush(summary.total);
        }
    }

    flush(sink, &mut buffer, &mut summary)?;
    info!("批次 {} 共处理 {} 条请求", flow.batch_id(), summary.total);

    Ok(summary)
}

fn flush<S: ResponseSink>(
    sink: &mut S,
    buffer: &mut Vec<BatchResponseRecord>,
    summary: &mut RunSummary,
) -> AppResult<()> {
    if buffer.is_empty() {
        return Ok(());
    }
    sink.append(buffer)?;
    buffer.clear();
    summary.flushes += 1;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{OpenAiBatchRequest, RequestBody};
    use crate::services::CompletionError;
    use async_trait::async_trait;
    use serde_json::{json, Map, Value};

    /// 记录每次写盘的大小和内容
    #[derive(Default)]
    struct RecordingSink {
        flushes: Vec<usize>,
        records: Vec<BatchResponseRecord>,
    }

    impl ResponseSink for RecordingSink {
        fn append(&mut self, records: &[BatchResponseRecord]) -> AppResult<()> {
            self.flushes.push(records.len());
            self.records.extend_from_slice(records);
            Ok(())
        }
    }

    /// 用户消息以 "bad" 开头的请求调用失败，其余正常完成
    struct FlakyClient;

    #[async_trait]
    impl ChatCompletionClient for FlakyClient {
        async fn create_completion(
            &self,
            _model: &str,
            messages: &[Value],
        ) -> Result<Value, CompletionError> {
            match messages.first().and_then(|m| m["content"].as_str()) {
                Some(text) if text.starts_with("bad") => Err("endpoint unavailable".into()),
                _ => Ok(json!({"choices": [{"finish_reason": "stop"}]})),
            }
        }
    }

    fn request(custom_id: &str) -> AppResult<RawBatchRequest> {
        Ok(OpenAiBatchRequest::new(
            custom_id,
            RequestBody {
                model: "m".to_string(),
                messages: vec![json!({"role": "user", "content": custom_id})],
                temperature: None,
                max_tokens: None,
                extra: Map::new(),
            },
        ))
    }

    #[tokio::test]
    async fn test_flush_sizes() {
        let requests: Vec<_> = (0..7).map(|i| request(&format!("q{i}_rep00"))).collect();
        let mut sink = RecordingSink::default();
        let flow = RequestFlow::new(&FlakyClient, "b");

        let summary = run_local(requests, &flow, 3, &mut sink).await.unwrap();

        assert_eq!(sink.flushes, vec![3, 3, 1]);
        assert_eq!(summary.flushes, 3);
        assert_eq!(summary.total, 7);
        let ids: Vec<String> = sink.records.iter().map(|r| r.custom_id.clone()).collect();
        let expected: Vec<String> = (0..7).map(|i| format!("q{i}_rep00")).collect();
        assert_eq!(ids, expected);
    }

    #[tokio::test]
    async fn test_failures_do_not_abort() {
        let requests = vec![request("ok1"), request("bad1"), request("ok2")];
        let mut sink = RecordingSink::default();
        let flow = RequestFlow::new(&FlakyClient, "b");

        let summary = run_local(requests, &flow, 10, &mut sink).await.unwrap();

        assert_eq!(summary.succeeded, 2);
        assert_eq!(summary.failed, 1);
        assert_eq!(sink.flushes, vec![3]);
        assert_eq!(sink.records[1].error.as_deref(), Some("endpoint unavailable"));
        assert!(sink.records.iter().all(|r| r.batch_id == "b"));
    }

    #[tokio::test]
    async fn test_bad_input_flushes_then_fails() {
        let source = serde_json::from_str::<Value>("{").unwrap_err();
        let requests = vec![
            request("ok1"),
            Err(AppError::record_invalid(2, source)),
            request("ok2"),
        ];
        let mut sink = RecordingSink::default();
        let flow = RequestFlow::new(&FlakyClient, "b");

        let err = run_local(requests, &flow, 10, &mut sink).await.unwrap_err();

        assert_eq!(err.line(), Some(2));
        assert_eq!(sink.flushes, vec![1]);
    }

    #[tokio::test]
    async fn test_empty_input_writes_nothing() {
        let mut sink = RecordingSink::default();
        let flow = RequestFlow::new(&FlakyClient, "b");

        let requests: Vec<AppResult<RawBatchRequest>> = Vec::new();
        let summary = run_local(requests, &flow, 3, &mut sink).await.unwrap();

        assert_eq!(summary, RunSummary::default());
        assert!(sink.flushes.is_empty());
    }

    #[tokio::test]
    async fn test_zero_interval_is_rejected() {
        let mut sink = RecordingSink::default();
        let flow = RequestFlow::new(&FlakyClient, "b");

        tokio_test::assert_err!(run_local(vec![request("a")], &flow, 0, &mut sink).await);
    }
}
