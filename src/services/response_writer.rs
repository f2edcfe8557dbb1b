//! 响应写入服务 - 业务能力层
//!
//! 只负责"把一批响应追加到输出文件"能力，不关心何时写

use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::AppResult;
use crate::models::BatchResponseRecord;
use crate::utils::append_jsonl;

/// 只追加的响应输出
pub trait ResponseSink {
    /// 追加一批响应（保持顺序）
    fn append(&mut self, records: &[BatchResponseRecord]) -> AppResult<()>;
}

/// 追加写入 JSONL 文件的响应输出
pub struct JsonlResponseWriter {
    output_path: PathBuf,
    written: usize,
}

impl JsonlResponseWriter {
    /// 创建写入器并确保输出文件存在
    ///
    /// 即使后续没有任何响应，输出文件也会被创建。
    pub fn create(output_path: impl Into<PathBuf>) -> AppResult<Self> {
        let output_path = output_path.into();
        append_jsonl::<BatchResponseRecord>(&[], &output_path)?;
        Ok(Self {
            output_path,
            written: 0,
        })
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    /// 已写入的记录数
    pub fn written(&self) -> usize {
        self.written
    }
}

impl ResponseSink for JsonlResponseWriter {
    fn append(&mut self, records: &[BatchResponseRecord]) -> AppResult<()> {
        debug!(
            "追加 {} 条响应至 {}",
            records.len(),
            self.output_path.display()
        );
        append_jsonl(records, &self.output_path)?;
        self.written += records.len();
        Ok(())
    }
}
