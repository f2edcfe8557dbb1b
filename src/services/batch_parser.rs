//! 批处理结果解析服务 - 业务能力层
//!
//! 读取响应 JSONL 文件、校验每一行，并展平成表格导出为 CSV。

use indexmap::{IndexMap, IndexSet};
use serde_json::Value;
use std::path::Path;
use tracing::debug;

use crate::error::{AppError, AppResult};
use crate::models::BatchResponseRecord;
use crate::utils::JsonlReader;

/// CSV 报告的分隔符
pub const CSV_DELIMITER: u8 = b';';

/// 展平后的表格
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    /// 列名（按首次出现顺序）
    pub columns: Vec<String>,
    /// 每条记录一行，缺失的字段为空字符串
    pub rows: Vec<Vec<String>>,
}

impl Table {
    /// 按列名取某一行的单元格
    pub fn cell(&self, row: usize, column: &str) -> Option<&str> {
        let idx = self.columns.iter().position(|c| c == column)?;
        self.rows.get(row)?.get(idx).map(String::as_str)
    }
}

/// 解析响应文件
///
/// 任意一行不符合响应记录结构都会使整个解析失败，错误中带有行号。
pub fn parse_batch_jsonl(path: &Path) -> AppResult<Vec<BatchResponseRecord>> {
    let records: Vec<BatchResponseRecord> = JsonlReader::open(path)?.collect::<AppResult<_>>()?;
    debug!("从 {} 解析出 {} 条响应", path.display(), records.len());
    Ok(records)
}

/// 把响应记录展平为表格
///
/// 嵌套对象以 `.` 连接键名（如 `response.status_code`），数组保留为 JSON 文本。
pub fn tabulate(records: &[BatchResponseRecord]) -> Table {
    let flattened: Vec<IndexMap<String, String>> = records
        .iter()
        .map(|record| {
            let mut row = IndexMap::new();
            // 响应记录只包含字符串键和 JSON 值，序列化不会失败
            let value = serde_json::to_value(record).unwrap_or(Value::Null);
            flatten_into(&mut row, String::new(), &value);
            row
        })
        .collect();

    let columns: IndexSet<String> = flattened
        .iter()
        .flat_map(|row| row.keys().cloned())
        .collect();

    let rows = flattened
        .iter()
        .map(|row| {
            columns
                .iter()
                .map(|column| row.get(column).cloned().unwrap_or_default())
                .collect()
        })
        .collect();

    Table {
        columns: columns.into_iter().collect(),
        rows,
    }
}

fn flatten_into(row: &mut IndexMap<String, String>, prefix: String, value: &Value) {
    match value {
        Value::Object(map) if !map.is_empty() => {
            for (key, child) in map {
                let name = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{prefix}.{key}")
                };
                flatten_into(row, name, child);
            }
        }
        _ if prefix.is_empty() => {}
        Value::Null => {
            row.insert(prefix, String::new());
        }
        Value::String(s) => {
            row.insert(prefix, s.clone());
        }
        other => {
            row.insert(prefix, other.to_string());
        }
    }
}

/// 将表格写为 `;` 分隔的 UTF-8 CSV
pub fn write_csv(table: &Table, path: &Path) -> AppResult<()> {
    let csv_err = |e: csv::Error| AppError::csv_failed(path.display().to_string(), e);

    let mut writer = csv::WriterBuilder::new()
        .delimiter(CSV_DELIMITER)
        .from_path(path)
        .map_err(csv_err)?;

    writer.write_record(&table.columns).map_err(csv_err)?;
    for row in &table.rows {
        writer.write_record(row).map_err(csv_err)?;
    }
    writer
        .flush()
        .map_err(|e| AppError::file_write_failed(path.display().to_string(), e))
}
