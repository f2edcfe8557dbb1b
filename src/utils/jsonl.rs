//! JSON-Lines 读写工具

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Lines, Write};
use std::marker::PhantomData;
use std::path::Path;

use crate::error::{AppError, AppResult};

/// 逐行读取 JSONL 文件的惰性迭代器
///
/// 每次只解码一行，空行跳过；解码失败时返回带行号（从 1 开始）的错误。
pub struct JsonlReader<T> {
    path: String,
    lines: Lines<BufReader<File>>,
    line_no: usize,
    _marker: PhantomData<T>,
}

impl<T: DeserializeOwned> JsonlReader<T> {
    pub fn open(path: &Path) -> AppResult<Self> {
        let file =
            File::open(path).map_err(|e| AppError::file_read_failed(path.display().to_string(), e))?;
        Ok(Self {
            path: path.display().to_string(),
            lines: BufReader::new(file).lines(),
            line_no: 0,
            _marker: PhantomData,
        })
    }
}

impl<T: DeserializeOwned> Iterator for JsonlReader<T> {
    type Item = AppResult<T>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(e) => return Some(Err(AppError::file_read_failed(self.path.clone(), e))),
            };
            self.line_no += 1;

            if line.trim().is_empty() {
                continue;
            }

            return Some(
                serde_json::from_str(&line).map_err(|e| AppError::record_invalid(self.line_no, e)),
            );
        }
    }
}

/// 一次性读取整个 JSONL 文件
pub fn load_jsonl<T: DeserializeOwned>(path: &Path) -> AppResult<Vec<T>> {
    JsonlReader::open(path)?.collect()
}

/// 覆盖写入 JSONL 文件
pub fn write_jsonl<T: Serialize>(records: &[T], path: &Path) -> AppResult<()> {
    let file =
        File::create(path).map_err(|e| AppError::file_write_failed(path.display().to_string(), e))?;
    write_records(BufWriter::new(file), records, path)
}

/// 追加写入 JSONL 文件（文件不存在时创建）
pub fn append_jsonl<T: Serialize>(records: &[T], path: &Path) -> AppResult<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| AppError::file_write_failed(path.display().to_string(), e))?;
    write_records(BufWriter::new(file), records, path)
}

fn write_records<T: Serialize, W: Write>(mut writer: W, records: &[T], path: &Path) -> AppResult<()> {
    let write_err = |e: std::io::Error| AppError::file_write_failed(path.display().to_string(), e);

    for record in records {
        // 序列化失败只可能来自非字符串键之类的结构问题，这里按写入失败处理
        let line = serde_json::to_string(record)
            .map_err(|e| write_err(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))?;
        writer.write_all(line.as_bytes()).map_err(write_err)?;
        writer.write_all(b"\n").map_err(write_err)?;
    }
    writer.flush().map_err(write_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    #[test]
    fn test_append_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.jsonl");

        append_jsonl(&[json!({"a": 1}), json!({"a": 2})], &path).unwrap();
        append_jsonl(&[json!({"a": 3})], &path).unwrap();

        let values: Vec<Value> = load_jsonl(&path).unwrap();
        assert_eq!(values, vec![json!({"a": 1}), json!({"a": 2}), json!({"a": 3})]);
    }

    #[test]
    fn test_write_truncates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.jsonl");

        write_jsonl(&[json!(1), json!(2)], &path).unwrap();
        write_jsonl(&[json!(3)], &path).unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "3\n");
    }

    #[test]
    fn test_reader_skips_blank_lines_and_reports_line_numbers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("in.jsonl");
        std::fs::write(&path, "{\"a\":1}\n\n{\"a\":2}\nnot json\n").unwrap();

        let mut reader = JsonlReader::<Value>::open(&path).unwrap();
        assert_eq!(reader.next().unwrap().unwrap(), json!({"a": 1}));
        assert_eq!(reader.next().unwrap().unwrap(), json!({"a": 2}));

        let err = reader.next().unwrap().unwrap_err();
        assert_eq!(err.line(), Some(4));
        assert!(reader.next().is_none());
    }
}
