//! # Batch CLI
//!
//! 一个用于准备、提交和解析大模型批处理推理任务的命令行工具
//!
//! ## 架构设计
//!
//! 本系统采用四层架构：
//!
//! ### ① 基础层（Models / Utils）
//! - `models/` - 题目、消息、请求记录、响应记录，以及 CSV / TOML 加载
//! - `utils/` - JSONL 读写、图片编码、日志
//!
//! ### ② 业务能力层（Services）
//! - `message_formatter` - 按方言构建对话消息
//! - `batch_builder` - 题目列表 → 批处理请求记录
//! - `completion_client` - 本地 chat completion 调用
//! - `anthropic_batches` - Anthropic 托管批处理提交
//! - `response_writer` - 响应追加写入
//! - `batch_parser` - 响应文件解析与表格导出
//!
//! ### ③ 流程层（Workflow）
//! - `RequestFlow` - 单条请求：调用 → 分类 → 响应记录
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/batch_runner` - 缓冲写盘的本地执行器
//! - `orchestrator/commands` - create / run / run-anthropic / parse
//!
//! ## 模块结构

pub mod config;
pub mod error;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::{BatchConfig, Config};
pub use error::{AppError, AppResult};
pub use models::{
    BatchRequestRecord, BatchResponseRecord, Dialect, Message, OpenAiBatchRequest, Question,
    ResponseBody,
};
pub use orchestrator::{create_batch_file, parse_response_file, run_batch_file, submit_anthropic_file};
pub use services::{BatchSettings, ChatCompletionClient};
pub use utils::logging as logger;
pub use workflow::RequestFlow;
