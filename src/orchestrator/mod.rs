//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责文件级的处理和调度，是整个系统的"指挥中心"。
//!
//! ## 模块划分
//!
//! ### `commands` - 命令实现
//! - create：CSV + 配置 → 批处理请求文件
//! - run：请求文件 → 本地逐条执行 → 响应文件
//! - run-anthropic：请求文件 → 托管批处理
//! - parse：响应文件 → CSV 报告
//!
//! ### `batch_runner` - 本地批处理执行器
//! - 惰性消费请求
//! - 持有响应缓冲区，按间隔写盘
//! - 汇总执行统计
//!
//! ## 层次关系
//!
//! ```text
//! commands (处理文件)
//!     ↓
//! batch_runner (处理请求序列)
//!     ↓
//! workflow::RequestFlow (处理单条请求)
//!     ↓
//! services (能力层：formatter / builder / completion / parser)
//! ```

pub mod batch_runner;
pub mod commands;

pub use batch_runner::{run_local, RunSummary};
pub use commands::{
    create_batch_file, parse_response_file, run_batch_file, submit_anthropic_file, RunOptions,
    RunOutcome,
};
