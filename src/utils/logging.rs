//! 日志工具模块
//!
//! 提供日志初始化、格式化和输出的辅助函数

use tracing::info;
use tracing_subscriber::EnvFilter;

/// 初始化日志
///
/// 默认级别为 info，可通过 `RUST_LOG` 覆盖。重复调用不会 panic。
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// 记录批次启动信息
///
/// # 参数
/// - `batch_id`: 批次ID
/// - `input`: 请求文件路径
/// - `flush_interval`: 写盘间隔
pub fn log_startup(batch_id: &str, input: &str, flush_interval: usize) {
    info!("{}", "=".repeat(60));
    info!("🚀 开始执行批次 {}", batch_id);
    info!("📄 请求文件: {}", input);
    info!("💾 每 {} 条响应写盘一次", flush_interval);
    info!("{}", "=".repeat(60));
}

/// 记录一次写盘
///
/// # 参数
/// - `saved`: 已保存的响应总数
pub fn log_flush(saved: usize) {
    info!("💾 已保存 {} 条响应", saved);
}

/// 打印最终统计信息
///
/// # 参数
/// - `success`: 成功数量
/// - `failed`: 失败数量
/// - `total`: 总数
/// - `output`: 输出文件路径
pub fn print_final_stats(success: usize, failed: usize, total: usize, output: &str) {
    info!("{}", "=".repeat(60));
    info!("📊 批次执行完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("✅ 成功: {}/{}", success, total);
    info!("❌ 失败: {}", failed);
    info!("{}", "=".repeat(60));
    info!("结果已保存至: {}", output);
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度
///
/// # 返回
/// 返回截断后的文本
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
