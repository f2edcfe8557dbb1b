use anyhow::{Context, Result};
use batch_cli::config::Config;
use batch_cli::logger;
use batch_cli::orchestrator::{self, RunOptions};
use batch_cli::services::{AnthropicBatchClient, LocalCompletionClient};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::error;

/// Batch CLI：准备、执行和解析大模型批处理推理任务
#[derive(Parser)]
#[command(name = "batch-cli", version)]
#[command(about = "Create, run and parse LLM batch inference jobs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 从 CSV 和配置文件生成批处理 JSONL 文件
    Create {
        /// 题目 CSV（question_id, question, image_path）
        csv_path: PathBuf,
        /// 批处理配置文件（TOML）
        config_file: PathBuf,
        /// 输出目录
        #[arg(default_value = ".")]
        output_dir: PathBuf,
    },

    /// 在本地推理端点上逐条执行批处理文件
    Run {
        /// 批处理请求文件（OpenAI 格式 JSONL）
        file_path: PathBuf,
        /// 每处理多少条响应写盘一次
        #[arg(long, default_value_t = 100, value_parser = clap::value_parser!(u64).range(1..))]
        interval: u64,
        /// 输出目录
        #[arg(long, default_value = ".")]
        output_dir: PathBuf,
        /// 覆盖请求中的模型名
        #[arg(long)]
        model: Option<String>,
    },

    /// 提交 Anthropic 格式的批处理文件到托管批处理接口
    RunAnthropic {
        /// 批处理请求文件（Anthropic 格式 JSONL）
        file_path: PathBuf,
    },

    /// 把响应 JSONL 文件解析为 CSV 报告
    Parse {
        /// 响应文件
        input_path: PathBuf,
        /// 输出目录
        #[arg(default_value = ".")]
        output_dir: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // 加载 .env（可选）
    dotenv::dotenv().ok();

    // 初始化日志
    logger::init();

    let cli = Cli::parse();

    // 加载配置
    let config = Config::from_env();

    if let Err(e) = execute(cli.command, &config).await {
        error!("❌ {:#}", e);
        return Err(e);
    }

    Ok(())
}

async fn execute(command: Commands, config: &Config) -> Result<()> {
    match command {
        Commands::Create {
            csv_path,
            config_file,
            output_dir,
        } => {
            let path = orchestrator::create_batch_file(&csv_path, &config_file, &output_dir)
                .await
                .context("生成批处理文件失败")?;
            println!("Batch file saved to {}", path.display());
        }
        Commands::Run {
            file_path,
            interval,
            output_dir,
            model,
        } => {
            let options = RunOptions {
                flush_interval: interval as usize,
                output_dir,
                model,
            };
            let client = LocalCompletionClient::new(config);
            let outcome = orchestrator::run_batch_file(&file_path, &options, &client)
                .await
                .context("执行批处理失败")?;
            println!("Results saved to {}", outcome.output_path.display());
        }
        Commands::RunAnthropic { file_path } => {
            let client = AnthropicBatchClient::new(config)?;
            let handle = orchestrator::submit_anthropic_file(&file_path, &client)
                .await
                .context("提交 Anthropic 批处理失败")?;
            println!("Number of requests in batch: {}", handle.request_count);
            println!("Batch ID: {}", handle.id);
        }
        Commands::Parse {
            input_path,
            output_dir,
        } => {
            let path = orchestrator::parse_response_file(&input_path, &output_dir)
                .context("解析响应文件失败")?;
            println!("File saved to {}", path.display());
        }
    }

    Ok(())
}
