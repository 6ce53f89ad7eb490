//! Homework Status Bot CLI
//!
//! 轮询 Practicum 作业状态 API，状态变化时发送 Telegram 通知

use anyhow::Result;
use clap::{Parser, Subcommand};
use homework_status_bot::{
    config::{self, DEFAULT_POLL_INTERVAL_SECS, DEFAULT_REQUEST_TIMEOUT_SECS},
    logging, BotConfig, IterationOutcome, Notifier, PollLoop, PollerSettings, PracticumClient,
    TelegramChannel, TelegramConfig,
};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "homework-bot")]
#[command(about = "Homework Status Bot - 监控作业审核状态并发送 Telegram 通知")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// 作业状态接口 URL
    #[arg(long, global = true, default_value = config::DEFAULT_ENDPOINT)]
    endpoint: String,

    /// 轮询间隔（秒）
    #[arg(long, short, global = true, default_value_t = DEFAULT_POLL_INTERVAL_SECS)]
    interval: u64,

    /// HTTP 请求超时（秒）
    #[arg(long, global = true, default_value_t = DEFAULT_REQUEST_TIMEOUT_SECS)]
    timeout: u64,

    /// 日志文件路径
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    /// 只记录日志，不实际发送 Telegram 消息
    #[arg(long, global = true)]
    dry_run: bool,

    /// 初始游标（Unix 时间戳，默认当前时间）
    #[arg(long, global = true)]
    from_date: Option<i64>,
}

#[derive(Subcommand)]
enum Commands {
    /// 持续轮询（默认）
    Run,
    /// 只执行一轮并输出结果
    Once,
    /// 检查环境变量是否齐全
    CheckConfig,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let log_path = cli.log_file.clone().unwrap_or_else(logging::default_log_path);
    if let Err(e) = logging::init(Some(&log_path)) {
        eprintln!("{:#}", e);
        return ExitCode::FAILURE;
    }

    match execute(cli) {
        Ok(code) => code,
        Err(e) => {
            error!(error = %format!("{:#}", e), "Bot stopped");
            eprintln!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn execute(cli: Cli) -> Result<ExitCode> {
    if let Some(Commands::CheckConfig) = cli.command {
        let _ = dotenvy::dotenv();
        let missing = config::missing_keys(|key| std::env::var(key).ok());
        if missing.is_empty() {
            println!("All tokens are present");
            return Ok(ExitCode::SUCCESS);
        }
        println!("Missing tokens: {}", missing.join(", "));
        return Ok(ExitCode::FAILURE);
    }

    let bot_config = BotConfig::from_env()?;
    let settings = PollerSettings {
        endpoint: cli.endpoint.clone(),
        poll_interval: Duration::from_secs(cli.interval),
        request_timeout: Duration::from_secs(cli.timeout),
    };

    let api = PracticumClient::from_settings(bot_config.api_token(), &settings)?;
    let mut telegram = TelegramConfig::new(bot_config.bot_token(), bot_config.chat_id());
    telegram.timeout = settings.request_timeout;
    let channel = Arc::new(TelegramChannel::new(telegram)?);
    let notifier = Notifier::new(channel).with_dry_run(cli.dry_run);

    let mut poll = PollLoop::new(api, notifier, &settings);
    if let Some(from_date) = cli.from_date {
        poll = poll.with_cursor(from_date);
    }

    match cli.command {
        Some(Commands::Once) => {
            let outcome = poll.tick();
            info!(cursor = poll.cursor(), "Single iteration finished");
            print_outcome(&outcome);
            Ok(ExitCode::SUCCESS)
        }
        _ => poll.run(),
    }
}

fn print_outcome(outcome: &IterationOutcome) {
    match outcome {
        IterationOutcome::Notified { message, delivery } => {
            println!("Notified ({:?}): {}", delivery, message)
        }
        IterationOutcome::Suppressed { message } => println!("Suppressed: {}", message),
        IterationOutcome::NoUpdates => println!("No new statuses"),
        IterationOutcome::Failed {
            message, delivery, ..
        } => println!("Failed ({:?}): {}", delivery, message),
    }
}
