//! Telegram 渠道（Bot API `sendMessage`）

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error};

use crate::notification::channel::{NotificationChannel, SendResult};

/// Telegram Bot API 基础 URL
pub const TELEGRAM_API_URL: &str = "https://api.telegram.org";

/// 默认超时（秒）
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Telegram 渠道配置
#[derive(Clone)]
pub struct TelegramConfig {
    /// Bot token
    pub bot_token: String,
    /// Chat ID
    pub chat_id: String,
    /// API 基础 URL（测试时指向本地服务）
    pub api_base: String,
    /// 请求超时
    pub timeout: Duration,
}

impl TelegramConfig {
    pub fn new(bot_token: impl Into<String>, chat_id: impl Into<String>) -> Self {
        Self {
            bot_token: bot_token.into(),
            chat_id: chat_id.into(),
            api_base: TELEGRAM_API_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }
}

/// chat_id 为整数时按数字发送，否则按字符串（如 `@channel`）
#[derive(Debug, Serialize)]
#[serde(untagged)]
enum ChatId<'a> {
    Numeric(i64),
    Username(&'a str),
}

impl<'a> ChatId<'a> {
    fn parse(raw: &'a str) -> Self {
        match raw.trim().parse::<i64>() {
            Ok(id) => ChatId::Numeric(id),
            Err(_) => ChatId::Username(raw),
        }
    }
}

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: ChatId<'a>,
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct TelegramResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

/// Telegram 渠道
pub struct TelegramChannel {
    client: reqwest::blocking::Client,
    config: TelegramConfig,
}

impl TelegramChannel {
    pub fn new(config: TelegramConfig) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| anyhow!("Cannot create HTTP client: {}", e))?;

        Ok(Self { client, config })
    }

    fn send_message_url(&self) -> String {
        format!(
            "{}/bot{}/sendMessage",
            self.config.api_base.trim_end_matches('/'),
            self.config.bot_token
        )
    }
}

impl NotificationChannel for TelegramChannel {
    fn name(&self) -> &str {
        "telegram"
    }

    fn send(&self, text: &str) -> Result<SendResult> {
        let request = SendMessageRequest {
            chat_id: ChatId::parse(&self.config.chat_id),
            text,
        };

        // URL 中包含 bot token，错误信息里去掉 URL
        let response = self
            .client
            .post(self.send_message_url())
            .json(&request)
            .send()
            .map_err(|e| anyhow!("Telegram request failed: {}", e.without_url()))?;

        let status = response.status();
        let body = response
            .text()
            .map_err(|e| anyhow!("Failed to read Telegram response: {}", e.without_url()))?;

        let parsed: Option<TelegramResponse> = serde_json::from_str(&body).ok();
        match parsed {
            Some(TelegramResponse { ok: true, .. }) if status.is_success() => {
                debug!(chat_id = %self.config.chat_id, "Telegram message delivered");
                Ok(SendResult::Sent)
            }
            Some(TelegramResponse { description, .. }) => {
                let reason = description.unwrap_or_else(|| format!("HTTP {}", status));
                error!(chat_id = %self.config.chat_id, status = %status, error = %reason, "Telegram rejected message");
                Ok(SendResult::Failed(reason))
            }
            None => {
                error!(chat_id = %self.config.chat_id, status = %status, "Unexpected Telegram response");
                Ok(SendResult::Failed(format!("HTTP {}: {}", status, body)))
            }
        }
    }
}
