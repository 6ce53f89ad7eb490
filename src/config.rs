//! 配置加载
//!
//! 三个必需的凭据来自环境变量（启动时先尝试加载工作目录下的 `.env`）：
//! - `PRACTICUM_TOKEN` - Practicum API token
//! - `TELEGRAM_TOKEN` - Telegram bot token
//! - `TELEGRAM_CHAT_ID` - 接收通知的 chat id
//!
//! 任意一个缺失都是致命错误，进程不会进入轮询循环。

use std::fmt;
use std::time::Duration;
use tracing::{debug, error};

use crate::error::ConfigError;

pub const PRACTICUM_TOKEN: &str = "PRACTICUM_TOKEN";
pub const TELEGRAM_TOKEN: &str = "TELEGRAM_TOKEN";
pub const TELEGRAM_CHAT_ID: &str = "TELEGRAM_CHAT_ID";

/// 必需的环境变量，按报告顺序排列
pub const REQUIRED_KEYS: [&str; 3] = [PRACTICUM_TOKEN, TELEGRAM_TOKEN, TELEGRAM_CHAT_ID];

/// Practicum 作业状态接口
pub const DEFAULT_ENDPOINT: &str = "https://practicum.yandex.ru/api/user_api/homework_statuses/";

/// 轮询间隔（秒）
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 600;

/// HTTP 请求超时（秒）
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// 机器人凭据，构造后不可变
#[derive(Clone, PartialEq, Eq)]
pub struct BotConfig {
    api_token: String,
    bot_token: String,
    chat_id: String,
}

impl BotConfig {
    /// 直接构造（所有值必须非空）
    pub fn new(
        api_token: impl Into<String>,
        bot_token: impl Into<String>,
        chat_id: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        let values = [api_token.into(), bot_token.into(), chat_id.into()];
        let missing: Vec<&'static str> = REQUIRED_KEYS
            .iter()
            .zip(values.iter())
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(key, _)| *key)
            .collect();
        if !missing.is_empty() {
            return Err(ConfigError::Missing { keys: missing });
        }

        let [api_token, bot_token, chat_id] = values;
        Ok(Self {
            api_token,
            bot_token,
            chat_id,
        })
    }

    /// 从进程环境加载（先读取 `.env`，已存在的环境变量优先）
    pub fn from_env() -> Result<Self, ConfigError> {
        match dotenvy::dotenv() {
            Ok(path) => debug!(path = %path.display(), "Loaded .env file"),
            Err(e) if e.not_found() => debug!("No .env file found"),
            Err(e) => debug!(error = %e, "Failed to load .env file"),
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 通过任意查找函数加载，便于测试
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        debug!("Checking that all tokens are present");
        let missing = missing_keys(&lookup);
        if !missing.is_empty() {
            error!(missing = ?missing, "Required tokens are missing, the bot cannot run");
            return Err(ConfigError::Missing { keys: missing });
        }

        let get = |key: &str| lookup(key).unwrap_or_default();
        Self::new(get(PRACTICUM_TOKEN), get(TELEGRAM_TOKEN), get(TELEGRAM_CHAT_ID))
    }

    pub fn api_token(&self) -> &str {
        &self.api_token
    }

    pub fn bot_token(&self) -> &str {
        &self.bot_token
    }

    pub fn chat_id(&self) -> &str {
        &self.chat_id
    }
}

impl fmt::Debug for BotConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BotConfig")
            .field("api_token", &mask(&self.api_token))
            .field("bot_token", &mask(&self.bot_token))
            .field("chat_id", &self.chat_id)
            .finish()
    }
}

/// 返回缺失（未设置或为空）的键，顺序与 `REQUIRED_KEYS` 一致
pub fn missing_keys<F>(lookup: F) -> Vec<&'static str>
where
    F: Fn(&str) -> Option<String>,
{
    REQUIRED_KEYS
        .iter()
        .copied()
        .filter(|key| {
            lookup(*key)
                .map(|value| value.trim().is_empty())
                .unwrap_or(true)
        })
        .collect()
}

fn mask(secret: &str) -> String {
    let visible: String = secret.chars().take(4).collect();
    format!("{}***", visible)
}

/// 轮询参数
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollerSettings {
    /// 作业状态接口 URL
    pub endpoint: String,
    /// 每次迭代后的固定等待时间
    pub poll_interval: Duration,
    /// 单次 HTTP 请求超时
    pub request_timeout: Duration,
}

impl Default for PollerSettings {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            poll_interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }
}
