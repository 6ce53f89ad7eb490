//! Practicum API 客户端
//!
//! 每次调用只发一个 GET 请求，不做内部重试；重试由下一轮轮询完成。

use serde_json::Value;
use std::time::{Duration, Instant};
use tracing::{debug, info};

use crate::config::PollerSettings;
use crate::error::{PollError, SchemaError};

/// 服务器用于拒绝请求的顶层键（即使 HTTP 状态是 200）
pub const REJECTION_KEYS: [&str; 2] = ["error", "code"];

/// 作业状态获取能力
pub trait HomeworkApi {
    /// 获取 `from_date` 之后的作业状态，返回未修改的响应体
    fn fetch(&self, from_date: i64) -> Result<Value, PollError>;
}

/// Practicum 作业状态接口的阻塞客户端
#[derive(Debug)]
pub struct PracticumClient {
    client: reqwest::blocking::Client,
    endpoint: String,
    token: String,
}

impl PracticumClient {
    /// 创建新客户端
    pub fn new(token: &str, endpoint: &str, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| anyhow::anyhow!("Cannot create HTTP client: {}", e))?;

        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
            token: token.to_string(),
        })
    }

    /// 使用轮询参数创建客户端
    pub fn from_settings(token: &str, settings: &PollerSettings) -> anyhow::Result<Self> {
        Self::new(token, &settings.endpoint, settings.request_timeout)
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl HomeworkApi for PracticumClient {
    fn fetch(&self, from_date: i64) -> Result<Value, PollError> {
        info!(endpoint = %self.endpoint, from_date, "Requesting homework statuses");

        let start = Instant::now();
        let response = self
            .client
            .get(&self.endpoint)
            .header("Authorization", format!("OAuth {}", self.token))
            .query(&[("from_date", from_date)])
            .send()
            .map_err(|e| PollError::Transport {
                endpoint: self.endpoint.clone(),
                from_date,
                message: e.to_string(),
            })?;

        let status = response.status().as_u16();
        debug!(status, elapsed_ms = start.elapsed().as_millis(), "API request completed");

        let body = response.text().map_err(|e| PollError::Transport {
            endpoint: self.endpoint.clone(),
            from_date,
            message: e.to_string(),
        })?;

        let value = interpret_response(status, &body)?;
        debug!("API response received");
        Ok(value)
    }
}

/// 校验状态码和服务器拒绝标记，返回解码后的响应体
pub fn interpret_response(status: u16, body: &str) -> Result<Value, PollError> {
    if status != 200 {
        return Err(PollError::HttpStatus { status });
    }

    let value: Value =
        serde_json::from_str(body).map_err(|e| SchemaError::InvalidJson(e.to_string()))?;

    if let Some(object) = value.as_object() {
        for key in REJECTION_KEYS {
            if let Some(detail) = object.get(key) {
                let detail = match detail {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                return Err(PollError::ApiKey {
                    key: key.to_string(),
                    value: detail,
                });
            }
        }
    }

    Ok(value)
}
