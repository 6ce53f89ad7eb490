//! 错误类型
//!
//! `PollError` 覆盖单次轮询中可能出现的全部错误，由 `PollLoop` 统一捕获并转换为通知；
//! `ConfigError` 只在启动阶段出现，是唯一会终止进程的错误。
//!
//! `Display` 文本会原样嵌入发往 Telegram 的失败通知，并用于去重比较，
//! 因此必须对相同的失败产生完全相同的文本，且不能包含任何 token。

use thiserror::Error;

/// 单次轮询错误
#[derive(Debug, Error)]
pub enum PollError {
    /// 请求根本没有完成（DNS、连接、超时）
    #[error("Ошибка запроса к API: {message}. Параметры: {endpoint} from_date={from_date}")]
    Transport {
        endpoint: String,
        from_date: i64,
        message: String,
    },

    /// 响应状态码不是 200
    #[error("Не получен ответ API. Код ответа: {status}")]
    HttpStatus { status: u16 },

    /// 响应体包含 `error` 或 `code` 键
    #[error("Отказ сервера. В ответе найден ключ: {key}. Ошибка: {value}")]
    ApiKey { key: String, value: String },

    /// 响应结构不符合预期
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// 未知的作业状态
    #[error("Неизвестный статус работы - {status}")]
    UnknownStatus { status: String },
}

impl PollError {
    /// 用于日志字段的简短分类名
    pub fn kind(&self) -> &'static str {
        match self {
            PollError::Transport { .. } => "transport",
            PollError::HttpStatus { .. } => "http_status",
            PollError::ApiKey { .. } => "api_key",
            PollError::Schema(_) => "schema",
            PollError::UnknownStatus { .. } => "unknown_status",
        }
    }
}

/// 响应结构错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// 响应体不是合法 JSON
    #[error("Ответ API не является JSON: {0}")]
    InvalidJson(String),

    /// 顶层不是对象
    #[error("Ответ содержит не словарь, а {found}.")]
    NotAnObject { found: &'static str },

    /// 缺少必需的键
    #[error("Отсутствует ключ {key}.")]
    MissingKey { key: &'static str },

    /// `homeworks` 不是数组
    #[error("{key} является не списком, а {found}.")]
    NotAList { key: &'static str, found: &'static str },
}

/// 启动配置错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// 缺少一个或多个必需的环境变量
    #[error("Отсутствует токен/ы {}. Бот не сможет работать", .keys.join(", "))]
    Missing { keys: Vec<&'static str> },
}

/// JSON 值的类型名（用于错误文本）
pub(crate) fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "list",
        serde_json::Value::Object(_) => "dict",
    }
}
