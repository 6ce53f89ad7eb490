//! 作业状态解析
//!
//! 校验 API 响应结构，从最新一条作业记录生成通知文本。

use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

use crate::error::{json_type_name, PollError, SchemaError};

pub const HOMEWORKS_KEY: &str = "homeworks";
pub const CURRENT_DATE_KEY: &str = "current_date";
pub const HOMEWORK_NAME_KEY: &str = "homework_name";
pub const STATUS_KEY: &str = "status";

/// 作业审核状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HomeworkStatus {
    Approved,
    Reviewing,
    Rejected,
}

impl HomeworkStatus {
    pub const ALL: [HomeworkStatus; 3] = [
        HomeworkStatus::Approved,
        HomeworkStatus::Reviewing,
        HomeworkStatus::Rejected,
    ];

    /// API 中使用的状态码
    pub fn code(&self) -> &'static str {
        match self {
            HomeworkStatus::Approved => "approved",
            HomeworkStatus::Reviewing => "reviewing",
            HomeworkStatus::Rejected => "rejected",
        }
    }

    /// 面向用户的审核结论
    pub fn verdict(&self) -> &'static str {
        match self {
            HomeworkStatus::Approved => "Работа проверена: ревьюеру всё понравилось. Ура!",
            HomeworkStatus::Reviewing => "Работа взята на проверку ревьюером.",
            HomeworkStatus::Rejected => "Работа проверена: у ревьюера есть замечания.",
        }
    }
}

impl fmt::Display for HomeworkStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for HomeworkStatus {
    type Err = PollError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.code() == s)
            .ok_or_else(|| PollError::UnknownStatus {
                status: s.to_string(),
            })
    }
}

/// 校验响应结构，返回 `homeworks` 列表（最新的在前）
pub fn validate_response(response: &Value) -> Result<&[Value], PollError> {
    debug!("Validating API response");
    let object = response.as_object().ok_or(SchemaError::NotAnObject {
        found: json_type_name(response),
    })?;

    let homeworks = object
        .get(HOMEWORKS_KEY)
        .ok_or(SchemaError::MissingKey { key: HOMEWORKS_KEY })?;

    let list = homeworks.as_array().ok_or(SchemaError::NotAList {
        key: HOMEWORKS_KEY,
        found: json_type_name(homeworks),
    })?;

    debug!(count = list.len(), "API response contains a homeworks list");
    Ok(list)
}

/// 从单条作业记录生成通知文本
pub fn parse_status(homework: &Value) -> Result<String, PollError> {
    let name = homework
        .get(HOMEWORK_NAME_KEY)
        .ok_or(SchemaError::MissingKey {
            key: HOMEWORK_NAME_KEY,
        })?;
    let status = homework
        .get(STATUS_KEY)
        .ok_or(SchemaError::MissingKey { key: STATUS_KEY })?;

    let status: HomeworkStatus = match status {
        Value::String(code) => code.parse()?,
        other => {
            return Err(PollError::UnknownStatus {
                status: other.to_string(),
            })
        }
    };

    let name = match name {
        Value::String(name) => name.clone(),
        other => other.to_string(),
    };

    debug!(homework_name = %name, status = %status, "Parsed homework status");
    Ok(format_status_message(&name, status))
}

/// 状态变更通知文本
pub fn format_status_message(homework_name: &str, status: HomeworkStatus) -> String {
    format!(
        "Изменился статус проверки работы \"{}\". {}",
        homework_name,
        status.verdict()
    )
}

/// 服务器返回的 `current_date`（不是整数时返回 None）
pub fn current_date(response: &Value) -> Option<i64> {
    response.get(CURRENT_DATE_KEY).and_then(Value::as_i64)
}
