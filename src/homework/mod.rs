//! 作业状态：API 客户端与响应解析

pub mod client;
pub mod codec;

pub use client::{interpret_response, HomeworkApi, PracticumClient};
pub use codec::{current_date, parse_status, validate_response, HomeworkStatus};
