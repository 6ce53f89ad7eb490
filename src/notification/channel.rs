//! 通知渠道 trait 定义

use anyhow::Result;

/// 发送结果
#[derive(Debug, Clone, PartialEq)]
pub enum SendResult {
    /// 发送成功
    Sent,
    /// 跳过（dry-run 等）
    Skipped(String),
    /// 发送失败
    Failed(String),
}

impl SendResult {
    pub fn is_sent(&self) -> bool {
        matches!(self, SendResult::Sent)
    }
}

/// 消息发送能力
///
/// `Err` 表示请求本身没有完成；`Ok(SendResult::Failed)` 表示对端明确拒绝。
pub trait NotificationChannel: Send + Sync {
    /// 渠道名称（用于日志）
    fn name(&self) -> &str;

    /// 同步发送一条文本消息
    fn send(&self, text: &str) -> Result<SendResult>;
}
