//! 通知发送器 - 包装渠道，吞掉并记录投递失败

use std::sync::Arc;
use tracing::{debug, error, info};

use super::channel::{NotificationChannel, SendResult};

/// 通知发送器
///
/// 投递失败只记录日志，从不向调用方传播。
pub struct Notifier {
    channel: Arc<dyn NotificationChannel>,
    /// 是否为 dry-run 模式
    dry_run: bool,
}

impl Notifier {
    pub fn new(channel: Arc<dyn NotificationChannel>) -> Self {
        Self {
            channel,
            dry_run: false,
        }
    }

    /// 设置 dry-run 模式
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// 发送消息，返回结果但不会失败
    pub fn send(&self, text: &str) -> SendResult {
        let channel = self.channel.name();

        if self.dry_run {
            info!(channel = %channel, message = %text, "[DRY-RUN] Would send message");
            return SendResult::Skipped("dry-run".to_string());
        }

        info!(channel = %channel, message = %text, "Sending message");
        match self.channel.send(text) {
            Ok(SendResult::Sent) => {
                debug!(channel = %channel, "Message sent");
                SendResult::Sent
            }
            Ok(SendResult::Failed(reason)) => {
                error!(channel = %channel, message = %text, error = %reason, "Failed to deliver message");
                SendResult::Failed(reason)
            }
            Ok(other) => other,
            Err(e) => {
                error!(channel = %channel, message = %text, error = %e, "Failed to deliver message");
                SendResult::Failed(e.to_string())
            }
        }
    }

    pub fn channel_name(&self) -> &str {
        self.channel.name()
    }
}
