//! 通知去重门
//!
//! 只记住最近一次放行的消息文本。候选消息与它完全相同时跳过，
//! 否则放行并立即覆盖记录（不论之后是否投递成功）。记录从不清空。

use tracing::debug;

/// 最近一次放行的消息
#[derive(Debug, Default)]
pub struct NotificationGate {
    last_message: Option<String>,
}

impl NotificationGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// 是否应该发送（与上一条文本不同）
    pub fn should_send(&self, candidate: &str) -> bool {
        self.last_message.as_deref() != Some(candidate)
    }

    /// 检查并记录；返回 `true` 表示放行
    pub fn admit(&mut self, candidate: &str) -> bool {
        if !self.should_send(candidate) {
            debug!(message = %candidate, "Duplicate notification suppressed");
            return false;
        }
        self.last_message = Some(candidate.to_string());
        true
    }

    pub fn last_message(&self) -> Option<&str> {
        self.last_message.as_deref()
    }
}
