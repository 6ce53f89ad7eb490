//! 通知层
//!
//! - `NotificationChannel`：消息发送能力（Telegram 等）
//! - `Notifier`：包装渠道，投递失败只记录日志
//! - `NotificationGate`：按完整文本去重，只记住最近一条

pub mod channel;
pub mod channels;
pub mod gate;
pub mod notifier;

pub use channel::{NotificationChannel, SendResult};
pub use channels::{TelegramChannel, TelegramConfig};
pub use gate::NotificationGate;
pub use notifier::Notifier;
