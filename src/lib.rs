//! Homework Status Bot - 轮询 Practicum 作业状态并通过 Telegram 通知

pub mod config;
pub mod error;
pub mod homework;
pub mod logging;
pub mod notification;
pub mod poller;

pub use config::{BotConfig, PollerSettings};
pub use error::{ConfigError, PollError, SchemaError};
pub use homework::{HomeworkApi, HomeworkStatus, PracticumClient};
pub use notification::{NotificationChannel, NotificationGate, Notifier, SendResult, TelegramChannel, TelegramConfig};
pub use poller::{IterationOutcome, PollLoop};
