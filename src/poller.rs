//! 轮询循环
//!
//! 每轮：请求 API → 校验响应 → 解析最新一条作业 → 去重 → 发送。
//! 任意一步失败都转换为一条失败通知（同样经过去重），循环继续。
//! 每轮结束后固定等待 `poll_interval`，不论成功还是失败。
//!
//! 游标（`from_date`）只在状态消息被放行发送时前移到服务器返回的
//! `current_date`，被去重跳过或失败的轮次保持不变，且游标从不回退。

use chrono::Utc;
use std::time::Duration;
use tracing::{debug, error, info};

use crate::config::PollerSettings;
use crate::error::PollError;
use crate::homework::{current_date, parse_status, validate_response, HomeworkApi};
use crate::notification::{NotificationGate, Notifier, SendResult};

/// 失败通知前缀
pub const FAILURE_PREFIX: &str = "Сбой в работе программы";

/// 单轮结果
#[derive(Debug)]
pub enum IterationOutcome {
    /// 状态变更消息已交给发送器
    Notified {
        message: String,
        delivery: SendResult,
    },
    /// 与上一条消息相同，跳过
    Suppressed { message: String },
    /// `homeworks` 为空
    NoUpdates,
    /// 本轮失败；`delivery` 为 None 表示失败通知被去重跳过
    Failed {
        error: PollError,
        message: String,
        delivery: Option<SendResult>,
    },
}

/// 轮询循环，独占游标和最近消息
pub struct PollLoop<A: HomeworkApi> {
    api: A,
    notifier: Notifier,
    gate: NotificationGate,
    cursor: i64,
    interval: Duration,
}

impl<A: HomeworkApi> PollLoop<A> {
    /// 创建循环，游标初始化为当前时间
    pub fn new(api: A, notifier: Notifier, settings: &PollerSettings) -> Self {
        Self {
            api,
            notifier,
            gate: NotificationGate::new(),
            cursor: Utc::now().timestamp(),
            interval: settings.poll_interval,
        }
    }

    /// 指定初始游标
    pub fn with_cursor(mut self, cursor: i64) -> Self {
        self.cursor = cursor;
        self
    }

    pub fn cursor(&self) -> i64 {
        self.cursor
    }

    pub fn last_message(&self) -> Option<&str> {
        self.gate.last_message()
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// 永久运行
    pub fn run(&mut self) -> ! {
        info!(
            from_date = self.cursor,
            interval_secs = self.interval.as_secs(),
            channel = %self.notifier.channel_name(),
            "Bot started"
        );
        loop {
            self.cycle();
        }
    }

    /// 执行一轮并等待固定间隔
    pub fn cycle(&mut self) -> IterationOutcome {
        let outcome = self.tick();
        debug!(outcome = ?outcome, sleep_secs = self.interval.as_secs(), "Iteration finished");
        std::thread::sleep(self.interval);
        outcome
    }

    /// 执行一轮（不等待）
    pub fn tick(&mut self) -> IterationOutcome {
        match self.poll() {
            Ok(outcome) => outcome,
            Err(error) => self.report_failure(error),
        }
    }

    fn poll(&mut self) -> Result<IterationOutcome, PollError> {
        let response = self.api.fetch(self.cursor)?;
        let homeworks = validate_response(&response)?;

        let Some(latest) = homeworks.first() else {
            debug!(from_date = self.cursor, "No new statuses");
            return Ok(IterationOutcome::NoUpdates);
        };

        let message = parse_status(latest)?;
        if !self.gate.admit(&message) {
            return Ok(IterationOutcome::Suppressed { message });
        }

        let delivery = self.notifier.send(&message);
        self.advance_cursor(current_date(&response));

        Ok(IterationOutcome::Notified { message, delivery })
    }

    fn report_failure(&mut self, error: PollError) -> IterationOutcome {
        let message = format!("{}: {}", FAILURE_PREFIX, error);
        error!(kind = error.kind(), from_date = self.cursor, error = %error, "{}", message);

        let delivery = if self.gate.admit(&message) {
            Some(self.notifier.send(&message))
        } else {
            None
        };

        IterationOutcome::Failed {
            error,
            message,
            delivery,
        }
    }

    fn advance_cursor(&mut self, current_date: Option<i64>) {
        match current_date {
            Some(date) if date >= self.cursor => {
                debug!(from = self.cursor, to = date, "Cursor advanced");
                self.cursor = date;
            }
            Some(date) => {
                debug!(cursor = self.cursor, current_date = date, "Ignoring older current_date");
            }
            None => debug!(cursor = self.cursor, "Response has no current_date"),
        }
    }
}
