//! 操作员通知
//!
//! 转换结果以即发即忘的方式呈现给操作员，工作流不观察回执

use serde::{Deserialize, Serialize};
use std::sync::Mutex;

/// 通知严重级别
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Severity {
    Success, // 成功
    Error,   // 失败
    Info,    // 提示
}

/// 通知接收端
pub trait NotificationSink: Send + Sync {
    fn notify(&self, message: &str, severity: Severity);
}

/// 通过 tracing 输出的默认通知端
#[derive(Debug, Default)]
pub struct TracingSink;

impl TracingSink {
    pub fn new() -> Self {
        Self
    }
}

impl NotificationSink for TracingSink {
    fn notify(&self, message: &str, severity: Severity) {
        match severity {
            Severity::Error => tracing::warn!("操作员通知: {}", message),
            Severity::Success | Severity::Info => tracing::info!("操作员通知: {}", message),
        }
    }
}

/// 内存通知端，用于测试与演示
#[derive(Debug, Default)]
pub struct MemorySink {
    messages: Mutex<Vec<(String, Severity)>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// 取出已收到的全部通知
    pub fn messages(&self) -> Vec<(String, Severity)> {
        self.messages.lock().expect("notification sink poisoned").clone()
    }
}

impl NotificationSink for MemorySink {
    fn notify(&self, message: &str, severity: Severity) {
        self.messages
            .lock()
            .expect("notification sink poisoned")
            .push((message.to_string(), severity));
    }
}
