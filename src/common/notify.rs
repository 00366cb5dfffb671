use std::sync::{Arc, Mutex};

use colored::*;
use tracing::{debug, info};

/// 提示级别
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Success,
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub level: ToastLevel,
    pub message: String,
}

/// 面向用户的短暂提示（toast）
pub trait Notifier: Send + Sync {
    fn notify(&self, level: ToastLevel, message: &str);

    fn success(&self, message: &str) {
        self.notify(ToastLevel::Success, message);
    }

    fn info(&self, message: &str) {
        self.notify(ToastLevel::Info, message);
    }

    fn warning(&self, message: &str) {
        self.notify(ToastLevel::Warning, message);
    }

    fn error(&self, message: &str) {
        self.notify(ToastLevel::Error, message);
    }
}

impl<N: Notifier + ?Sized> Notifier for Arc<N> {
    fn notify(&self, level: ToastLevel, message: &str) {
        (**self).notify(level, message);
    }
}

/// 终端彩色输出
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleNotifier;

impl ConsoleNotifier {
    /// 渲染一行提示，返回值第一项表示是否写到 stderr
    pub fn render(level: ToastLevel, message: &str) -> (bool, String) {
        let (to_stderr, symbol) = match level {
            ToastLevel::Success => (false, "✓".green().bold()),
            ToastLevel::Info => (false, "ℹ".blue().bold()),
            ToastLevel::Warning => (true, "⚠".yellow().bold()),
            ToastLevel::Error => (true, "✗".red().bold()),
        };
        (to_stderr, format!("{} {}", symbol, message))
    }
}

// 每条提示只输出一次，不再经过 tracing 的 WARN/ERROR
impl Notifier for ConsoleNotifier {
    fn notify(&self, level: ToastLevel, message: &str) {
        debug!("toast [{:?}] {}", level, message);
        match Self::render(level, message) {
            (true, line) => eprintln!("{}", line),
            (false, line) => println!("{}", line),
        }
    }
}

/// 把提示留在内存里，由界面自行取走展示
#[derive(Debug, Default, Clone)]
pub struct ToastQueue {
    toasts: Arc<Mutex<Vec<Toast>>>,
}

impl ToastQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// 取走当前所有提示
    pub fn drain(&self) -> Vec<Toast> {
        match self.toasts.lock() {
            Ok(mut guard) => guard.drain(..).collect(),
            Err(_) => vec![],
        }
    }

    pub fn snapshot(&self) -> Vec<Toast> {
        match self.toasts.lock() {
            Ok(guard) => guard.clone(),
            Err(_) => vec![],
        }
    }

    pub fn last(&self) -> Option<Toast> {
        self.snapshot().pop()
    }
}

impl Notifier for ToastQueue {
    fn notify(&self, level: ToastLevel, message: &str) {
        info!("toast [{:?}] {}", level, message);
        if let Ok(mut guard) = self.toasts.lock() {
            guard.push(Toast {
                level,
                message: message.to_string(),
            });
        }
    }
}

/// 分割线
pub fn separator() {
    println!("{}", "─".repeat(50).bright_black());
}

/// 标题
pub fn title(text: &str) {
    let width = text.chars().count().min(48);
    let padding = (48 - width) / 2;
    println!(
        "{} {} {}",
        "─".repeat(padding).bright_black(),
        text.bold(),
        "─".repeat(48 - padding - width).bright_black()
    );
}
