//! 可观测性：tracing 初始化与庭审记录的展示
//!
//! 展示逻辑以 HistoryObserver 的形式挂到 CourtSimulation 上，核心流程不直接打印。

use std::io::Write;

use crossterm::style::{Color, Stylize};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::court::{CourtRole, HistoryObserver, Turn};

/// 初始化日志：RUST_LOG 优先，否则使用 level（默认 info）
pub fn init(level: Option<&str>) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.unwrap_or("info").to_lowercase()));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false))
        .try_init();
}

pub fn role_color(role: CourtRole) -> Color {
    match role {
        CourtRole::Clerk => Color::Cyan,
        CourtRole::Judge => Color::Yellow,
        CourtRole::Plaintiff => Color::Green,
        CourtRole::Defendant => Color::Red,
    }
}

/// 面板文本（不含颜色）
pub fn render_panel(turn: &Turn, timestamp: &str) -> String {
    let mut out = format!("╭─ {} ({}) · {}\n", turn.role, turn.name, timestamp);
    for line in turn.content.lines() {
        out.push_str("│ ");
        out.push_str(line);
        out.push('\n');
    }
    out.push_str("╰─");
    out
}

/// 控制台面板：按角色着色
#[derive(Debug, Default)]
pub struct ConsolePresenter;

impl HistoryObserver for ConsolePresenter {
    fn on_turn(&self, _index: usize, speaker: CourtRole, turn: &Turn) {
        let timestamp = chrono::Local::now().format("%H:%M:%S").to_string();
        let panel = render_panel(turn, &timestamp).with(role_color(speaker));
        let mut stdout = std::io::stdout().lock();
        let _ = writeln!(stdout, "{}\n", panel);
    }
}

/// 把每条发言写入日志
#[derive(Debug, Default)]
pub struct TracingObserver;

impl HistoryObserver for TracingObserver {
    fn on_turn(&self, index: usize, speaker: CourtRole, turn: &Turn) {
        tracing::debug!(
            index,
            role = %speaker,
            name = %turn.name,
            chars = turn.content.chars().count(),
            "Turn appended"
        );
    }
}

/// 测试用：收集闭包执行期间产生的 WARN 日志消息
#[cfg(test)]
pub(crate) fn capture_warnings<T>(f: impl FnOnce() -> T) -> (Vec<String>, T) {
    let layer = WarnCapture::default();
    let messages = layer.messages.clone();
    let subscriber = tracing_subscriber::registry().with(layer);
    let out = tracing::subscriber::with_default(subscriber, f);
    let collected = messages.lock().map(|m| m.clone()).unwrap_or_default();
    (collected, out)
}

/// 测试用：安装到当前线程直到 guard 释放，适合 current_thread 运行时下的异步测试
#[cfg(test)]
pub(crate) fn capture_warnings_scoped() -> (
    std::sync::Arc<std::sync::Mutex<Vec<String>>>,
    tracing::subscriber::DefaultGuard,
) {
    let layer = WarnCapture::default();
    let messages = layer.messages.clone();
    let guard = tracing::subscriber::set_default(tracing_subscriber::registry().with(layer));
    (messages, guard)
}

#[cfg(test)]
#[derive(Default)]
struct WarnCapture {
    messages: std::sync::Arc<std::sync::Mutex<Vec<String>>>,
}

#[cfg(test)]
impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for WarnCapture {
    fn on_event(
        &self,
        event: &tracing::Event<'_>,
        _ctx: tracing_subscriber::layer::Context<'_, S>,
    ) {
        if *event.metadata().level() != tracing::Level::WARN {
            return;
        }
        let mut visitor = MessageVisitor(String::new());
        event.record(&mut visitor);
        if let Ok(mut messages) = self.messages.lock() {
            messages.push(visitor.0);
        }
    }
}

#[cfg(test)]
struct MessageVisitor(String);

#[cfg(test)]
impl tracing::field::Visit for MessageVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.0 = format!("{:?}", value);
        }
    }
}
