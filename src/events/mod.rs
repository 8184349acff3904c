//! Event layer - in-process publish/subscribe for log and telemetry events
//!
//! Components never talk to each other directly through the bus; they emit
//! `AppEvent`s and whoever subscribed (the log panel, the tracing mirror)
//! observes them in emission order.

pub mod bus;
pub mod log;

use std::any::Any;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

pub use bus::{EventBus, Subscription};
pub use log::EventLog;

/// Severity of an event
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    #[default]
    Info,
    Warn,
    Error,
    Debug,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
            LogLevel::Debug => "debug",
        }
    }
}

/// A completed, immutable event as delivered to listeners
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AppEvent {
    pub id: String,
    /// Milliseconds since the Unix epoch
    #[serde(rename = "ts")]
    pub timestamp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    pub level: LogLevel,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

/// A partial event handed to `EventBus::emit`.
///
/// `id` and `timestamp` are filled in by the bus when left empty.
#[derive(Clone, Debug, Default)]
pub struct EventDraft {
    pub id: Option<String>,
    pub timestamp: Option<i64>,
    pub scope: Option<String>,
    pub level: LogLevel,
    pub message: String,
    pub data: Option<serde_json::Value>,
}

impl EventDraft {
    pub fn new(level: LogLevel, message: impl Into<String>) -> Self {
        EventDraft {
            level,
            message: message.into(),
            ..Default::default()
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(LogLevel::Info, message)
    }

    pub fn warn(message: impl Into<String>) -> Self {
        Self::new(LogLevel::Warn, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(LogLevel::Error, message)
    }

    pub fn debug(message: impl Into<String>) -> Self {
        Self::new(LogLevel::Debug, message)
    }

    pub fn scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }

    pub fn data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn timestamp(mut self, ts: i64) -> Self {
        self.timestamp = Some(ts);
        self
    }
}

/// Listener that mirrors bus events into the tracing log
pub fn trace_listener() -> impl Fn(&AppEvent) + Send + Sync + 'static {
    |evt: &AppEvent| {
        let scope = evt.scope.as_deref().unwrap_or("-");
        match evt.level {
            LogLevel::Error => tracing::error!(id = %evt.id, scope, "{}", evt.message),
            LogLevel::Warn => tracing::warn!(id = %evt.id, scope, "{}", evt.message),
            LogLevel::Info => tracing::info!(id = %evt.id, scope, "{}", evt.message),
            LogLevel::Debug => tracing::debug!(id = %evt.id, scope, "{}", evt.message),
        }
    }
}

/// Listener that forwards every event into an actor's channel.
///
/// Once the receiving side is gone the events are dropped silently.
pub fn channel_listener(
    tx: mpsc::UnboundedSender<AppEvent>,
) -> impl Fn(&AppEvent) + Send + Sync + 'static {
    move |evt: &AppEvent| {
        let _ = tx.send(evt.clone());
    }
}

/// Text of a panic payload (`&str` or `String` messages), if any
pub fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "non-string panic payload"
    }
}

/// Route panics to the tracing log instead of stderr, which the TUI
/// alternate screen would swallow or garble
pub fn install_panic_hook() {
    std::panic::set_hook(Box::new(|info| {
        let location = info
            .location()
            .map(|l| format!("{}:{}", l.file(), l.line()))
            .unwrap_or_default();
        tracing::error!(
            panic = panic_message(info.payload()),
            location = %location,
            "Thread panicked"
        );
    }));
}
