use super::listener::ListenerEvent;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Вид источника, породившего прерывание
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    EventTarget,
    Window,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceKind::EventTarget => write!(f, "event_target"),
            SourceKind::Window => write!(f, "window"),
        }
    }
}

/// Полезная нагрузка сигнала onInterrupt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterruptArgs {
    pub source: SourceKind,
    pub event: ListenerEvent,
}

impl InterruptArgs {
    pub fn from_event(source: SourceKind, event: ListenerEvent) -> Self {
        Self { source, event }
    }

    pub fn event_name(&self) -> &str {
        &self.event.name
    }
}

impl fmt::Display for InterruptArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.source, self.event)
    }
}
