use smallvec::SmallVec;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;

/// Имя события (дешёвое клонирование)
pub type EventName = Arc<str>;

/// Подсказка регистрации слушателя
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ListenerOptions {
    pub passive: bool,
}

impl ListenerOptions {
    pub fn passive(passive: bool) -> Self {
        Self { passive }
    }
}

/// Событие, которое цель рассылает зарегистрированным обработчикам
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListenerEvent {
    pub name: EventName,
    pub timestamp: Instant,
}

impl ListenerEvent {
    pub fn new(name: impl Into<EventName>) -> Self {
        Self {
            name: name.into(),
            timestamp: Instant::now(),
        }
    }
}

impl fmt::Display for ListenerEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}ms ago)",
            self.name,
            self.timestamp.elapsed().as_millis()
        )
    }
}

/// Набор имён событий, разобранный один раз при создании источника.
///
/// Токены разделяются любыми пробельными символами, дубликаты схлопываются,
/// порядок первого вхождения сохраняется.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventNames(SmallVec<[EventName; 4]>);

impl EventNames {
    pub fn parse(names: &str) -> Self {
        let mut tokens: SmallVec<[EventName; 4]> = SmallVec::new();
        for token in names.split_ascii_whitespace() {
            if !tokens.iter().any(|t| &**t == token) {
                tokens.push(Arc::from(token));
            }
        }
        Self(tokens)
    }

    pub fn iter(&self) -> impl Iterator<Item = &EventName> {
        self.0.iter()
    }

    #[cfg(test)]
    pub(crate) fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|t| &**t == name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for EventNames {
    fn from(names: &str) -> Self {
        Self::parse(names)
    }
}

impl fmt::Display for EventNames {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.0.iter().map(|n| &**n).collect();
        write!(f, "{}", names.join(" "))
    }
}
