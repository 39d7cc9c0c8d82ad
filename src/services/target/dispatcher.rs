use crate::events::{EventName, ListenerEvent, ListenerOptions};
use crate::trace_if_enabled;
use dashmap::DashMap;
use smallvec::SmallVec;
use std::sync::Arc;

use super::r#trait::{same_handler, EventHandler, EventTarget, TargetObject};

/// Зарегистрированный обработчик
#[derive(Clone)]
struct Registration {
    handler: EventHandler,
    options: ListenerOptions,
}

/// Цель событий в памяти: таблица слушателей по имени события.
///
/// Рассылка синхронная, в порядке регистрации. Обработчики вызываются вне
/// блокировок таблицы, поэтому могут регистрировать и снимать слушателей.
#[derive(Default)]
pub struct EventDispatcher {
    listeners: DashMap<EventName, SmallVec<[Registration; 2]>>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Разослать событие всем обработчикам, подписанным на его имя
    pub fn dispatch(&self, event: &ListenerEvent) -> usize {
        // Снимок, чтобы не держать шард DashMap во время вызова обработчиков
        let handlers: SmallVec<[EventHandler; 4]> = match self.listeners.get(&*event.name) {
            Some(entry) => entry.iter().map(|r| Arc::clone(&r.handler)).collect(),
            None => SmallVec::new(),
        };

        trace_if_enabled!("Рассылка '{}' для {} обработчиков", event.name, handlers.len());

        for handler in &handlers {
            handler(event);
        }
        handlers.len()
    }

    pub fn dispatch_named(&self, name: &str) -> usize {
        self.dispatch(&ListenerEvent::new(name))
    }

    pub fn listener_count(&self, name: &str) -> usize {
        self.listeners.get(name).map(|entry| entry.len()).unwrap_or(0)
    }

    pub fn total_listener_count(&self) -> usize {
        self.listeners.iter().map(|entry| entry.len()).sum()
    }

    /// Опции, с которыми были зарегистрированы слушатели события
    pub fn registered_options(&self, name: &str) -> Vec<ListenerOptions> {
        self.listeners
            .get(name)
            .map(|entry| entry.iter().map(|r| r.options).collect())
            .unwrap_or_default()
    }
}

impl EventTarget for EventDispatcher {
    fn add_event_listener(&self, name: &str, handler: &EventHandler, options: ListenerOptions) {
        let mut entry = self.listeners.entry(Arc::from(name)).or_default();
        // Повторная регистрация того же обработчика ничего не меняет
        if entry.iter().any(|r| same_handler(&r.handler, handler)) {
            return;
        }
        entry.push(Registration {
            handler: Arc::clone(handler),
            options,
        });
    }

    fn remove_event_listener(&self, name: &str, handler: &EventHandler, _options: ListenerOptions) {
        let now_empty = match self.listeners.get_mut(name) {
            Some(mut entry) => {
                entry.retain(|r| !same_handler(&r.handler, handler));
                entry.is_empty()
            }
            None => false,
        };

        if now_empty {
            self.listeners.remove_if(name, |_, registrations| registrations.is_empty());
        }
    }
}

impl TargetObject for EventDispatcher {
    fn event_target(&self) -> Option<&dyn EventTarget> {
        Some(self)
    }
}
