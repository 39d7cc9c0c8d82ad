use once_cell::sync::Lazy;
use std::sync::Arc;

use super::dispatcher::EventDispatcher;
use super::r#trait::TargetObject;

/// Глобальное окно процесса. Хост рассылает в него «нативные» события.
static GLOBAL_WINDOW: Lazy<Arc<EventDispatcher>> = Lazy::new(|| Arc::new(EventDispatcher::new()));

pub fn global_window() -> Arc<EventDispatcher> {
    Arc::clone(&GLOBAL_WINDOW)
}

/// Supplies the global window object to window-bound sources
pub trait GlobalTargetProvider: Send + Sync {
    fn window(&self) -> Option<Arc<dyn TargetObject>>;
}

/// Провайдер по умолчанию: глобальное окно процесса
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultWindowProvider;

impl GlobalTargetProvider for DefaultWindowProvider {
    fn window(&self) -> Option<Arc<dyn TargetObject>> {
        Some(global_window())
    }
}

/// Хост без окна (серверный рендеринг, CLI без терминала)
#[derive(Debug, Default, Clone, Copy)]
pub struct NoWindowProvider;

impl GlobalTargetProvider for NoWindowProvider {
    fn window(&self) -> Option<Arc<dyn TargetObject>> {
        None
    }
}

/// Провайдер с заранее заданным объектом окна (заглушки в тестах)
#[derive(Clone)]
pub struct StaticWindowProvider {
    window: Arc<dyn TargetObject>,
}

impl StaticWindowProvider {
    pub fn new(window: Arc<dyn TargetObject>) -> Self {
        Self { window }
    }
}

impl GlobalTargetProvider for StaticWindowProvider {
    fn window(&self) -> Option<Arc<dyn TargetObject>> {
        Some(Arc::clone(&self.window))
    }
}
