use crate::events::{EventNames, SourceKind};
use crate::services::emitter::InterruptEmitter;
use crate::services::scheduler::Scheduler;
use crate::services::target::{DefaultWindowProvider, GlobalTargetProvider};
use std::sync::Arc;

use super::event_target::EventTargetInterruptSource;
use super::options::{InterruptOptions, OptionsArg};
use super::r#trait::InterruptSource;

/// Источник прерываний, привязанный к глобальному окну
pub struct WindowInterruptSource {
    inner: EventTargetInterruptSource,
}

impl WindowInterruptSource {
    pub fn new(event_names: &str, options: impl Into<OptionsArg>) -> Self {
        Self::with_provider(&DefaultWindowProvider, event_names, options)
    }

    /// В режиме SSR провайдер не опрашивается вовсе
    pub fn with_provider(
        provider: &dyn GlobalTargetProvider,
        event_names: &str,
        options: impl Into<OptionsArg>,
    ) -> Self {
        let options: OptionsArg = options.into();
        let options = options.resolve();
        let window = if options.ssr { None } else { provider.window() };

        Self {
            inner: EventTargetInterruptSource::from_parts(
                window,
                EventNames::parse(event_names),
                options,
                SourceKind::Window,
            ),
        }
    }

    pub fn with_scheduler(self, scheduler: Arc<dyn Scheduler>) -> Self {
        Self {
            inner: self.inner.with_scheduler(scheduler),
        }
    }

    pub fn event_names(&self) -> &EventNames {
        self.inner.event_names()
    }
}

impl InterruptSource for WindowInterruptSource {
    fn attach(&self) {
        self.inner.attach();
    }

    fn detach(&self) {
        self.inner.detach();
    }

    fn on_interrupt(&self) -> &InterruptEmitter {
        self.inner.on_interrupt()
    }

    fn is_attached(&self) -> bool {
        self.inner.is_attached()
    }

    fn options(&self) -> &InterruptOptions {
        self.inner.options()
    }
}
