use crate::config::{SourceConfig, WINDOW_TARGET};
use crate::error::{InterruptError, Result};
use crate::interrupt_error;
use crate::services::emitter::InterruptEmitter;
use crate::services::scheduler::Scheduler;
use crate::services::target::{GlobalTargetProvider, TargetObject};
use std::collections::HashMap;
use std::sync::Arc;

use super::event_target::EventTargetInterruptSource;
use super::options::InterruptOptions;
use super::window::WindowInterruptSource;

/// Common contract of every interrupt source.
///
/// An idle controller attaches each source when monitoring starts, subscribes
/// to `on_interrupt()`, and detaches when monitoring stops.
pub trait InterruptSource: Send + Sync {
    /// Start forwarding qualifying events; repeated calls do not double-register
    fn attach(&self);

    /// Stop forwarding and release listeners and timers; always safe to call
    fn detach(&self);

    fn on_interrupt(&self) -> &InterruptEmitter;

    fn is_attached(&self) -> bool;

    fn options(&self) -> &InterruptOptions;
}

/// Factory function to build a source from a config entry.
///
/// `"window"` binds to the provider's window; any other name is looked up in
/// `targets`.
pub fn create_interrupt_source(
    config: &SourceConfig,
    provider: &dyn GlobalTargetProvider,
    targets: &HashMap<String, Arc<dyn TargetObject>>,
    scheduler: Arc<dyn Scheduler>,
) -> Result<Box<dyn InterruptSource>> {
    if config.events.trim().is_empty() {
        return Err(interrupt_error!(empty_event_names, "источник '{}'", config.target));
    }

    if config.target == WINDOW_TARGET {
        return Ok(Box::new(
            WindowInterruptSource::with_provider(provider, &config.events, config.options())
                .with_scheduler(scheduler),
        ));
    }

    match targets.get(&config.target) {
        Some(target) => Ok(Box::new(
            EventTargetInterruptSource::new(Some(Arc::clone(target)), &config.events, config.options())
                .with_scheduler(scheduler),
        )),
        None => InterruptError::unknown_target(config.target.clone()),
    }
}
