use crate::events::{ListenerEvent, ListenerOptions};
use std::sync::Arc;

/// Handler registered on an event target.
///
/// Targets remove handlers by identity, so callers must keep the exact `Arc`
/// they registered.
pub type EventHandler = Arc<dyn Fn(&ListenerEvent) + Send + Sync>;

/// Any object that can be handed to an interrupt source.
///
/// Objects without listener capability return `None` and make `attach()` a no-op.
pub trait TargetObject: Send + Sync {
    fn event_target(&self) -> Option<&dyn EventTarget> {
        None
    }
}

/// Object exposing add/remove-listener capability
pub trait EventTarget: Send + Sync {
    fn add_event_listener(&self, name: &str, handler: &EventHandler, options: ListenerOptions);

    fn remove_event_listener(&self, name: &str, handler: &EventHandler, options: ListenerOptions);
}

/// Compare handlers by the address of their closure, ignoring vtables
pub fn same_handler(a: &EventHandler, b: &EventHandler) -> bool {
    std::ptr::eq(
        Arc::as_ptr(a) as *const (),
        Arc::as_ptr(b) as *const (),
    )
}

/// Object without listener capability (stub targets, SSR hosts)
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainObject;

impl TargetObject for PlainObject {}
