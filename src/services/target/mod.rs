//! Targets: objects interrupt sources listen on.
//!
//! This module only models listener registration and synchronous dispatch.
//! It MUST NOT know about throttling or interrupts; those live in
//! `interrupt_source`.

mod dispatcher;
mod r#trait;
mod window;

pub use self::dispatcher::EventDispatcher;
pub use self::r#trait::{same_handler, EventHandler, EventTarget, PlainObject, TargetObject};
pub use self::window::{
    global_window, DefaultWindowProvider, GlobalTargetProvider, NoWindowProvider,
    StaticWindowProvider,
};
