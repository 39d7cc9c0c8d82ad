pub mod interrupt;
pub mod listener;

pub use interrupt::{InterruptArgs, SourceKind};
pub use listener::{EventName, EventNames, ListenerEvent, ListenerOptions};
