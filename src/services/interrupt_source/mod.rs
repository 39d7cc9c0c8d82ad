//! Interrupt sources: responsibility and boundaries
//!
//! Sources turn external events into interrupt signals. They MUST NOT hold
//! any idle-timeout state; the controller consuming `on_interrupt()` owns that.

mod event_target;
mod options;
mod throttle;
mod r#trait;
mod window;

pub use self::event_target::{EventFilter, EventTargetInterruptSource};
pub use self::options::{InterruptOptions, OptionsArg, PartialOptions, DEFAULT_THROTTLE_DELAY_MS};
pub use self::r#trait::{create_interrupt_source, InterruptSource};
pub use self::throttle::ThrottleGate;
pub use self::window::WindowInterruptSource;
