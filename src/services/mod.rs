pub mod emitter;
pub mod interrupt_source;
pub mod scheduler;
pub mod target;

pub use emitter::{InterruptEmitter, SubscriptionId};
pub use interrupt_source::{
    create_interrupt_source, EventTargetInterruptSource, InterruptOptions, InterruptSource,
    OptionsArg, PartialOptions, WindowInterruptSource,
};
pub use scheduler::{default_scheduler, ManualScheduler, Scheduler, TokioScheduler};
pub use target::{
    global_window, DefaultWindowProvider, EventDispatcher, EventTarget, GlobalTargetProvider,
    NoWindowProvider, PlainObject, TargetObject,
};
