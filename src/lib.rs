//! Источники прерываний для детекции активности пользователя.
//!
//! Источник слушает именованные события на цели (или на глобальном окне),
//! пропускает их через троттлинг и сообщает подписчикам `on_interrupt()`.

pub mod config;
pub mod error;
pub mod events;
pub mod services;
pub mod utils;

pub use config::{Config, SourceConfig};
pub use error::{InterruptError, Result};
pub use events::{InterruptArgs, ListenerEvent, SourceKind};
pub use services::{
    EventTargetInterruptSource, InterruptOptions, InterruptSource, OptionsArg, PartialOptions,
    WindowInterruptSource,
};
