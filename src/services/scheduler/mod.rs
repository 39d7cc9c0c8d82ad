mod manual;
mod tokio_scheduler;
mod r#trait;

use once_cell::sync::Lazy;
use std::sync::Arc;

pub use self::manual::ManualScheduler;
pub use self::r#trait::{Scheduler, TimerCallback, TimerId};
pub use self::tokio_scheduler::TokioScheduler;

static DEFAULT_SCHEDULER: Lazy<Arc<TokioScheduler>> = Lazy::new(|| Arc::new(TokioScheduler::new()));

/// Общий планировщик процесса для источников без явного планировщика
pub fn default_scheduler() -> Arc<dyn Scheduler> {
    DEFAULT_SCHEDULER.clone()
}
