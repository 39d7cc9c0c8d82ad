use std::fmt;
use std::time::Duration;

/// Deferred callback run once when its timer expires
pub type TimerCallback = Box<dyn FnOnce() + Send + 'static>;

/// Identifier of a scheduled callback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(pub u64);

impl fmt::Display for TimerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "timer#{}", self.0)
    }
}

/// Schedules and cancels deferred callbacks.
///
/// A callback that has not started when `cancel` returns must never run.
pub trait Scheduler: Send + Sync {
    /// Run `callback` once after `delay`
    fn schedule(&self, delay: Duration, callback: TimerCallback) -> TimerId;

    /// Cancel a pending callback; unknown or already fired ids are ignored
    fn cancel(&self, id: TimerId);

    /// Monotonic time since the scheduler was created
    fn now(&self) -> Duration;
}
