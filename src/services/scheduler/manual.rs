use parking_lot::Mutex;
use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use super::r#trait::{Scheduler, TimerCallback, TimerId};

#[derive(Default)]
struct ManualState {
    now: Duration,
    next_id: u64,
    pending: BTreeMap<(Duration, TimerId), TimerCallback>,
    deadlines: HashMap<TimerId, Duration>,
}

/// Планировщик с имитируемыми часами.
///
/// Время двигается только через `advance`; таймеры срабатывают в порядке
/// дедлайнов, колбэки вызываются вне блокировки и могут планировать новые.
#[derive(Default)]
pub struct ManualScheduler {
    state: Mutex<ManualState>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Сдвинуть часы и выполнить все таймеры с дедлайном `<=` нового времени
    pub fn advance(&self, by: Duration) -> usize {
        let target = self.state.lock().now + by;
        let mut fired = 0;

        loop {
            let callback = {
                let mut state = self.state.lock();
                let due = match state.pending.keys().next() {
                    Some(&(deadline, id)) if deadline <= target => Some((deadline, id)),
                    _ => None,
                };
                match due {
                    Some((deadline, id)) => {
                        state.now = deadline;
                        state.deadlines.remove(&id);
                        state.pending.remove(&(deadline, id))
                    }
                    None => {
                        state.now = target;
                        None
                    }
                }
            };

            match callback {
                Some(callback) => {
                    callback();
                    fired += 1;
                }
                None => break,
            }
        }

        fired
    }

    pub fn advance_ms(&self, millis: u64) -> usize {
        self.advance(Duration::from_millis(millis))
    }

    pub fn pending_count(&self) -> usize {
        self.state.lock().pending.len()
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&self, delay: Duration, callback: TimerCallback) -> TimerId {
        let mut state = self.state.lock();
        state.next_id += 1;
        let id = TimerId(state.next_id);
        let deadline = state.now + delay;
        state.pending.insert((deadline, id), callback);
        state.deadlines.insert(id, deadline);
        id
    }

    fn cancel(&self, id: TimerId) {
        let mut state = self.state.lock();
        if let Some(deadline) = state.deadlines.remove(&id) {
            state.pending.remove(&(deadline, id));
        }
    }

    fn now(&self) -> Duration {
        self.state.lock().now
    }
}
