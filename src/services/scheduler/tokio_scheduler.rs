use crate::debug_if_enabled;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::time::Instant;
use tokio::task::JoinHandle;
use tracing::warn;

use super::r#trait::{Scheduler, TimerCallback, TimerId};

/// Активный таймер. Наличие записи в таблице и есть разрешение на запуск.
#[derive(Debug, Default)]
struct TimerTask {
    handle: Option<JoinHandle<()>>,
}

/// Планировщик на таймерах tokio.
///
/// Каждый таймер - отдельная задача со `sleep`. Если рантайма нет,
/// используется поток ОС со сном.
///
/// `now()` идёт по часам tokio, на которых спят таймеры: при остановленных
/// часах рантайма (`start_paused`) время двигается только вместе с ними.
/// Вне рантайма `tokio::time::Instant` совпадает с системными часами.
pub struct TokioScheduler {
    handle: Option<Handle>,
    started: Instant,
    next_id: AtomicU64,
    timers: Arc<DashMap<TimerId, TimerTask>>,
}

impl Default for TokioScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl TokioScheduler {
    /// Рантайм определяется в момент планирования
    pub fn new() -> Self {
        Self::build(None)
    }

    pub fn with_handle(handle: Handle) -> Self {
        Self::build(Some(handle))
    }

    fn build(handle: Option<Handle>) -> Self {
        let started = match &handle {
            Some(handle) => {
                let _guard = handle.enter();
                Instant::now()
            }
            None => Instant::now(),
        };
        Self {
            handle,
            started,
            next_id: AtomicU64::new(1),
            timers: Arc::new(DashMap::new()),
        }
    }

    pub fn pending_count(&self) -> usize {
        self.timers.len()
    }

    fn spawn_on_runtime(&self, handle: &Handle, id: TimerId, delay: Duration, callback: TimerCallback) {
        let timers = Arc::clone(&self.timers);
        let task = handle.spawn(async move {
            tokio::time::sleep(delay).await;
            if timers.remove(&id).is_some() {
                callback();
            }
        });

        // Задача могла уже завершиться - тогда записи нет и хранить нечего
        if let Some(mut entry) = self.timers.get_mut(&id) {
            entry.handle = Some(task);
        }
    }

    fn spawn_on_thread(&self, id: TimerId, delay: Duration, callback: TimerCallback) {
        let timers = Arc::clone(&self.timers);
        let spawned = std::thread::Builder::new()
            .name(format!("interrupt-{}", id))
            .spawn(move || {
                std::thread::sleep(delay);
                if timers.remove(&id).is_some() {
                    callback();
                }
            });

        if let Err(e) = spawned {
            warn!("Не удалось запустить поток таймера {}: {}", id, e);
            self.timers.remove(&id);
        }
    }
}

impl Scheduler for TokioScheduler {
    fn schedule(&self, delay: Duration, callback: TimerCallback) -> TimerId {
        let id = TimerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.timers.insert(id, TimerTask::default());

        match self.handle.clone().or_else(|| Handle::try_current().ok()) {
            Some(handle) => self.spawn_on_runtime(&handle, id, delay, callback),
            None => {
                debug_if_enabled!("Рантайм tokio недоступен, {} работает на потоке ОС", id);
                self.spawn_on_thread(id, delay, callback);
            }
        }

        debug_if_enabled!("Запланирован {} через {}мс", id, delay.as_millis());
        id
    }

    fn cancel(&self, id: TimerId) {
        if let Some((_, task)) = self.timers.remove(&id) {
            if let Some(handle) = task.handle {
                handle.abort();
            }
            debug_if_enabled!("{} отменён", id);
        }
    }

    fn now(&self) -> Duration {
        let now = match &self.handle {
            Some(handle) => {
                let _guard = handle.enter();
                Instant::now()
            }
            None => Instant::now(),
        };
        now.saturating_duration_since(self.started)
    }
}

impl Drop for TokioScheduler {
    fn drop(&mut self) {
        // Снимаем все оставшиеся таймеры, чтобы задачи не пережили планировщик
        let ids: Vec<TimerId> = self.timers.iter().map(|entry| *entry.key()).collect();
        for id in ids {
            self.cancel(id);
        }
    }
}
