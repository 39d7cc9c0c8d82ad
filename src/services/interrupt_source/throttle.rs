use crate::services::scheduler::{Scheduler, TimerId};
use crate::trace_if_enabled;
use parking_lot::Mutex;
use std::sync::{Arc, Weak};
use std::time::Duration;

#[derive(Debug)]
struct GateState {
    open: bool,
    timer: Option<TimerId>,
    last_emitted: Option<Duration>,
    /// Номер окна; таймер открывает ворота только для своего окна
    window: u64,
    released: bool,
}

impl GateState {
    /// Окно истекло по часам планировщика, даже если таймер ещё не сработал
    fn window_elapsed(&self, now: Duration, delay: Duration) -> bool {
        match self.last_emitted {
            Some(last) => now.saturating_sub(last) >= delay,
            None => true,
        }
    }
}

/// Троттлинг по переднему фронту.
///
/// Первое событие проходит сразу и закрывает ворота на `delay`; события внутри
/// окна отбрасываются (не откладываются). Следующее событие после истечения
/// окна снова проходит и открывает новое окно.
///
/// Граница окна проверяется по `Scheduler::now()`: событие ровно в `t0 + delay`
/// проходит независимо от того, успел ли сработать таймер открытия.
pub struct ThrottleGate {
    delay: Duration,
    scheduler: Arc<dyn Scheduler>,
    state: Mutex<GateState>,
}

impl ThrottleGate {
    pub fn new(delay: Duration, scheduler: Arc<dyn Scheduler>) -> Arc<Self> {
        Arc::new(Self {
            delay,
            scheduler,
            state: Mutex::new(GateState {
                open: true,
                timer: None,
                last_emitted: None,
                window: 0,
                released: false,
            }),
        })
    }

    /// `true`, если событие должно породить прерывание
    pub fn try_pass(self: &Arc<Self>) -> bool {
        let mut state = self.state.lock();
        if state.released {
            trace_if_enabled!("Событие после освобождения ворот отброшено");
            return false;
        }

        let now = self.scheduler.now();
        if !state.open && !state.window_elapsed(now, self.delay) {
            trace_if_enabled!("Событие подавлено троттлингом");
            return false;
        }

        // Таймер прошлого окна мог ещё не сработать
        if let Some(stale) = state.timer.take() {
            self.scheduler.cancel(stale);
        }

        state.open = false;
        state.last_emitted = Some(now);
        state.window += 1;
        let window = state.window;

        // Слабая ссылка: поздний таймер освобождённых ворот ничего не откроет
        let gate: Weak<Self> = Arc::downgrade(self);
        let timer = self.scheduler.schedule(
            self.delay,
            Box::new(move || {
                if let Some(gate) = gate.upgrade() {
                    gate.reopen(window);
                }
            }),
        );
        state.timer = Some(timer);
        true
    }

    /// Отменить ожидающий таймер; после этого ворота больше ничего не пропускают
    pub fn release(&self) {
        let mut state = self.state.lock();
        state.released = true;
        state.open = false;
        if let Some(timer) = state.timer.take() {
            self.scheduler.cancel(timer);
        }
    }

    #[cfg(test)]
    pub(crate) fn is_open(&self) -> bool {
        let state = self.state.lock();
        !state.released && (state.open || state.window_elapsed(self.scheduler.now(), self.delay))
    }

    /// Время последнего пропущенного события по часам планировщика
    pub fn last_emitted(&self) -> Option<Duration> {
        self.state.lock().last_emitted
    }

    fn reopen(&self, window: u64) {
        let mut state = self.state.lock();
        if state.released || state.window != window {
            return;
        }
        state.open = true;
        state.timer = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::scheduler::{ManualScheduler, TokioScheduler};

    fn gate_with_clock(delay_ms: u64) -> (Arc<ThrottleGate>, Arc<ManualScheduler>) {
        let clock = Arc::new(ManualScheduler::new());
        let gate = ThrottleGate::new(Duration::from_millis(delay_ms), clock.clone());
        (gate, clock)
    }

    #[test]
    fn suppresses_inside_window_and_reopens_after() {
        let (gate, clock) = gate_with_clock(500);

        assert!(gate.try_pass());
        assert!(!gate.try_pass());

        clock.advance_ms(250);
        assert!(!gate.try_pass());

        clock.advance_ms(250);
        assert!(gate.is_open());
        assert!(gate.try_pass());
        assert_eq!(gate.last_emitted(), Some(Duration::from_millis(500)));
    }

    #[test]
    fn suppressed_events_do_not_extend_the_window() {
        let (gate, clock) = gate_with_clock(100);

        assert!(gate.try_pass());
        for _ in 0..9 {
            clock.advance_ms(10);
            assert!(!gate.try_pass());
        }
        clock.advance_ms(10);

        assert!(gate.try_pass());
    }

    #[test]
    fn release_cancels_pending_timer() {
        let (gate, clock) = gate_with_clock(100);

        assert!(gate.try_pass());
        assert_eq!(clock.pending_count(), 1);

        gate.release();
        assert_eq!(clock.pending_count(), 0);

        clock.advance_ms(1_000);
        assert!(!gate.is_open());
        assert!(!gate.try_pass());
    }

    #[test]
    fn dropped_gate_timer_is_harmless() {
        let (gate, clock) = gate_with_clock(100);

        assert!(gate.try_pass());
        drop(gate);

        assert_eq!(clock.advance_ms(100), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn passes_at_window_edge_before_reopen_timer_runs() {
        let scheduler = Arc::new(TokioScheduler::new());
        let gate = ThrottleGate::new(Duration::from_millis(500), scheduler.clone());

        assert!(gate.try_pass());
        tokio::time::advance(Duration::from_millis(250)).await;
        assert!(!gate.try_pass());

        // Часы дошли до границы, таймер открытия ещё не опрошен
        tokio::time::advance(Duration::from_millis(250)).await;
        assert!(gate.try_pass());
        assert_eq!(gate.last_emitted(), Some(Duration::from_millis(500)));
        assert_eq!(scheduler.pending_count(), 1);
    }

    #[test]
    fn next_window_starts_at_the_second_emission() {
        let (gate, clock) = gate_with_clock(100);

        assert!(gate.try_pass());
        clock.advance_ms(100);
        assert!(gate.try_pass());

        clock.advance_ms(50);
        assert!(!gate.is_open());
        assert!(!gate.try_pass());
    }
}
