use crate::debug_if_enabled;
use crate::events::{EventNames, InterruptArgs, ListenerEvent, ListenerOptions, SourceKind};
use crate::services::emitter::InterruptEmitter;
use crate::services::scheduler::{default_scheduler, Scheduler};
use crate::services::target::{EventHandler, TargetObject};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use super::options::{InterruptOptions, OptionsArg};
use super::r#trait::InterruptSource;
use super::throttle::ThrottleGate;

/// Предикат отбрасывания: `true` - событие не считается прерыванием
pub type EventFilter = Arc<dyn Fn(&ListenerEvent) -> bool + Send + Sync>;

/// Состояние одного цикла attach/detach
struct Attachment {
    target: Arc<dyn TargetObject>,
    handler: EventHandler,
    active: Arc<AtomicBool>,
    gate: Option<Arc<ThrottleGate>>,
}

/// Источник прерываний, слушающий именованные события на произвольной цели
pub struct EventTargetInterruptSource {
    target: Option<Arc<dyn TargetObject>>,
    event_names: EventNames,
    options: InterruptOptions,
    kind: SourceKind,
    scheduler: Arc<dyn Scheduler>,
    filter: Option<EventFilter>,
    emitter: Arc<InterruptEmitter>,
    attachment: Mutex<Option<Attachment>>,
}

impl EventTargetInterruptSource {
    pub fn new(
        target: Option<Arc<dyn TargetObject>>,
        event_names: &str,
        options: impl Into<OptionsArg>,
    ) -> Self {
        let options: OptionsArg = options.into();
        Self::from_parts(
            target,
            EventNames::parse(event_names),
            options.resolve(),
            SourceKind::EventTarget,
        )
    }

    pub(crate) fn from_parts(
        target: Option<Arc<dyn TargetObject>>,
        event_names: EventNames,
        options: InterruptOptions,
        kind: SourceKind,
    ) -> Self {
        debug!(
            "Создан источник {} для событий [{}] ({})",
            kind, event_names, options
        );
        Self {
            target,
            event_names,
            options,
            kind,
            scheduler: default_scheduler(),
            filter: None,
            emitter: Arc::new(InterruptEmitter::new()),
            attachment: Mutex::new(None),
        }
    }

    pub fn with_scheduler(mut self, scheduler: Arc<dyn Scheduler>) -> Self {
        self.scheduler = scheduler;
        self
    }

    /// Отбрасывать события, для которых предикат вернул `true`
    pub fn with_filter<F>(mut self, filter: F) -> Self
    where
        F: Fn(&ListenerEvent) -> bool + Send + Sync + 'static,
    {
        self.filter = Some(Arc::new(filter));
        self
    }

    pub fn event_names(&self) -> &EventNames {
        &self.event_names
    }

    pub fn kind(&self) -> SourceKind {
        self.kind
    }

    fn build_handler(&self, active: &Arc<AtomicBool>, gate: &Option<Arc<ThrottleGate>>) -> EventHandler {
        let active = Arc::clone(active);
        let gate = gate.clone();
        let filter = self.filter.clone();
        let emitter = Arc::clone(&self.emitter);
        let kind = self.kind;

        Arc::new(move |event: &ListenerEvent| {
            // Событие могло попасть в снимок рассылки до detach
            if !active.load(Ordering::Acquire) {
                return;
            }
            if let Some(filter) = &filter {
                if filter(event) {
                    debug_if_enabled!("Событие '{}' отброшено фильтром", event.name);
                    return;
                }
            }
            if let Some(gate) = &gate {
                if !gate.try_pass() {
                    return;
                }
            }
            debug_if_enabled!("Прерывание от {}: {}", kind, event.name);
            emitter.emit(&InterruptArgs::from_event(kind, event.clone()));
        })
    }
}

impl InterruptSource for EventTargetInterruptSource {
    fn attach(&self) {
        if self.options.ssr {
            debug!("Режим SSR - attach для {} пропущен", self.kind);
            return;
        }

        let Some(target) = self.target.as_ref() else {
            debug!("Цель не задана - attach для {} пропущен", self.kind);
            return;
        };
        let Some(event_target) = target.event_target() else {
            debug!("Цель не умеет регистрировать слушателей - attach для {} пропущен", self.kind);
            return;
        };

        let mut attachment = self.attachment.lock();
        if attachment.is_some() {
            debug_if_enabled!("Источник {} уже подключён", self.kind);
            return;
        }

        // Новые ворота на каждый цикл: троттлинг начинается с чистого листа
        let gate = (self.options.throttle_delay > 0).then(|| {
            ThrottleGate::new(
                Duration::from_millis(self.options.throttle_delay),
                Arc::clone(&self.scheduler),
            )
        });
        let active = Arc::new(AtomicBool::new(true));
        let handler = self.build_handler(&active, &gate);

        let listener_options = ListenerOptions::passive(self.options.passive);
        for name in self.event_names.iter() {
            event_target.add_event_listener(name, &handler, listener_options);
        }

        *attachment = Some(Attachment {
            target: Arc::clone(target),
            handler,
            active,
            gate,
        });

        info!(
            "Источник {} подключён: [{}] ({})",
            self.kind, self.event_names, self.options
        );
    }

    fn detach(&self) {
        let Some(attachment) = self.attachment.lock().take() else {
            return;
        };

        attachment.active.store(false, Ordering::Release);
        if let Some(gate) = &attachment.gate {
            gate.release();
        }

        if let Some(event_target) = attachment.target.event_target() {
            let listener_options = ListenerOptions::passive(self.options.passive);
            for name in self.event_names.iter() {
                event_target.remove_event_listener(name, &attachment.handler, listener_options);
            }
        }

        info!("Источник {} отключён", self.kind);
    }

    fn on_interrupt(&self) -> &InterruptEmitter {
        &self.emitter
    }

    fn is_attached(&self) -> bool {
        self.attachment.lock().is_some()
    }

    fn options(&self) -> &InterruptOptions {
        &self.options
    }
}

impl Drop for EventTargetInterruptSource {
    fn drop(&mut self) {
        self.detach();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::interrupt_source::options::PartialOptions;
    use crate::services::scheduler::ManualScheduler;
    use crate::services::target::{EventDispatcher, PlainObject};
    use std::sync::atomic::AtomicUsize;

    struct Fixture {
        target: Arc<EventDispatcher>,
        clock: Arc<ManualScheduler>,
        count: Arc<AtomicUsize>,
        source: EventTargetInterruptSource,
    }

    impl Fixture {
        fn new(event_names: &str, options: impl Into<OptionsArg>) -> Self {
            let target = Arc::new(EventDispatcher::new());
            let clock = Arc::new(ManualScheduler::new());
            let source = EventTargetInterruptSource::new(Some(target.clone()), event_names, options)
                .with_scheduler(clock.clone());
            let count = counter(&source);
            Self {
                target,
                clock,
                count,
                source,
            }
        }

        fn fire(&self, name: &str) {
            self.target.dispatch_named(name);
        }

        fn emitted(&self) -> usize {
            self.count.load(Ordering::SeqCst)
        }
    }

    fn counter(source: &EventTargetInterruptSource) -> Arc<AtomicUsize> {
        let count = Arc::new(AtomicUsize::new(0));
        let inner = Arc::clone(&count);
        source.on_interrupt().subscribe(move |_| {
            inner.fetch_add(1, Ordering::SeqCst);
        });
        count
    }

    #[test]
    fn emits_once_per_dispatch_without_throttle() {
        let fx = Fixture::new("click", 0);
        fx.source.attach();

        fx.fire("click");
        assert_eq!(fx.emitted(), 1);
        fx.fire("click");
        fx.fire("click");
        assert_eq!(fx.emitted(), 3);
    }

    #[test]
    fn unmatched_event_is_ignored() {
        let fx = Fixture::new("click", 0);
        fx.source.attach();

        fx.fire("keydown");

        assert_eq!(fx.emitted(), 0);
        assert_eq!(fx.target.listener_count("keydown"), 0);
    }

    #[test]
    fn detach_stops_emission_across_cycles() {
        let fx = Fixture::new("click", 0);

        for _ in 0..3 {
            fx.source.attach();
            fx.source.detach();
        }
        fx.fire("click");

        assert_eq!(fx.emitted(), 0);
        assert!(!fx.source.is_attached());
        assert_eq!(fx.target.total_listener_count(), 0);
    }

    #[test]
    fn detach_is_safe_without_attach() {
        let fx = Fixture::new("click", 0);

        fx.source.detach();
        fx.source.detach();

        assert!(!fx.source.is_attached());
    }

    #[test]
    fn reattach_does_not_double_register() {
        let fx = Fixture::new("click touch", 0);

        fx.source.attach();
        fx.source.attach();

        assert_eq!(fx.target.listener_count("click"), 1);
        assert_eq!(fx.target.listener_count("touch"), 1);
        fx.fire("click");
        assert_eq!(fx.emitted(), 1);
    }

    #[test]
    fn ssr_mode_never_emits() {
        let fx = Fixture::new("click", PartialOptions::new().with_ssr(true).with_throttle_delay(0));
        fx.source.attach();

        fx.fire("click");

        assert_eq!(fx.emitted(), 0);
        assert!(!fx.source.is_attached());
        assert_eq!(fx.target.total_listener_count(), 0);
    }

    #[test]
    fn missing_target_never_emits() {
        let source = EventTargetInterruptSource::new(None, "click", 0);
        let count = counter(&source);

        source.attach();

        assert!(!source.is_attached());
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn target_without_listener_capability_is_a_noop() {
        let source = EventTargetInterruptSource::new(Some(Arc::new(PlainObject)), "click", 0);

        source.attach();
        source.detach();

        assert!(!source.is_attached());
    }

    #[test]
    fn throttle_law_holds() {
        let fx = Fixture::new("click", 500);
        fx.source.attach();

        fx.fire("click");
        assert_eq!(fx.emitted(), 1);

        fx.clock.advance_ms(1);
        fx.fire("click");
        assert_eq!(fx.emitted(), 1);

        fx.clock.advance_ms(249);
        fx.fire("click");
        assert_eq!(fx.emitted(), 1);

        fx.clock.advance_ms(250);
        fx.fire("click");
        assert_eq!(fx.emitted(), 2);

        fx.clock.advance_ms(250);
        fx.fire("click");
        assert_eq!(fx.emitted(), 2);

        fx.clock.advance_ms(250);
        fx.fire("click");
        assert_eq!(fx.emitted(), 3);
    }

    #[test]
    fn throttle_gate_is_shared_across_event_names() {
        let fx = Fixture::new("click touch", 500);
        fx.source.attach();

        fx.fire("click");
        fx.fire("touch");
        assert_eq!(fx.emitted(), 1);

        fx.clock.advance_ms(500);
        fx.fire("touch");
        assert_eq!(fx.emitted(), 2);
    }

    #[test]
    fn multi_token_names_each_trigger_without_throttle() {
        let fx = Fixture::new("click touch", 0);
        fx.source.attach();

        fx.fire("touch");
        fx.fire("click");

        assert_eq!(fx.emitted(), 2);
    }

    #[test]
    fn detach_cancels_throttle_timer_and_reattach_starts_fresh() {
        let fx = Fixture::new("click", 500);

        fx.source.attach();
        fx.fire("click");
        assert_eq!(fx.clock.pending_count(), 1);

        fx.source.detach();
        assert_eq!(fx.clock.pending_count(), 0);

        fx.source.attach();
        fx.fire("click");
        assert_eq!(fx.emitted(), 2);
    }

    #[test]
    fn passive_hint_reaches_the_target() {
        let fx = Fixture::new("scroll", PartialOptions::new().with_passive(true));
        fx.source.attach();

        assert_eq!(
            fx.target.registered_options("scroll"),
            vec![ListenerOptions { passive: true }]
        );
    }

    #[test]
    fn independent_sources_on_one_target_do_not_share_gates() {
        let fx = Fixture::new("click", 500);
        let other = EventTargetInterruptSource::new(Some(fx.target.clone()), "click", 500)
            .with_scheduler(fx.clock.clone());
        let other_count = counter(&other);

        fx.source.attach();
        other.attach();
        fx.fire("click");
        fx.fire("click");

        assert_eq!(fx.emitted(), 1);
        assert_eq!(other_count.load(Ordering::SeqCst), 1);

        other.detach();
        fx.clock.advance_ms(500);
        fx.fire("click");
        assert_eq!(fx.emitted(), 2);
        assert_eq!(other_count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn filter_drops_events_before_the_gate() {
        let fx = Fixture::new("mousemove", 0);
        let source = EventTargetInterruptSource::new(Some(fx.target.clone()), "mousemove keydown", 500)
            .with_scheduler(fx.clock.clone())
            .with_filter(|event| &*event.name == "mousemove");
        let count = counter(&source);

        source.attach();
        fx.fire("mousemove");
        fx.fire("keydown");

        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn subscriber_may_detach_during_emission() {
        let target = Arc::new(EventDispatcher::new());
        let source = Arc::new(EventTargetInterruptSource::new(Some(target.clone()), "click", 0));

        let weak = Arc::downgrade(&source);
        source.on_interrupt().subscribe(move |_| {
            if let Some(source) = weak.upgrade() {
                source.detach();
            }
        });
        let count = counter(&source);

        source.attach();
        target.dispatch_named("click");
        target.dispatch_named("click");

        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert!(!source.is_attached());
    }

    #[test]
    fn interrupt_carries_the_event() {
        let fx = Fixture::new("keydown", 0);
        let mut rx = fx.source.on_interrupt().subscribe_channel();
        fx.source.attach();

        fx.fire("keydown");

        let args = rx.try_recv().expect("interrupt");
        assert_eq!(args.source, SourceKind::EventTarget);
        assert_eq!(args.event_name(), "keydown");
    }

    #[test]
    fn drop_removes_listeners() {
        let fx = Fixture::new("click", 0);
        fx.source.attach();
        let target = fx.target.clone();

        drop(fx);

        assert_eq!(target.total_listener_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn throttle_reopens_on_tokio_timers() {
        let target = Arc::new(EventDispatcher::new());
        let source = EventTargetInterruptSource::new(Some(target.clone()), "click", 500)
            .with_scheduler(Arc::new(crate::services::scheduler::TokioScheduler::new()));
        let count = counter(&source);
        source.attach();

        target.dispatch_named("click");
        tokio::time::sleep(Duration::from_millis(250)).await;
        target.dispatch_named("click");
        assert_eq!(count.load(Ordering::SeqCst), 1);

        tokio::time::sleep(Duration::from_millis(251)).await;
        target.dispatch_named("click");
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn throttle_window_edge_on_tokio_timers() {
        let target = Arc::new(EventDispatcher::new());
        let source = EventTargetInterruptSource::new(Some(target.clone()), "click", 500)
            .with_scheduler(Arc::new(crate::services::scheduler::TokioScheduler::new()));
        let count = counter(&source);
        source.attach();

        target.dispatch_named("click");
        tokio::time::sleep(Duration::from_millis(250)).await;
        target.dispatch_named("click");
        tokio::time::sleep(Duration::from_millis(250)).await;
        target.dispatch_named("click");

        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn resolved_options_are_exposed() {
        let fx = Fixture::new("click", 250);

        assert_eq!(
            *fx.source.options(),
            InterruptOptions {
                throttle_delay: 250,
                passive: false,
                ssr: false
            }
        );
    }
}
