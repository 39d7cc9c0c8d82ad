use crate::events::InterruptArgs;
use parking_lot::RwLock;
use smallvec::SmallVec;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Подписчик на прерывания
pub type InterruptCallback = Arc<dyn Fn(&InterruptArgs) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

#[derive(Clone)]
enum Subscriber {
    Callback(InterruptCallback),
    Channel(mpsc::UnboundedSender<InterruptArgs>),
}

/// Канал onInterrupt: список подписчиков с синхронной рассылкой.
///
/// Рассылка идёт по снимку списка в порядке подписки, поэтому подписчик
/// может отписаться (или отписать других) прямо из колбэка.
#[derive(Default)]
pub struct InterruptEmitter {
    next_id: AtomicU64,
    subscribers: RwLock<SmallVec<[(SubscriptionId, Subscriber); 2]>>,
}

impl InterruptEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&InterruptArgs) + Send + Sync + 'static,
    {
        self.push(Subscriber::Callback(Arc::new(callback)))
    }

    /// Подписка для асинхронных потребителей
    pub fn subscribe_channel(&self) -> mpsc::UnboundedReceiver<InterruptArgs> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.push(Subscriber::Channel(tx));
        rx
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscribers = self.subscribers.write();
        let before = subscribers.len();
        subscribers.retain(|(sid, _)| *sid != id);
        subscribers.len() != before
    }

    pub fn emit(&self, args: &InterruptArgs) {
        let snapshot: SmallVec<[(SubscriptionId, Subscriber); 2]> = self.subscribers.read().clone();
        let mut closed: SmallVec<[SubscriptionId; 2]> = SmallVec::new();

        for (id, subscriber) in &snapshot {
            match subscriber {
                Subscriber::Callback(callback) => callback(args),
                Subscriber::Channel(tx) => {
                    if tx.send(args.clone()).is_err() {
                        closed.push(*id);
                    }
                }
            }
        }

        // Получатель канала закрыт - подписка больше не нужна
        for id in closed {
            self.unsubscribe(id);
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.read().len()
    }

    fn push(&self, subscriber: Subscriber) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.subscribers.write().push((id, subscriber));
        id
    }
}

impl fmt::Debug for InterruptEmitter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InterruptEmitter")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}
