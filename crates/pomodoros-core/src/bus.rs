//! Typed in-process publish/subscribe for session events.
//!
//! Every observer has its own unbounded queue, so publishing never waits on
//! a slow reader and a lagging observer never costs another one an event.
//! Observers only see events published after they attach.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::mpsc;

use crate::events::Event;

pub type ObserverId = u64;

#[derive(Debug, Default)]
struct Registry {
    next_id: ObserverId,
    observers: HashMap<ObserverId, mpsc::UnboundedSender<Event>>,
}

#[derive(Debug, Clone, Default)]
pub struct ObserverBus {
    registry: Arc<Mutex<Registry>>,
}

impl ObserverBus {
    pub fn new() -> Self {
        Self::default()
    }

    fn registry(&self) -> MutexGuard<'_, Registry> {
        self.registry.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn attach(&self) -> Observer {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut registry = self.registry();
        registry.next_id += 1;
        let id = registry.next_id;
        registry.observers.insert(id, tx);
        tracing::debug!(observer = id, "observer attached");
        Observer { id, rx }
    }

    /// Remove an observer. Its queue is closed after any events already
    /// delivered. Returns false if it was not attached.
    pub fn detach(&self, id: ObserverId) -> bool {
        let removed = self.registry().observers.remove(&id).is_some();
        if removed {
            tracing::debug!(observer = id, "observer detached");
        }
        removed
    }

    /// Fire-and-forget delivery to every attached observer. Observers whose
    /// receiving side is gone are pruned.
    pub fn publish(&self, event: &Event) {
        self.registry()
            .observers
            .retain(|_, tx| tx.send(event.clone()).is_ok());
    }

    pub fn observer_count(&self) -> usize {
        let mut registry = self.registry();
        registry.observers.retain(|_, tx| !tx.is_closed());
        registry.observers.len()
    }
}

/// Receiving end of an attachment. Dropping it detaches.
#[derive(Debug)]
pub struct Observer {
    id: ObserverId,
    rx: mpsc::UnboundedReceiver<Event>,
}

impl Observer {
    pub fn id(&self) -> ObserverId {
        self.id
    }

    /// Next event, or `None` once detached and drained.
    pub async fn recv(&mut self) -> Option<Event> {
        self.rx.recv().await
    }

    /// Next already-delivered event, without waiting.
    pub fn try_recv(&mut self) -> Option<Event> {
        self.rx.try_recv().ok()
    }
}
