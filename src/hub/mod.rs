use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, PoisonError, RwLock};
use tokio::sync::mpsc;
use uuid::Uuid;

/// Committed inventory delta pushed to observers of an event.
///
/// Field casing matches the wire format of the `ticket-updated` push.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketUpdate {
    #[serde(rename = "eventId")]
    pub event_id: Uuid,
    pub section_id: Uuid,
    pub row_id: Uuid,
    #[serde(rename = "bookedSeats")]
    pub booked_seats: u32,
    #[serde(rename = "totalSeats")]
    pub total_seats: u32,
}

/// Fan-out of committed inventory changes to interested observers.
///
/// Constructed once at startup and handed to every consumer through
/// `AppState`; there is deliberately no global instance to reach for.
/// Each observer owns one unbounded channel, so `publish` is pure
/// enqueue and never blocks the committing caller, and deltas for the
/// same observer arrive in the order they were enqueued.
#[derive(Clone, Default)]
pub struct NotificationHub {
    observers: Arc<RwLock<HashMap<Uuid, Observer>>>,
}

struct Observer {
    events: HashSet<Uuid>,
    tx: mpsc::UnboundedSender<TicketUpdate>,
}

impl NotificationHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `observer_id`'s interest in `event_id`. Idempotent:
    /// joining the same event twice has the effect of once, and an
    /// observer may hold interest in several events at a time.
    pub fn subscribe(
        &self,
        observer_id: Uuid,
        event_id: Uuid,
        tx: &mpsc::UnboundedSender<TicketUpdate>,
    ) {
        let mut observers = self.write_observers();
        let observer = observers.entry(observer_id).or_insert_with(|| Observer {
            events: HashSet::new(),
            tx: tx.clone(),
        });
        if observer.events.insert(event_id) {
            tracing::debug!("observer {} joined event {}", observer_id, event_id);
        }
    }

    /// Drop all interest for `observer_id`. Safe to call if the observer
    /// was never registered or is already gone.
    pub fn unsubscribe(&self, observer_id: Uuid) {
        if self.write_observers().remove(&observer_id).is_some() {
            tracing::debug!("observer {} unsubscribed", observer_id);
        }
    }

    /// Deliver `update` to every observer currently interested in
    /// `event_id`. Observers whose channel has closed are pruned.
    pub fn publish(&self, event_id: Uuid, update: TicketUpdate) {
        let dead: Vec<Uuid> = {
            let observers = self.read_observers();
            observers
                .iter()
                .filter(|(_, o)| o.events.contains(&event_id))
                .filter_map(|(id, o)| o.tx.send(update.clone()).is_err().then_some(*id))
                .collect()
        };

        if !dead.is_empty() {
            let mut observers = self.write_observers();
            for id in dead {
                observers.remove(&id);
            }
        }
    }

    pub fn observer_count(&self) -> usize {
        self.read_observers().len()
    }

    fn read_observers(&self) -> std::sync::RwLockReadGuard<'_, HashMap<Uuid, Observer>> {
        self.observers.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_observers(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<Uuid, Observer>> {
        self.observers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
