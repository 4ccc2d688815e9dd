use anyhow::anyhow;
use chrono::{NaiveDateTime, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, TryLockError};
use uuid::Uuid;

use crate::error::Error;
use crate::models::{
    self, CreateEventRequest, RowAvailability, SectionAvailability,
};

/// In-process seat inventory: events, sections, rows and their live
/// booked-seat counters.
///
/// The catalog lock only guards event creation and lookup. Once a caller
/// holds an `Arc<EventRecord>`, purchases and availability reads run
/// against the per-row counters without touching the catalog, so
/// contention on one row never blocks work on another.
#[derive(Clone)]
pub struct InventoryStore {
    catalog: Arc<RwLock<Catalog>>,
}

#[derive(Default)]
struct Catalog {
    // Creation order; listings walk it in reverse (newest first).
    ordered: Vec<Arc<EventRecord>>,
    by_id: HashMap<Uuid, Arc<EventRecord>>,
}

pub struct EventRecord {
    pub id: Uuid,
    pub name: String,
    pub date: NaiveDateTime,
    pub created_at: NaiveDateTime,
    pub sections: Vec<SectionRecord>,
}

pub struct SectionRecord {
    pub id: Uuid,
    pub name: String,
    pub rows: Vec<RowRecord>,
}

/// Smallest bookable unit. `total_seats` is fixed at creation;
/// `booked_seats` moves only through [`RowRecord::try_book`].
pub struct RowRecord {
    pub id: Uuid,
    pub name: String,
    total_seats: u32,
    booked_seats: AtomicU32,
    commit_lock: Mutex<()>,
}

impl RowRecord {
    fn new(name: String, total_seats: u32) -> Self {
        RowRecord {
            id: Uuid::new_v4(),
            name,
            total_seats,
            booked_seats: AtomicU32::new(0),
            commit_lock: Mutex::new(()),
        }
    }

    pub fn total_seats(&self) -> u32 {
        self.total_seats
    }

    pub fn booked_seats(&self) -> u32 {
        self.booked_seats.load(Ordering::Acquire)
    }

    pub fn available_seats(&self) -> u32 {
        self.total_seats - self.booked_seats()
    }

    pub fn sold_out(&self) -> bool {
        self.booked_seats() == self.total_seats
    }

    /// Atomically book `quantity` seats.
    ///
    /// The capacity check and the counter update happen inside the row's
    /// exclusive commit scope, so concurrent attempts on the same row are
    /// totally ordered and can neither lose updates nor over-sell.
    /// `on_commit` runs inside that scope, which is what lets the caller
    /// enqueue its change notification in commit order; it must only
    /// enqueue, never block.
    ///
    /// Fails with `CapacityExceeded` if the row cannot hold `quantity`
    /// more seats, leaving the counter untouched, and with `Contention`
    /// if the scope cannot be won within `max_attempts` tries.
    pub fn try_book<F>(&self, quantity: u32, max_attempts: u32, on_commit: F) -> Result<u32, Error>
    where
        F: FnOnce(u32),
    {
        let _scope = self.enter_commit_scope(max_attempts)?;

        let booked = self.booked_seats.load(Ordering::Acquire);
        let next = booked
            .checked_add(quantity)
            .filter(|&n| n <= self.total_seats)
            .ok_or(Error::CapacityExceeded)?;

        self.booked_seats.store(next, Ordering::Release);
        on_commit(next);
        Ok(next)
    }

    // Bounded wait for the row's commit scope. Each failed attempt yields
    // the timeslice so the current holder can finish its (tiny) critical
    // section; exhaustion surfaces as a retryable `Contention`.
    fn enter_commit_scope(&self, max_attempts: u32) -> Result<MutexGuard<'_, ()>, Error> {
        for _ in 0..max_attempts {
            match self.commit_lock.try_lock() {
                Ok(guard) => return Ok(guard),
                Err(TryLockError::WouldBlock) => std::thread::yield_now(),
                Err(TryLockError::Poisoned(_)) => {
                    return Err(Error::Internal(anyhow!("row commit scope poisoned")))
                }
            }
        }
        Err(Error::Contention)
    }

    fn snapshot(&self) -> models::Row {
        models::Row {
            id: self.id,
            name: self.name.clone(),
            total_seats: self.total_seats,
            booked_seats: self.booked_seats(),
        }
    }
}

impl EventRecord {
    /// Resolve a (section, row) pair, requiring the row to actually live
    /// under the stated section. A row id from a sibling section is a miss.
    pub fn resolve(&self, section_id: Uuid, row_id: Uuid) -> Option<(&SectionRecord, &RowRecord)> {
        let section = self.sections.iter().find(|s| s.id == section_id)?;
        let row = section.rows.iter().find(|r| r.id == row_id)?;
        Some((section, row))
    }

    pub fn snapshot(&self) -> models::Event {
        models::Event {
            id: self.id,
            name: self.name.clone(),
            date: self.date,
            created_at: self.created_at,
            sections: self
                .sections
                .iter()
                .map(|s| models::Section {
                    id: s.id,
                    name: s.name.clone(),
                    rows: s.rows.iter().map(RowRecord::snapshot).collect(),
                })
                .collect(),
        }
    }

    pub fn availability(&self) -> Vec<SectionAvailability> {
        self.sections
            .iter()
            .map(|s| SectionAvailability {
                id: s.id,
                name: s.name.clone(),
                rows: s
                    .rows
                    .iter()
                    .map(|r| RowAvailability {
                        id: r.id,
                        name: r.name.clone(),
                        available_seats: r.available_seats(),
                    })
                    .collect(),
            })
            .collect()
    }
}

impl InventoryStore {
    pub fn new() -> Self {
        InventoryStore {
            catalog: Arc::new(RwLock::new(Catalog::default())),
        }
    }

    /// Insert a new event with server-assigned section/row identifiers.
    /// Structure is immutable afterwards; only booked counters move.
    pub fn insert_event(&self, req: CreateEventRequest) -> models::Event {
        let record = Arc::new(EventRecord {
            id: Uuid::new_v4(),
            name: req.name,
            date: req.date,
            created_at: Utc::now().naive_utc(),
            sections: req
                .sections
                .into_iter()
                .map(|s| SectionRecord {
                    id: Uuid::new_v4(),
                    name: s.name,
                    rows: s
                        .rows
                        .into_iter()
                        .map(|r| RowRecord::new(r.name, r.total_seats))
                        .collect(),
                })
                .collect(),
        });

        let snapshot = record.snapshot();
        let mut catalog = self.write_catalog();
        catalog.by_id.insert(record.id, record.clone());
        catalog.ordered.push(record);
        snapshot
    }

    pub fn get_event(&self, id: Uuid) -> Option<Arc<EventRecord>> {
        self.read_catalog().by_id.get(&id).cloned()
    }

    /// Newest-created-first listing with pure pagination.
    pub fn list_events(&self, page: u32, limit: u32) -> (Vec<models::Event>, u64) {
        let catalog = self.read_catalog();
        let total = catalog.ordered.len() as u64;
        let skip = (page.max(1) - 1) as usize * limit as usize;

        let events = catalog
            .ordered
            .iter()
            .rev()
            .skip(skip)
            .take(limit as usize)
            .map(|e| e.snapshot())
            .collect();

        (events, total)
    }

    pub fn availability(&self, event_id: Uuid) -> Result<Vec<SectionAvailability>, Error> {
        let event = self
            .get_event(event_id)
            .ok_or_else(|| Error::NotFound("Event not found".to_string()))?;
        Ok(event.availability())
    }

    fn read_catalog(&self) -> std::sync::RwLockReadGuard<'_, Catalog> {
        self.catalog.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_catalog(&self) -> std::sync::RwLockWriteGuard<'_, Catalog> {
        self.catalog.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for InventoryStore {
    fn default() -> Self {
        Self::new()
    }
}
