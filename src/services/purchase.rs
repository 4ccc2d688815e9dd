use serde::Serialize;
use uuid::Uuid;

use crate::config::InventoryConfig;
use crate::error::Error;
use crate::hub::{NotificationHub, TicketUpdate};
use crate::store::InventoryStore;

/// Purchases of this many seats or more qualify for the group discount.
pub const GROUP_DISCOUNT_MIN_QUANTITY: u32 = 4;

/// Outcome of a committed purchase.
#[derive(Debug, Clone, Serialize)]
pub struct Receipt {
    pub section_id: Uuid,
    pub row_id: Uuid,
    pub quantity: u32,
    #[serde(rename = "bookedSeats")]
    pub booked_seats: u32,
    #[serde(rename = "totalSeats")]
    pub total_seats: u32,
    #[serde(rename = "groupDiscount")]
    pub group_discount: bool,
}

/// The seat-inventory concurrency controller.
///
/// Sole owner of the commit path for `booked_seats`: it resolves the
/// event/section/row triple, applies the conditional counter update
/// through the row's exclusive commit scope, and publishes the committed
/// delta to the hub. Everything else in the system only reads.
#[derive(Clone)]
pub struct PurchaseService {
    store: InventoryStore,
    hub: NotificationHub,
    max_commit_attempts: u32,
}

impl PurchaseService {
    pub fn new(store: InventoryStore, hub: NotificationHub, config: &InventoryConfig) -> Self {
        PurchaseService {
            store,
            hub,
            max_commit_attempts: config.max_commit_attempts,
        }
    }

    /// Book `quantity` seats in the given row.
    ///
    /// Exactly one `ticket-updated` delta is published per committed
    /// purchase, enqueued inside the row's commit scope so observers see
    /// same-row deltas in commit order. Failed attempts publish nothing
    /// and leave the counter untouched.
    ///
    /// The operation is not idempotent: retrying a *successful* purchase
    /// books again. Callers needing request dedup must layer their own
    /// token above this service.
    pub fn purchase(
        &self,
        event_id: Uuid,
        section_id: Uuid,
        row_id: Uuid,
        quantity: u32,
    ) -> Result<Receipt, Error> {
        if quantity == 0 {
            return Err(Error::InvalidArgument(
                "Quantity must be a positive integer".to_string(),
            ));
        }

        let event = self
            .store
            .get_event(event_id)
            .ok_or_else(|| Error::NotFound("Event not found".to_string()))?;

        let (section, row) = event
            .resolve(section_id, row_id)
            .ok_or_else(|| Error::NotFound("Invalid section or row".to_string()))?;

        let booked_seats = row.try_book(quantity, self.max_commit_attempts, |booked| {
            self.hub.publish(
                event_id,
                TicketUpdate {
                    event_id,
                    section_id: section.id,
                    row_id: row.id,
                    booked_seats: booked,
                    total_seats: row.total_seats(),
                },
            );
        })?;

        tracing::debug!(
            "booked {} seat(s) in row {} ({} / {} now taken)",
            quantity,
            row.id,
            booked_seats,
            row.total_seats()
        );

        Ok(Receipt {
            section_id: section.id,
            row_id: row.id,
            quantity,
            booked_seats,
            total_seats: row.total_seats(),
            group_discount: quantity >= GROUP_DISCOUNT_MIN_QUANTITY,
        })
    }
}
