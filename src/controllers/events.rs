use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::error::Error;
use crate::middleware::ValidatedJson;
use crate::models::CreateEventRequest;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/events", get(list_events).post(create_event))
        .route("/events/{id}/availability", get(availability))
        .route("/events/{id}/purchase", post(purchase))
}

// POST /events
async fn create_event(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<CreateEventRequest>,
) -> Result<impl IntoResponse, Error> {
    let event = state.store.insert_event(req);
    tracing::info!("event {} created ({})", event.id, event.name);

    Ok(Json(json!({
        "success": true,
        "message": "Event created successfully",
        "data": event,
    })))
}

// GET /events?page&limit
#[derive(Debug, Deserialize)]
struct ListEventsQuery {
    page: Option<u32>,
    limit: Option<u32>,
}

async fn list_events(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListEventsQuery>,
) -> Result<impl IntoResponse, Error> {
    let page = params.page.unwrap_or(1).max(1);
    let limit = params
        .limit
        .unwrap_or(state.config.inventory.default_page_size)
        .clamp(1, 100);

    let (events, total_events) = state.store.list_events(page, limit);
    let total_pages = total_events.div_ceil(u64::from(limit));

    Ok(Json(json!({
        "success": true,
        "data": events,
        "pagination": {
            "totalEvents": total_events,
            "totalPages": total_pages,
            "currentPage": page,
            "limit": limit,
        },
    })))
}

// GET /events/{id}/availability
async fn availability(
    State(state): State<Arc<AppState>>,
    Path(event_id): Path<Uuid>,
) -> Result<impl IntoResponse, Error> {
    let sections = state.store.availability(event_id)?;
    Ok(Json(sections))
}

// POST /events/{id}/purchase
#[derive(Debug, Deserialize, Validate)]
struct PurchaseRequest {
    section_id: Uuid,
    row_id: Uuid,
    #[validate(range(min = 1, message = "Quantity must be a positive integer"))]
    quantity: u32,
}

#[derive(Debug, Serialize)]
struct PurchaseResponse {
    section_id: Uuid,
    row_id: Uuid,
    quantity: u32,
    #[serde(rename = "groupDiscount")]
    group_discount: bool,
}

async fn purchase(
    State(state): State<Arc<AppState>>,
    Path(event_id): Path<Uuid>,
    ValidatedJson(req): ValidatedJson<PurchaseRequest>,
) -> Result<impl IntoResponse, Error> {
    let receipt = state
        .purchases
        .purchase(event_id, req.section_id, req.row_id, req.quantity)?;

    Ok(Json(json!({
        "success": true,
        "message": "Seats booked successfully",
        "data": PurchaseResponse {
            section_id: receipt.section_id,
            row_id: receipt.row_id,
            quantity: receipt.quantity,
            group_discount: receipt.group_discount,
        },
    })))
}
