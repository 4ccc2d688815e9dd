pub mod events;
pub mod ws;

use axum::Router;
use std::sync::Arc;

pub fn routes() -> Router<Arc<crate::AppState>> {
    Router::new().merge(events::routes()).merge(ws::routes())
}
