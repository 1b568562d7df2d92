use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::{handlers, ApiState};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route(
            "/slots",
            post(handlers::slots::create_slot).get(handlers::slots::list_slots),
        )
        .route(
            "/slots/:slot_number",
            get(handlers::slots::get_slot)
                .put(handlers::slots::update_slot)
                .delete(handlers::slots::delete_slot),
        )
}
