use axum::{
    routing::{get, patch, post},
    Router,
};
use std::sync::Arc;

use crate::{handlers, ApiState};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route(
            "/slot-requests/available",
            get(handlers::slot_requests::available_slots),
        )
        .route(
            "/slot-requests/request",
            post(handlers::slot_requests::request_slot),
        )
        .route(
            "/slot-requests/my-requests",
            get(handlers::slot_requests::my_requests),
        )
        .route(
            "/slot-requests/pending",
            get(handlers::slot_requests::pending_requests),
        )
        .route(
            "/slot-requests/all-requests",
            get(handlers::slot_requests::all_requests),
        )
        .route(
            "/slot-requests/:id/approve",
            patch(handlers::slot_requests::approve_request),
        )
        .route(
            "/slot-requests/:id/reject",
            patch(handlers::slot_requests::reject_request),
        )
        .route(
            "/slot-requests/:id/end",
            post(handlers::slot_requests::end_session),
        )
}
