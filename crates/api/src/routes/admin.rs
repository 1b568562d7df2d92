use axum::{routing::get, Router};
use std::sync::Arc;

use crate::{handlers, ApiState};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route("/admin/all-users", get(handlers::admin::all_users))
        .route("/admin/stats", get(handlers::admin::dashboard_stats))
}
