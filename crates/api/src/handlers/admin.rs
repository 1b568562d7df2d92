use axum::{extract::State, Json};
use parkslot_core::{
    admin,
    models::user::{DashboardStats, User},
};
use std::sync::Arc;

use crate::{
    middleware::{auth::AdminUser, error_handling::AppError},
    ApiState,
};

#[axum::debug_handler(state = Arc<ApiState>)]
pub async fn all_users(
    AdminUser(identity): AdminUser,
    State(state): State<Arc<ApiState>>,
) -> Result<Json<Vec<User>>, AppError> {
    let users = admin::list_users(state.store.as_ref(), &identity).await?;
    Ok(Json(users))
}

#[axum::debug_handler(state = Arc<ApiState>)]
pub async fn dashboard_stats(
    AdminUser(identity): AdminUser,
    State(state): State<Arc<ApiState>>,
) -> Result<Json<DashboardStats>, AppError> {
    let stats = admin::dashboard_stats(state.store.as_ref(), &identity).await?;
    Ok(Json(stats))
}
