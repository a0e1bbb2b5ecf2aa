use crate::api::{AppState, saved};
use crate::api::middleware::AdminSession;
use crate::domain::catalog::{User, UserFilter, UserUpdate};
use crate::error::Result;
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::Response,
};

pub async fn list_users(
    State(state): State<AppState>,
    _session: AdminSession,
    Query(filter): Query<UserFilter>,
) -> Result<Json<Vec<User>>> {
    Ok(Json(state.user_service.list(&filter).await?))
}

pub async fn update_user(
    State(state): State<AppState>,
    _session: AdminSession,
    Path(id): Path<String>,
    Json(update): Json<UserUpdate>,
) -> Result<Response> {
    let user = state.user_service.update(&id, &update).await?;
    Ok(saved(StatusCode::OK, user))
}

pub async fn delete_user(
    State(state): State<AppState>,
    _session: AdminSession,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    state.user_service.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
