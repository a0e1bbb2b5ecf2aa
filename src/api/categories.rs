use crate::api::{AppState, saved};
use crate::api::middleware::AdminSession;
use crate::domain::catalog::{Category, CategoryDraft, CategoryFilter};
use crate::error::Result;
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::Response,
};

pub async fn list_categories(
    State(state): State<AppState>,
    _session: AdminSession,
    Query(filter): Query<CategoryFilter>,
) -> Result<Json<Vec<Category>>> {
    Ok(Json(state.category_service.list(&filter).await?))
}

pub async fn create_category(
    State(state): State<AppState>,
    _session: AdminSession,
    Json(draft): Json<CategoryDraft>,
) -> Result<Response> {
    let category = state.category_service.save(None, &draft).await?;
    Ok(saved(StatusCode::CREATED, category))
}

pub async fn update_category(
    State(state): State<AppState>,
    _session: AdminSession,
    Path(id): Path<String>,
    Json(draft): Json<CategoryDraft>,
) -> Result<Response> {
    let category = state.category_service.save(Some(&id), &draft).await?;
    Ok(saved(StatusCode::OK, category))
}

pub async fn delete_category(
    State(state): State<AppState>,
    _session: AdminSession,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    state.category_service.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
