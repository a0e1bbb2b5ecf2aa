use crate::api::{AppState, saved};
use crate::api::middleware::AdminSession;
use crate::domain::catalog::{Brand, BrandDraft};
use crate::error::Result;
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::Response,
};
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    pub search: Option<String>,
}

pub async fn list_brands(
    State(state): State<AppState>,
    _session: AdminSession,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<Brand>>> {
    Ok(Json(state.brand_service.list(query.search.as_deref()).await?))
}

pub async fn create_brand(
    State(state): State<AppState>,
    _session: AdminSession,
    Json(draft): Json<BrandDraft>,
) -> Result<Response> {
    let brand = state.brand_service.save(None, &draft).await?;
    Ok(saved(StatusCode::CREATED, brand))
}

pub async fn update_brand(
    State(state): State<AppState>,
    _session: AdminSession,
    Path(id): Path<String>,
    Json(draft): Json<BrandDraft>,
) -> Result<Response> {
    let brand = state.brand_service.save(Some(&id), &draft).await?;
    Ok(saved(StatusCode::OK, brand))
}

pub async fn delete_brand(State(state): State<AppState>, _session: AdminSession, Path(id): Path<String>) -> Result<StatusCode> {
    state.brand_service.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
