use crate::api::AppState;
use crate::api::brands::SearchQuery;
use crate::api::middleware::AdminSession;
use crate::domain::catalog::{Order, OrderStatus};
use crate::error::Result;
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusUpdate {
    pub order_status: OrderStatus,
}

pub async fn list_orders(
    State(state): State<AppState>,
    _session: AdminSession,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<Order>>> {
    Ok(Json(state.order_service.list(query.search.as_deref()).await?))
}

pub async fn get_order(State(state): State<AppState>, _session: AdminSession, Path(id): Path<String>) -> Result<Json<Order>> {
    Ok(Json(state.order_service.get(&id).await?))
}

pub async fn update_order_status(
    State(state): State<AppState>,
    _session: AdminSession,
    Path(id): Path<String>,
    Json(update): Json<StatusUpdate>,
) -> Result<StatusCode> {
    state.order_service.update_status(&id, update.order_status).await?;
    Ok(StatusCode::NO_CONTENT)
}
