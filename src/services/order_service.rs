use crate::domain::catalog::{Order, OrderStatus};
use crate::error::{AppError, Result};
use crate::services::api_client::{ApiClient, ApiRequest};
use crate::services::envelope::{decode, decode_or_default, expect_success, read_body};
use crate::services::{LIST_LIMIT, with_query};
use serde_json::{Value, json};

#[derive(Clone, Debug)]
pub struct OrderService {
    api: ApiClient,
}

impl OrderService {
    #[must_use]
    pub const fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// # Errors
    /// Returns the upstream failure, or `Transport` if the API is unreachable.
    #[tracing::instrument(skip(self), err(level = "warn"))]
    pub async fn list(&self, search: Option<&str>) -> Result<Vec<Order>> {
        let path = with_query("/orders/admin/all", &[("search", search), ("limit", Some(LIST_LIMIT))]);
        let response = self.api.fetch(&path, ApiRequest::get()).await?;
        let body = read_body(response, "Failed to load orders").await?;
        decode_or_default(order_list(body), "Failed to load orders")
    }

    /// # Errors
    /// `Api` with status 404 when the upstream answers with no order.
    #[tracing::instrument(skip(self), err(level = "warn"))]
    pub async fn get(&self, id: &str) -> Result<Order> {
        let path = format!("/orders/admin/{}", urlencoding::encode(id));
        let response = self.api.fetch(&path, ApiRequest::get()).await?;
        let body = read_body(response, "Failed to fetch order").await?;

        match single_order(body) {
            Value::Null => Err(AppError::Api { status: 404, message: "Order not found".into() }),
            order => decode(order, "Failed to fetch order"),
        }
    }

    /// # Errors
    /// Returns the upstream failure, or `Transport` if the API is unreachable.
    #[tracing::instrument(skip(self), err(level = "warn"))]
    pub async fn update_status(&self, id: &str, status: OrderStatus) -> Result<()> {
        let path = format!("/orders/admin/{}", urlencoding::encode(id));
        let request = ApiRequest::put().json(json!({ "orderStatus": status }));
        let response = self.api.fetch(&path, request).await?;
        expect_success(response, "Failed to update status").await
    }
}

/// The listing comes back either bare or wrapped in `data`.
fn order_list(mut body: Value) -> Value {
    if body.is_array() { body } else { body.get_mut("data").map(Value::take).unwrap_or_default() }
}

fn single_order(mut body: Value) -> Value {
    if let Value::Array(items) = body {
        return items.into_iter().next().unwrap_or_default();
    }
    match body.get_mut("data").map(Value::take) {
        Some(data) if !data.is_null() => data,
        _ => body,
    }
}
