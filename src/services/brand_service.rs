use crate::domain::catalog::{Brand, BrandDraft};
use crate::error::Result;
use crate::services::api_client::{ApiClient, ApiRequest};
use crate::services::envelope::{decode_or_default, expect_success, read_body, read_saved};
use crate::services::{LIST_LIMIT, with_query};
use serde_json::Value;

#[derive(Clone, Debug)]
pub struct BrandService {
    api: ApiClient,
}

impl BrandService {
    #[must_use]
    pub const fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Lists brands. The API answers with either a bare array or
    /// `{ brands: [...] }` under `data`; both are accepted.
    ///
    /// # Errors
    /// Returns the upstream failure, or `Transport` if the API is unreachable.
    #[tracing::instrument(skip(self), err(level = "warn"))]
    pub async fn list(&self, search: Option<&str>) -> Result<Vec<Brand>> {
        let path = with_query("/brands", &[("search", search), ("limit", Some(LIST_LIMIT))]);
        let response = self.api.fetch(&path, ApiRequest::get()).await?;
        let body = read_body(response, "Failed to load brands").await?;
        decode_or_default(brand_list(body), "Failed to load brands")
    }

    /// Creates the brand, or updates it when `id` is given.
    ///
    /// # Errors
    /// Returns the upstream failure, or `Transport` if the API is unreachable.
    #[tracing::instrument(skip(self, draft), err(level = "warn"))]
    pub async fn save(&self, id: Option<&str>, draft: &BrandDraft) -> Result<Option<Brand>> {
        let (path, request) = match id {
            Some(id) => (format!("/brands/{}", urlencoding::encode(id)), ApiRequest::put()),
            None => ("/brands".to_string(), ApiRequest::post()),
        };
        let response = self.api.fetch(&path, request.json(serde_json::to_value(draft)?)).await?;
        read_saved(response, "Failed to save brand").await
    }

    /// # Errors
    /// Returns the upstream failure, or `Transport` if the API is unreachable.
    #[tracing::instrument(skip(self), err(level = "warn"))]
    pub async fn delete(&self, id: &str) -> Result<()> {
        let path = format!("/brands/{}", urlencoding::encode(id));
        let response = self.api.fetch(&path, ApiRequest::delete()).await?;
        expect_success(response, "Failed to delete brand").await
    }
}

fn brand_list(mut body: Value) -> Value {
    match body.get_mut("data").map(Value::take) {
        Some(list @ Value::Array(_)) => list,
        Some(mut wrapped) => wrapped.get_mut("brands").map(Value::take).unwrap_or_default(),
        None => Value::Null,
    }
}
