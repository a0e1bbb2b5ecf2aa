use crate::domain::catalog::{Category, CategoryDraft, CategoryFilter};
use crate::error::{AppError, Result};
use crate::services::api_client::{ApiClient, ApiRequest};
use crate::services::envelope::{expect_success, read_data_or_default, read_saved};
use crate::services::{LIST_LIMIT, with_query};

#[derive(Clone, Debug)]
pub struct CategoryService {
    api: ApiClient,
}

impl CategoryService {
    #[must_use]
    pub const fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// # Errors
    /// Returns the upstream failure, or `Transport` if the API is unreachable.
    #[tracing::instrument(skip(self), err(level = "warn"))]
    pub async fn list(&self, filter: &CategoryFilter) -> Result<Vec<Category>> {
        let path = with_query(
            "/categories",
            &[
                ("search", filter.search.as_deref()),
                ("brand", filter.brand.as_deref()),
                ("limit", Some(LIST_LIMIT)),
            ],
        );
        let response = self.api.fetch(&path, ApiRequest::get()).await?;
        read_data_or_default(response, "Failed to load categories").await
    }

    /// Creates the category, or updates it when `id` is given.
    ///
    /// # Errors
    /// `Validation` before any request if the draft is incomplete; otherwise
    /// the upstream failure.
    #[tracing::instrument(skip(self, draft), err(level = "warn"))]
    pub async fn save(&self, id: Option<&str>, draft: &CategoryDraft) -> Result<Option<Category>> {
        draft.validate().map_err(|msg| AppError::Validation(msg.to_string()))?;

        let (path, request) = match id {
            Some(id) => (format!("/categories/{}", urlencoding::encode(id)), ApiRequest::put()),
            None => ("/categories".to_string(), ApiRequest::post()),
        };
        let response = self.api.fetch(&path, request.json(serde_json::to_value(draft)?)).await?;
        read_saved(response, "Failed to save category").await
    }

    /// # Errors
    /// Returns the upstream failure, or `Transport` if the API is unreachable.
    #[tracing::instrument(skip(self), err(level = "warn"))]
    pub async fn delete(&self, id: &str) -> Result<()> {
        let path = format!("/categories/{}", urlencoding::encode(id));
        let response = self.api.fetch(&path, ApiRequest::delete()).await?;
        expect_success(response, "Failed to delete category").await
    }
}
