use crate::domain::catalog::{User, UserFilter, UserUpdate};
use crate::error::Result;
use crate::services::api_client::{ApiClient, ApiRequest};
use crate::services::envelope::{expect_success, read_data_or_default, read_saved};
use crate::services::{LIST_LIMIT, with_query};

#[derive(Clone, Debug)]
pub struct UserService {
    api: ApiClient,
}

impl UserService {
    #[must_use]
    pub const fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// # Errors
    /// Returns the upstream failure, or `Transport` if the API is unreachable.
    #[tracing::instrument(skip(self), err(level = "warn"))]
    pub async fn list(&self, filter: &UserFilter) -> Result<Vec<User>> {
        let is_active = filter.is_active.map(|active| active.to_string());
        let path = with_query(
            "/users",
            &[
                ("search", filter.search.as_deref()),
                ("role", filter.role.as_deref()),
                ("isActive", is_active.as_deref()),
                ("limit", Some(LIST_LIMIT)),
                ("page", Some("1")),
            ],
        );

        let response = self.api.fetch(&path, ApiRequest::get()).await?;
        read_data_or_default(response, "Failed to load users").await
    }

    /// # Errors
    /// Returns the upstream failure, or `Transport` if the API is unreachable.
    #[tracing::instrument(skip(self), err(level = "warn"))]
    pub async fn update(&self, id: &str, update: &UserUpdate) -> Result<Option<User>> {
        let request = ApiRequest::put().json(serde_json::to_value(update)?);
        let response = self.api.fetch(&format!("/users/{}", urlencoding::encode(id)), request).await?;
        read_saved(response, "Failed to update user").await
    }

    /// # Errors
    /// Returns the upstream failure, or `Transport` if the API is unreachable.
    #[tracing::instrument(skip(self), err(level = "warn"))]
    pub async fn delete(&self, id: &str) -> Result<()> {
        let response = self.api.fetch(&format!("/users/{}", urlencoding::encode(id)), ApiRequest::delete()).await?;
        expect_success(response, "Failed to delete user").await
    }
}
