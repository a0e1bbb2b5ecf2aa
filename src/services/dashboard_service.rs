use crate::domain::catalog::DashboardStats;
use crate::error::{AppError, Result};
use crate::services::api_client::{ApiClient, ApiRequest};
use serde_json::Value;

/// One dashboard tile: where its number comes from and how to dig it out.
struct StatSource {
    label: &'static str,
    endpoint: &'static str,
    extract: fn(&Value) -> u64,
}

const USERS: StatSource = StatSource { label: "Total Users", endpoint: "/users/stats", extract: customer_count };
const PRODUCTS: StatSource = StatSource {
    label: "Total Products",
    endpoint: "/products",
    extract: |body| number_at(body, "/data/pagination/totalProducts"),
};
const CATEGORIES: StatSource = StatSource {
    label: "Total Categories",
    endpoint: "/categories/stats",
    extract: |body| number_at(body, "/data/totalCategories"),
};
const BRANDS: StatSource = StatSource {
    label: "Total Brands",
    endpoint: "/brands/stats",
    extract: |body| number_at(body, "/data/totalBrands"),
};

#[derive(Clone, Debug)]
pub struct DashboardService {
    api: ApiClient,
}

impl DashboardService {
    #[must_use]
    pub const fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Fetches all four counters concurrently. Missing numbers count as 0.
    ///
    /// # Errors
    /// Fails as a whole with "Failed to fetch <label>" if any endpoint
    /// answers non-2xx.
    #[tracing::instrument(skip(self), err(level = "warn"))]
    pub async fn stats(&self) -> Result<DashboardStats> {
        let (users, products, categories, brands) = futures::try_join!(
            self.fetch_stat(&USERS),
            self.fetch_stat(&PRODUCTS),
            self.fetch_stat(&CATEGORIES),
            self.fetch_stat(&BRANDS),
        )?;

        Ok(DashboardStats { users, products, categories, brands })
    }

    async fn fetch_stat(&self, source: &StatSource) -> Result<u64> {
        let response = self.api.fetch(source.endpoint, ApiRequest::get()).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(AppError::api(status, format!("Failed to fetch {}", source.label)));
        }

        let body: Value = response.json().await?;
        Ok((source.extract)(&body))
    }
}

fn number_at(body: &Value, pointer: &str) -> u64 {
    body.pointer(pointer).and_then(Value::as_u64).unwrap_or(0)
}

/// Count of accounts with the plain `user` role.
fn customer_count(body: &Value) -> u64 {
    body.pointer("/data/usersByRole")
        .and_then(Value::as_array)
        .and_then(|roles| roles.iter().find(|entry| entry.get("_id").and_then(Value::as_str) == Some("user")))
        .and_then(|entry| entry.get("count"))
        .and_then(Value::as_u64)
        .unwrap_or(0)
}
