pub mod api_client;
pub mod auth_service;
pub mod auth_store;
pub mod brand_service;
pub mod category_service;
pub mod dashboard_service;
pub(crate) mod envelope;
pub mod image_service;
pub mod order_service;
pub mod product_service;
pub mod user_service;

/// Page size the console asks for on every listing.
pub(crate) const LIST_LIMIT: &str = "100";

/// Appends URL-encoded query parameters, skipping empty values.
pub(crate) fn with_query(path: &str, params: &[(&str, Option<&str>)]) -> String {
    let query: Vec<String> = params
        .iter()
        .filter_map(|(key, value)| value.filter(|v| !v.is_empty()).map(|v| format!("{key}={}", urlencoding::encode(v))))
        .collect();

    if query.is_empty() { path.to_string() } else { format!("{path}?{}", query.join("&")) }
}
