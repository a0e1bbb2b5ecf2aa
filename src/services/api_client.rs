use crate::config::ApiConfig;
use crate::error::{AppError, Result};
use crate::services::auth_store::AuthStore;
use bytes::Bytes;
use opentelemetry::{global, metrics::Counter};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method, Response, StatusCode};
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

/// Endpoints that issue credentials. They are never sent a bearer token and a
/// 401 from them is returned as-is.
pub const AUTH_ENDPOINTS: [&str; 3] = ["/auth/login", "/auth/refresh-token", "/auth/register"];

const REFRESH_PATH: &str = "/auth/refresh-token";

#[derive(Clone, Debug)]
struct Metrics {
    refresh_total: Counter<u64>,
    refresh_failed_total: Counter<u64>,
    session_cleared_total: Counter<u64>,
}

impl Metrics {
    fn new() -> Self {
        let meter = global::meter("storefront-admin");
        Self {
            refresh_total: meter
                .u64_counter("admin_refresh_total")
                .with_description("Total number of successful access token refreshes")
                .build(),
            refresh_failed_total: meter
                .u64_counter("admin_refresh_failed_total")
                .with_description("Total number of failed access token refreshes")
                .build(),
            session_cleared_total: meter
                .u64_counter("admin_session_cleared_total")
                .with_description("Total number of sessions cleared after a failed refresh")
                .build(),
        }
    }
}

#[derive(Debug, Clone)]
pub enum FormValue {
    Text(String),
    File { file_name: String, content_type: Option<String>, data: Bytes },
}

/// Multipart body kept as plain data so it can be rebuilt for a retry.
#[derive(Debug, Clone, Default)]
pub struct MultipartForm {
    parts: Vec<(String, FormValue)>,
}

impl MultipartForm {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parts.push((name.into(), FormValue::Text(value.into())));
        self
    }

    #[must_use]
    pub fn file(
        mut self,
        name: impl Into<String>,
        file_name: impl Into<String>,
        content_type: Option<String>,
        data: Bytes,
    ) -> Self {
        self.parts.push((name.into(), FormValue::File { file_name: file_name.into(), content_type, data }));
        self
    }

    #[must_use]
    pub fn parts(&self) -> &[(String, FormValue)] {
        &self.parts
    }

    fn to_form(&self) -> Result<Form> {
        let mut form = Form::new();
        for (name, value) in &self.parts {
            form = match value {
                FormValue::Text(text) => form.text(name.clone(), text.clone()),
                FormValue::File { file_name, content_type, data } => {
                    let mut part = Part::bytes(data.to_vec()).file_name(file_name.clone());
                    if let Some(content_type) = content_type {
                        part = part.mime_str(content_type)?;
                    }
                    form.part(name.clone(), part)
                }
            };
        }
        Ok(form)
    }
}

#[derive(Debug, Clone)]
pub enum RequestBody {
    Json(Value),
    Bytes { content_type: String, data: Bytes },
    Multipart(MultipartForm),
}

/// Replayable description of one request: method, headers and optional body.
///
/// Credentials are not part of it; they are attached per attempt from the
/// current session.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    method: Method,
    headers: HeaderMap,
    body: Option<RequestBody>,
}

impl Default for ApiRequest {
    fn default() -> Self {
        Self::new(Method::GET)
    }
}

impl ApiRequest {
    #[must_use]
    pub fn new(method: Method) -> Self {
        Self { method, headers: HeaderMap::new(), body: None }
    }

    #[must_use]
    pub fn get() -> Self {
        Self::new(Method::GET)
    }

    #[must_use]
    pub fn post() -> Self {
        Self::new(Method::POST)
    }

    #[must_use]
    pub fn put() -> Self {
        Self::new(Method::PUT)
    }

    #[must_use]
    pub fn delete() -> Self {
        Self::new(Method::DELETE)
    }

    #[must_use]
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    #[must_use]
    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(RequestBody::Json(body));
        self
    }

    #[must_use]
    pub fn bytes(mut self, content_type: impl Into<String>, data: Bytes) -> Self {
        self.body = Some(RequestBody::Bytes { content_type: content_type.into(), data });
        self
    }

    #[must_use]
    pub fn multipart(mut self, form: MultipartForm) -> Self {
        self.body = Some(RequestBody::Multipart(form));
        self
    }

    #[must_use]
    pub const fn method(&self) -> &Method {
        &self.method
    }
}

#[derive(Deserialize)]
struct RefreshEnvelope {
    data: Option<RefreshData>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RefreshData {
    access_token: Option<String>,
}

/// HTTP client for the storefront API that applies the session's credentials
/// and recovers from an expired access token once per call.
#[derive(Clone, Debug)]
pub struct ApiClient {
    http: Client,
    base_url: Arc<str>,
    store: AuthStore,
    refresh_lock: Arc<Mutex<()>>,
    metrics: Metrics,
}

impl ApiClient {
    /// # Errors
    /// Returns an error if the underlying HTTP client cannot be constructed.
    pub fn new(config: &ApiConfig, store: AuthStore) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(secs) = config.connect_timeout_secs {
            builder = builder.connect_timeout(Duration::from_secs(secs));
        }
        Ok(Self::with_client(builder.build()?, &config.base_url, store))
    }

    #[must_use]
    pub fn with_client(http: Client, base_url: &str, store: AuthStore) -> Self {
        Self {
            http,
            base_url: Arc::from(base_url.trim_end_matches('/')),
            store,
            refresh_lock: Arc::new(Mutex::new(())),
            metrics: Metrics::new(),
        }
    }

    #[must_use]
    pub const fn store(&self) -> &AuthStore {
        &self.store
    }

    /// Absolute URLs pass through; anything else is appended to the base URL.
    #[must_use]
    pub fn resolve_url(&self, path: &str) -> String {
        if path.starts_with("http") {
            path.to_string()
        } else if path.starts_with('/') {
            format!("{}{path}", self.base_url)
        } else {
            format!("{}/{path}", self.base_url)
        }
    }

    /// Performs one request with the session's bearer token.
    ///
    /// A 401 on a credentialed path triggers a single refresh-and-retry. If the
    /// refresh fails the session is cleared and the original 401 is returned.
    /// Non-2xx responses are returned, not turned into errors.
    ///
    /// # Errors
    /// Returns `AppError::Transport` if the request (or its retry) never produced a response.
    #[tracing::instrument(skip(self, request), fields(method = %request.method, path = %path, status = tracing::field::Empty))]
    pub async fn fetch(&self, path: &str, request: ApiRequest) -> Result<Response> {
        let url = self.resolve_url(path);
        let auth_endpoint = is_auth_endpoint(path);
        let token = if auth_endpoint { None } else { self.store.access_token() };

        let response = self.send(&url, &request, token.as_deref()).await?;
        tracing::Span::current().record("status", response.status().as_u16());

        if response.status() != StatusCode::UNAUTHORIZED || auth_endpoint {
            return Ok(response);
        }
        if self.store.state().is_none_or(|session| session.refresh_token.is_empty()) {
            tracing::debug!("Unauthorized with no refresh token");
            return Ok(response);
        }

        let Some(fresh_token) = self.refresh_access_token(token.as_deref()).await else {
            return Ok(response);
        };

        tracing::debug!(attempt = 2, "Retrying with refreshed access token");
        let retried = self.send(&url, &request, Some(&fresh_token)).await?;
        tracing::Span::current().record("status", retried.status().as_u16());
        Ok(retried)
    }

    /// Returns a usable access token, refreshing at most once across all
    /// callers that saw the same stale token.
    async fn refresh_access_token(&self, stale: Option<&str>) -> Option<String> {
        let _guard = self.refresh_lock.lock().await;

        // Signed out while waiting: a concurrent refresh failed.
        let current = self.store.state()?;
        if stale != Some(current.access_token.as_str()) {
            tracing::debug!("Access token already refreshed by a concurrent request");
            return Some(current.access_token);
        }

        match self.request_new_access_token(&current.refresh_token).await {
            Ok(access_token) => {
                if let Err(e) = self.store.replace_access_token(access_token.clone()).await {
                    tracing::warn!(error = %e, "Failed to persist refreshed session");
                }
                self.metrics.refresh_total.add(1, &[]);
                tracing::info!("Access token refreshed");
                Some(access_token)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Token refresh failed, clearing session");
                self.metrics.refresh_failed_total.add(1, &[]);
                if let Err(e) = self.store.clear_auth().await {
                    tracing::warn!(error = %e, "Failed to remove persisted session");
                }
                self.metrics.session_cleared_total.add(1, &[]);
                None
            }
        }
    }

    async fn request_new_access_token(&self, refresh_token: &str) -> Result<String> {
        let response = self
            .http
            .post(self.resolve_url(REFRESH_PATH))
            .json(&json!({ "refreshToken": refresh_token }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::api(status, "Token refresh rejected"));
        }

        let envelope: RefreshEnvelope = response.json().await?;
        envelope
            .data
            .and_then(|data| data.access_token)
            .filter(|token| !token.is_empty())
            .ok_or_else(|| AppError::InvalidResponse("Refresh response carried no access token".into()))
    }

    async fn send(&self, url: &str, request: &ApiRequest, token: Option<&str>) -> Result<Response> {
        let mut headers = request.headers.clone();
        if let Some(token) = token {
            headers.insert(AUTHORIZATION, HeaderValue::from_str(&format!("Bearer {token}"))?);
        }

        let builder = self.http.request(request.method.clone(), url).headers(headers);
        let builder = match &request.body {
            None => builder,
            Some(RequestBody::Json(value)) => builder.json(value),
            Some(RequestBody::Bytes { content_type, data }) => {
                builder.header(CONTENT_TYPE, content_type.as_str()).body(data.clone())
            }
            Some(RequestBody::Multipart(form)) => builder.multipart(form.to_form()?),
        };

        Ok(builder.send().await?)
    }
}

/// Whether `path` targets one of [`AUTH_ENDPOINTS`], ignoring any query string.
#[must_use]
pub fn is_auth_endpoint(path: &str) -> bool {
    let path = path.split(['?', '#']).next().unwrap_or(path);
    AUTH_ENDPOINTS.iter().any(|endpoint| path.ends_with(endpoint))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemorySessionStorage;

    fn client(base_url: &str) -> ApiClient {
        let store = AuthStore::new(Arc::new(MemorySessionStorage::new()));
        ApiClient::with_client(Client::new(), base_url, store)
    }

    #[test]
    fn test_resolve_url() {
        let api = client("http://localhost:3000/api");
        assert_eq!(api.resolve_url("/users"), "http://localhost:3000/api/users");
        assert_eq!(api.resolve_url("users?limit=100"), "http://localhost:3000/api/users?limit=100");
        assert_eq!(api.resolve_url("https://cdn.example/x"), "https://cdn.example/x");
    }

    #[test]
    fn test_resolve_url_ignores_trailing_slash_on_base() {
        let api = client("http://localhost:3000/api/");
        assert_eq!(api.resolve_url("/brands"), "http://localhost:3000/api/brands");
    }

    #[test]
    fn test_auth_endpoint_detection() {
        assert!(is_auth_endpoint("/auth/login"));
        assert!(is_auth_endpoint("/auth/refresh-token?x=1"));
        assert!(is_auth_endpoint("http://localhost:3000/api/auth/register"));
        assert!(!is_auth_endpoint("/users"));
        assert!(!is_auth_endpoint("/auth/login/history"));
    }

    #[test]
    fn test_multipart_form_rebuilds() {
        let form = MultipartForm::new()
            .text("name", "Tee")
            .file("image", "a.png", Some("image/png".into()), Bytes::from_static(b"png"));

        assert_eq!(form.parts().len(), 2);
        assert!(form.to_form().is_ok());
        assert!(form.to_form().is_ok());
    }

    #[test]
    fn test_multipart_rejects_bad_mime() {
        let form = MultipartForm::new().file("image", "a.png", Some("not a mime".into()), Bytes::new());
        assert!(form.to_form().is_err());
    }
}
