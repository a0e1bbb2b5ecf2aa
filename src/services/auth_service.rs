use crate::domain::session::AuthSession;
use crate::domain::token::AccessClaims;
use crate::error::{AppError, Result};
use crate::services::api_client::{ApiClient, ApiRequest};
use crate::services::auth_store::AuthStore;
use opentelemetry::{global, metrics::Counter};
use serde::Deserialize;
use serde_json::json;

#[derive(Clone, Debug)]
struct Metrics {
    login_total: Counter<u64>,
    login_rejected_total: Counter<u64>,
    logout_total: Counter<u64>,
}

impl Metrics {
    fn new() -> Self {
        let meter = global::meter("storefront-admin");
        Self {
            login_total: meter
                .u64_counter("admin_login_total")
                .with_description("Total number of successful admin logins")
                .build(),
            login_rejected_total: meter
                .u64_counter("admin_login_rejected_total")
                .with_description("Total number of logins rejected because the account is not an admin")
                .build(),
            logout_total: meter
                .u64_counter("admin_logout_total")
                .with_description("Total number of logouts")
                .build(),
        }
    }
}

#[derive(Deserialize)]
struct LoginEnvelope {
    message: Option<String>,
    data: Option<LoginData>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoginData {
    access_token: Option<String>,
    refresh_token: Option<String>,
}

#[derive(Clone, Debug)]
pub struct AuthService {
    api: ApiClient,
    metrics: Metrics,
}

impl AuthService {
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        Self { api, metrics: Metrics::new() }
    }

    fn store(&self) -> &AuthStore {
        self.api.store()
    }

    /// Signs in and stores the session. Only admins are let in; anyone else
    /// leaves the store untouched.
    ///
    /// # Errors
    /// `LoginFailed` when the API rejects the credentials, `InvalidResponse`
    /// when the tokens are missing or unreadable, `NotAdmin` for other roles.
    #[tracing::instrument(skip(self, password), fields(user_id = tracing::field::Empty), err(level = "warn"))]
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthSession> {
        // Hydration would otherwise overwrite the new session with the stored one.
        self.store().wait_until_hydrated().await;

        let response = self
            .api
            .fetch("/auth/login", ApiRequest::post().json(json!({ "email": email, "password": password })))
            .await?;

        let status = response.status();
        let envelope: Option<LoginEnvelope> = response.json().await.ok();

        if !status.is_success() {
            let message = envelope.and_then(|e| e.message).unwrap_or_else(|| "Login failed".to_string());
            return Err(AppError::LoginFailed(message));
        }

        let (access_token, refresh_token) = match envelope.and_then(|e| e.data) {
            Some(LoginData { access_token: Some(access), refresh_token: Some(refresh) })
                if !access.is_empty() && !refresh.is_empty() =>
            {
                (access, refresh)
            }
            _ => return Err(AppError::InvalidResponse("Invalid response from server".into())),
        };

        let user = AccessClaims::decode_unverified(&access_token)?.to_user();
        tracing::Span::current().record("user_id", tracing::field::display(&user.id));

        if !user.is_admin() {
            self.metrics.login_rejected_total.add(1, &[]);
            return Err(AppError::NotAdmin);
        }

        if let Err(e) = self.store().set_auth(access_token, refresh_token, user).await {
            tracing::warn!(error = %e, "Session stored in memory only");
        }

        self.metrics.login_total.add(1, &[]);
        tracing::info!("Admin signed in");
        self.store().state().ok_or(AppError::Internal)
    }

    /// # Errors
    /// Returns an error if the persisted session cannot be removed.
    #[tracing::instrument(skip(self), err)]
    pub async fn logout(&self) -> Result<()> {
        self.store().wait_until_hydrated().await;
        self.store().clear_auth().await?;
        self.metrics.logout_total.add(1, &[]);
        tracing::info!("Signed out");
        Ok(())
    }
}
