#![allow(dead_code, clippy::unwrap_used, clippy::missing_panics_doc, clippy::must_use_candidate, unreachable_pub)]

use clap::Parser;
use jsonwebtoken::{EncodingKey, Header, encode};
use reqwest::redirect::Policy;
use serde_json::{Value, json};
use std::path::PathBuf;
use std::sync::{Arc, Once};
use storefront_admin::AppBuilder;
use storefront_admin::api::{self, ServiceContainer};
use storefront_admin::config::Config;
use storefront_admin::domain::session::{AuthSession, SessionUser};
use storefront_admin::domain::token::{AccessClaims, TokenVerifier};
use storefront_admin::services::api_client::ApiClient;
use storefront_admin::services::auth_store::AuthStore;
use storefront_admin::storage::{FileSessionStorage, SessionStorage};
use tempfile::TempDir;
use wiremock::MockServer;

pub const JWT_SECRET: &str = "test_secret";

static INIT: Once = Once::new();

pub fn setup_tracing() {
    INIT.call_once(|| {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "warn".into())
            .add_directive("storefront_admin=debug".parse().unwrap())
            .add_directive("hyper=warn".parse().unwrap())
            .add_directive("reqwest=warn".parse().unwrap())
            .add_directive("wiremock=warn".parse().unwrap());

        tracing_subscriber::fmt().with_env_filter(filter).init();
    });
}

pub fn get_test_config(api_base_url: &str, session_file: &std::path::Path) -> Config {
    Config::try_parse_from([
        "storefront-admin",
        "--api-base-url",
        api_base_url,
        "--jwt-secret",
        JWT_SECRET,
        "--session-file",
        session_file.to_str().unwrap(),
        "--host",
        "127.0.0.1",
        "--port",
        "0",
    ])
    .unwrap()
}

/// Signs an access token the way the upstream API does, valid for an hour.
pub fn sign_token(user_id: &str, role: &str) -> String {
    let exp = time::OffsetDateTime::now_utc().unix_timestamp() + 3600;
    sign_claims(&AccessClaims {
        user_id: Some(user_id.into()),
        role: Some(role.into()),
        exp: Some(u64::try_from(exp).unwrap()),
        ..Default::default()
    })
}

pub fn sign_claims(claims: &AccessClaims) -> String {
    encode(&Header::default(), claims, &EncodingKey::from_secret(JWT_SECRET.as_bytes())).unwrap()
}

pub fn admin_session(access_token: &str, refresh_token: &str) -> AuthSession {
    AuthSession::new(access_token, refresh_token, SessionUser { id: "admin-1".into(), role: "admin".into(), email: None })
}

/// Upstream login envelope carrying the given tokens.
pub fn login_body(access_token: &str, refresh_token: &str) -> Value {
    json!({ "message": "Login successful", "data": { "accessToken": access_token, "refreshToken": refresh_token } })
}

pub struct TestApp {
    pub server_url: String,
    pub upstream: MockServer,
    pub config: Config,
    pub store: AuthStore,
    pub api: ApiClient,
    pub services: ServiceContainer,
    pub client: reqwest::Client,
    pub session_file: PathBuf,
    _session_dir: TempDir,
}

impl TestApp {
    /// Console with a hydrated, signed-out store.
    pub async fn spawn() -> Self {
        Self::spawn_inner(None, true).await
    }

    /// Console whose persisted session is `session`, already hydrated.
    pub async fn spawn_with_session(session: AuthSession) -> Self {
        Self::spawn_inner(Some(session), true).await
    }

    /// Console whose store has not been hydrated.
    pub async fn spawn_unhydrated(session: Option<AuthSession>) -> Self {
        Self::spawn_inner(session, false).await
    }

    async fn spawn_inner(session: Option<AuthSession>, hydrate: bool) -> Self {
        setup_tracing();

        let upstream = MockServer::start().await;
        let session_dir = tempfile::tempdir().unwrap();
        let session_file = session_dir.path().join("session.json");

        let storage = Arc::new(FileSessionStorage::new(&session_file));
        if let Some(session) = &session {
            storage.save(session).await.unwrap();
        }

        let config = get_test_config(&format!("{}/api", upstream.uri()), &session_file);
        let app = AppBuilder::new(config.clone()).with_storage(storage).build().unwrap();
        if hydrate {
            app.store.hydrate().await;
        }

        let router = api::app_router(config.clone(), app.store.clone(), TokenVerifier::new(JWT_SECRET), app.services.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        let client = reqwest::Client::builder().redirect(Policy::none()).build().unwrap();

        Self {
            server_url: format!("http://{addr}"),
            upstream,
            config,
            store: app.store,
            api: app.api,
            services: app.services,
            client,
            session_file,
            _session_dir: session_dir,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.server_url)
    }

    /// GET on the console carrying `token` as the mirrored cookie.
    pub async fn get_with_cookie(&self, path: &str, token: &str) -> reqwest::Response {
        self.client
            .get(self.url(path))
            .header(reqwest::header::COOKIE, format!("accessToken={token}"))
            .send()
            .await
            .unwrap()
    }

    /// Requests the upstream mock received for `path`.
    pub async fn upstream_requests(&self, path: &str) -> Vec<wiremock::Request> {
        self.upstream
            .received_requests()
            .await
            .unwrap_or_default()
            .into_iter()
            .filter(|request| request.url.path() == path)
            .collect()
    }
}
