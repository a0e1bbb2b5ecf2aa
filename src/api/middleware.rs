use crate::api::AppState;
use crate::domain::authorization::{Decision, SessionCredential, VerifiedCookie, authorize};
use crate::domain::session::AuthSession;
use axum::{
    Json,
    extract::{FromRequestParts, Request, State},
    http::{HeaderValue, StatusCode, request::Parts},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use serde_json::json;
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

/// Cookie the access token is mirrored into for the edge guard.
pub const ACCESS_TOKEN_COOKIE: &str = "accessToken";

pub const LOGIN_PATH: &str = "/login";

const PUBLIC_PATHS: [&str; 1] = [LOGIN_PATH];

/// Prefixes the edge guard never looks at.
const UNGUARDED_PREFIXES: [&str; 4] = ["/api", "/static", "/favicon.ico", "/livez"];

/// Whether the edge guard lets `path` through without a credential.
#[must_use]
pub fn is_public_path(path: &str) -> bool {
    PUBLIC_PATHS.contains(&path)
        || UNGUARDED_PREFIXES.iter().any(|prefix| {
            path.strip_prefix(prefix).is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
        })
}

/// Edge guard: runs before any handler and checks the mirrored cookie.
///
/// The signature and expiry are verified here; the client guard behind it
/// trusts the session it holds.
pub async fn edge_guard(State(state): State<AppState>, jar: CookieJar, request: Request, next: Next) -> Response {
    if is_public_path(request.uri().path()) {
        return next.run(request).await;
    }

    let token = jar.get(ACCESS_TOKEN_COOKIE).map(Cookie::value);
    match authorize(&VerifiedCookie { token, verifier: &state.verifier }) {
        Decision::Allow => next.run(request).await,
        Decision::RedirectToLogin => {
            tracing::debug!(path = %request.uri().path(), "Edge guard redirecting to login");
            Redirect::temporary(LOGIN_PATH).into_response()
        }
    }
}

/// Client guard: the hydrated admin session, required by every protected handler.
///
/// Answers `503 {"status":"loading"}` until the store has hydrated, so no
/// decision is made on a session that has not been read yet.
#[derive(Debug, Clone)]
pub struct AdminSession(pub AuthSession);

impl FromRequestParts<AppState> for AdminSession {
    type Rejection = Response;

    async fn from_request_parts(_parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        if !state.store.has_hydrated() {
            return Err((StatusCode::SERVICE_UNAVAILABLE, Json(json!({ "status": "loading" }))).into_response());
        }

        let session = state.store.state();
        match authorize(&SessionCredential(session.as_ref())) {
            Decision::Allow => session.map(Self).ok_or_else(|| Redirect::temporary(LOGIN_PATH).into_response()),
            Decision::RedirectToLogin => Err(Redirect::temporary(LOGIN_PATH).into_response()),
        }
    }
}

/// Generates a UUID v7 request id when the caller did not send one.
#[derive(Clone, Copy, Debug, Default)]
pub struct MakeRequestUuid;

impl MakeRequestId for MakeRequestUuid {
    fn make_request_id<B>(&mut self, _request: &axum::http::Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::now_v7().to_string()).ok().map(RequestId::new)
    }
}
