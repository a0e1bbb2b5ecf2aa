use crate::api::AppState;
use crate::api::middleware::{ACCESS_TOKEN_COOKIE, LOGIN_PATH};
use crate::error::Result;
use axum::{
    Json,
    extract::State,
    response::{IntoResponse, Redirect},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};
use time::Duration;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginView {
    pub hydrated: bool,
    pub signed_in: bool,
}

/// `GET /login`: whether someone is already signed in. Public, so it never
/// says who.
pub async fn login_page(State(state): State<AppState>) -> Json<LoginView> {
    let hydrated = state.store.has_hydrated();
    let signed_in = hydrated && state.store.state().is_some();
    Json(LoginView { hydrated, signed_in })
}

/// `POST /login`: signs in upstream, mirrors the access token into a cookie
/// and sends the browser home.
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse> {
    let session = state.auth_service.login(&payload.email, &payload.password).await?;

    let cookie = Cookie::build((ACCESS_TOKEN_COOKIE, session.access_token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(Duration::seconds(state.config.auth.cookie_max_age_secs));

    Ok((jar.add(cookie), Redirect::to("/")))
}

/// `POST /logout`: forgets the session and expires the cookie.
///
/// Only the edge guard gates this route, so a cookie outliving its session
/// can still be cleared.
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> impl IntoResponse {
    if let Err(e) = state.auth_service.logout().await {
        tracing::warn!(error = %e, "Persisted session could not be removed");
    }

    let cookie = Cookie::build((ACCESS_TOKEN_COOKIE, "")).path("/").max_age(Duration::ZERO);
    (jar.add(cookie), Redirect::to(LOGIN_PATH))
}
