#![allow(clippy::unwrap_used, clippy::panic, clippy::missing_panics_doc, unreachable_pub)]
use reqwest::StatusCode;
use reqwest::header::LOCATION;
use storefront_admin::domain::token::AccessClaims;

mod common;

fn assert_redirects_to_login(resp: &reqwest::Response) {
    assert_eq!(resp.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(resp.headers()[LOCATION], "/login");
}

#[tokio::test]
async fn test_missing_cookie_redirects_to_login() {
    let app = common::TestApp::spawn_with_session(common::admin_session("T1", "R1")).await;

    for page in ["/", "/dashboard", "/users", "/products", "/orders/o1", "/images"] {
        let resp = app.client.get(app.url(page)).send().await.unwrap();
        assert_redirects_to_login(&resp);
    }
}

#[tokio::test]
async fn test_cookie_signed_with_another_secret_is_rejected() {
    let app = common::TestApp::spawn_with_session(common::admin_session("T1", "R1")).await;
    let forged = jsonwebtoken::encode(
        &jsonwebtoken::Header::default(),
        &AccessClaims { user_id: Some("admin-1".into()), role: Some("admin".into()), ..Default::default() },
        &jsonwebtoken::EncodingKey::from_secret(b"not-the-secret"),
    )
    .unwrap();

    assert_redirects_to_login(&app.get_with_cookie("/dashboard", &forged).await);
    assert_redirects_to_login(&app.get_with_cookie("/dashboard", "not-a-jwt").await);
}

#[tokio::test]
async fn test_non_admin_cookie_is_rejected() {
    let app = common::TestApp::spawn_with_session(common::admin_session("T1", "R1")).await;
    let token = common::sign_token("cust-9", "user");

    assert_redirects_to_login(&app.get_with_cookie("/dashboard", &token).await);
}

#[tokio::test]
async fn test_expired_cookie_is_rejected() {
    let app = common::TestApp::spawn_with_session(common::admin_session("T1", "R1")).await;
    let exp = time::OffsetDateTime::now_utc().unix_timestamp() - 60;
    let token = common::sign_claims(&AccessClaims {
        user_id: Some("admin-1".into()),
        role: Some("admin".into()),
        exp: Some(u64::try_from(exp).unwrap()),
        ..Default::default()
    });

    assert_redirects_to_login(&app.get_with_cookie("/", &token).await);
}

#[tokio::test]
async fn test_public_paths_skip_the_edge_guard() {
    let app = common::TestApp::spawn().await;

    let resp = app.client.get(app.url("/login")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = app.client.get(app.url("/livez")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    // Outside the guarded set: no redirect, just no such page.
    let resp = app.client.get(app.url("/static/app.css")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_pages_wait_for_hydration() {
    let token = common::sign_token("admin-1", "admin");
    let app = common::TestApp::spawn_unhydrated(Some(common::admin_session(&token, "R1"))).await;

    let resp = app.get_with_cookie("/", &token).await;
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "loading");

    app.store.hydrate().await;

    let resp = app.get_with_cookie("/", &token).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_valid_cookie_without_session_redirects() {
    let app = common::TestApp::spawn().await;
    let token = common::sign_token("admin-1", "admin");

    assert_redirects_to_login(&app.get_with_cookie("/dashboard", &token).await);
}

#[tokio::test]
async fn test_non_admin_session_redirects_even_with_admin_cookie() {
    let token = common::sign_token("admin-1", "admin");
    let mut session = common::admin_session(&token, "R1");
    session.user.role = "user".into();
    let app = common::TestApp::spawn_with_session(session).await;

    assert_redirects_to_login(&app.get_with_cookie("/", &token).await);
}

#[tokio::test]
async fn test_home_lists_sections_for_admin() {
    let token = common::sign_token("admin-1", "admin");
    let app = common::TestApp::spawn_with_session(common::admin_session(&token, "R1")).await;

    let resp = app.get_with_cookie("/", &token).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.headers().contains_key("x-request-id"));
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["user"]["role"], "admin");
    assert_eq!(body["navigation"][0]["href"], "/dashboard");
}
