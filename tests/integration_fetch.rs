#![allow(clippy::unwrap_used, clippy::panic, clippy::missing_panics_doc, clippy::items_after_statements, unreachable_pub)]
use reqwest::StatusCode;
use reqwest::header::{AUTHORIZATION, HeaderValue};
use serde_json::json;
use std::time::Duration;
use storefront_admin::services::api_client::ApiRequest;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, ResponseTemplate};

mod common;

async fn mount_users(app: &common::TestApp, token: &str, status: u16) {
    let template = if status == 200 {
        ResponseTemplate::new(200).set_body_json(json!({ "data": [] }))
    } else {
        ResponseTemplate::new(status).set_body_json(json!({ "message": "Token expired" }))
    };
    Mock::given(method("GET"))
        .and(path("/api/users"))
        .and(header("authorization", format!("Bearer {token}").as_str()))
        .respond_with(template)
        .mount(&app.upstream)
        .await;
}

async fn mount_refresh(app: &common::TestApp, template: ResponseTemplate, expected: u64) {
    Mock::given(method("POST"))
        .and(path("/api/auth/refresh-token"))
        .respond_with(template)
        .expect(expected)
        .mount(&app.upstream)
        .await;
}

#[tokio::test]
async fn test_exactly_one_authorization_header() {
    let app = common::TestApp::spawn_with_session(common::admin_session("T1", "R1")).await;
    mount_users(&app, "T1", 200).await;

    let request = ApiRequest::get().header(AUTHORIZATION, HeaderValue::from_static("Bearer caller-supplied"));
    let resp = app.api.fetch("/users", request).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let received = app.upstream_requests("/api/users").await;
    assert_eq!(received.len(), 1);
    let values: Vec<&str> = received[0].headers.get_all("authorization").iter().map(|v| v.to_str().unwrap()).collect();
    assert_eq!(values, vec!["Bearer T1"]);
}

#[tokio::test]
async fn test_auth_endpoints_are_never_credentialed() {
    let app = common::TestApp::spawn_with_session(common::admin_session("T1", "R1")).await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({ "message": "Invalid credentials" })))
        .mount(&app.upstream)
        .await;
    mount_refresh(&app, ResponseTemplate::new(200), 0).await;

    let request = ApiRequest::post().json(json!({ "email": "a@b.com", "password": "x" }));
    let resp = app.api.fetch("/auth/login", request).await.unwrap();

    // A 401 from an auth endpoint is handed back as-is.
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let received = app.upstream_requests("/api/auth/login").await;
    assert_eq!(received.len(), 1);
    assert!(received[0].headers.get("authorization").is_none());
    assert_eq!(app.store.state().unwrap().access_token, "T1");
}

#[tokio::test]
async fn test_unauthorized_refreshes_and_retries_once() {
    let app = common::TestApp::spawn_with_session(common::admin_session("T1", "R1")).await;
    mount_users(&app, "T1", 401).await;
    mount_users(&app, "T2", 200).await;
    Mock::given(method("POST"))
        .and(path("/api/auth/refresh-token"))
        .and(body_json(json!({ "refreshToken": "R1" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": { "accessToken": "T2" } })))
        .expect(1)
        .mount(&app.upstream)
        .await;

    let resp = app.api.fetch("/users", ApiRequest::get()).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    assert_eq!(app.upstream_requests("/api/users").await.len(), 2);
    let refresh = app.upstream_requests("/api/auth/refresh-token").await;
    assert!(refresh[0].headers.get("authorization").is_none());

    let session = app.store.state().unwrap();
    assert_eq!(session.access_token, "T2");
    assert_eq!(session.refresh_token, "R1");
    assert_eq!(session.user.id, "admin-1");

    // The refreshed token is persisted too.
    let persisted: serde_json::Value = serde_json::from_slice(&std::fs::read(&app.session_file).unwrap()).unwrap();
    assert_eq!(persisted["admin-auth"]["accessToken"], "T2");
    assert_eq!(persisted["admin-auth"]["refreshToken"], "R1");
}

#[tokio::test]
async fn test_failed_refresh_clears_session_and_returns_original_401() {
    let app = common::TestApp::spawn_with_session(common::admin_session("T1", "R1")).await;
    mount_users(&app, "T1", 401).await;
    mount_refresh(&app, ResponseTemplate::new(401).set_body_json(json!({ "message": "Refresh token expired" })), 1).await;

    let resp = app.api.fetch("/users", ApiRequest::get()).await.unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["message"], "Token expired");
    assert!(app.store.state().is_none());
    assert!(!app.session_file.exists());
    assert_eq!(app.upstream_requests("/api/users").await.len(), 1);
}

#[tokio::test]
async fn test_refresh_without_token_in_body_signs_out() {
    let app = common::TestApp::spawn_with_session(common::admin_session("T1", "R1")).await;
    mount_users(&app, "T1", 401).await;
    mount_refresh(&app, ResponseTemplate::new(200).set_body_json(json!({ "data": {} })), 1).await;

    let resp = app.api.fetch("/users", ApiRequest::get()).await.unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert!(app.store.state().is_none());
}

#[tokio::test]
async fn test_signed_out_401_is_not_refreshed() {
    let app = common::TestApp::spawn().await;
    Mock::given(method("GET"))
        .and(path("/api/users"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&app.upstream)
        .await;
    mount_refresh(&app, ResponseTemplate::new(200), 0).await;

    let resp = app.api.fetch("/users", ApiRequest::get()).await.unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert!(app.upstream_requests("/api/users").await[0].headers.get("authorization").is_none());
}

#[tokio::test]
async fn test_empty_refresh_token_is_not_used() {
    let app = common::TestApp::spawn_with_session(common::admin_session("T1", "")).await;
    mount_users(&app, "T1", 401).await;
    mount_refresh(&app, ResponseTemplate::new(200), 0).await;

    let resp = app.api.fetch("/users", ApiRequest::get()).await.unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(app.upstream_requests("/api/users").await.len(), 1);
    assert_eq!(app.store.state().unwrap().access_token, "T1");
}

#[tokio::test]
async fn test_retry_happens_at_most_once() {
    let app = common::TestApp::spawn_with_session(common::admin_session("T1", "R1")).await;
    mount_users(&app, "T1", 401).await;
    mount_users(&app, "T2", 401).await;
    mount_refresh(&app, ResponseTemplate::new(200).set_body_json(json!({ "data": { "accessToken": "T2" } })), 1).await;

    let resp = app.api.fetch("/users", ApiRequest::get()).await.unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(app.upstream_requests("/api/users").await.len(), 2);
    // The refresh itself succeeded, so the session stays.
    assert_eq!(app.store.state().unwrap().access_token, "T2");
}

#[tokio::test]
async fn test_non_401_failures_pass_through() {
    let app = common::TestApp::spawn_with_session(common::admin_session("T1", "R1")).await;
    Mock::given(method("GET"))
        .and(path("/api/users"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({ "message": "Forbidden" })))
        .expect(1)
        .mount(&app.upstream)
        .await;
    mount_refresh(&app, ResponseTemplate::new(200), 0).await;

    let resp = app.api.fetch("/users", ApiRequest::get()).await.unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_concurrent_401s_share_one_refresh() {
    let app = common::TestApp::spawn_with_session(common::admin_session("T1", "R1")).await;
    mount_users(&app, "T1", 401).await;
    mount_users(&app, "T2", 200).await;
    mount_refresh(
        &app,
        ResponseTemplate::new(200)
            .set_body_json(json!({ "data": { "accessToken": "T2" } }))
            .set_delay(Duration::from_millis(200)),
        1,
    )
    .await;

    let results = futures::future::join_all((0..4).map(|_| app.api.fetch("/users", ApiRequest::get()))).await;

    for result in results {
        assert_eq!(result.unwrap().status(), StatusCode::OK);
    }
    assert_eq!(app.store.state().unwrap().access_token, "T2");
}

#[tokio::test]
async fn test_absolute_url_is_used_as_is() {
    let app = common::TestApp::spawn().await;
    Mock::given(method("GET"))
        .and(path("/elsewhere/ping"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&app.upstream)
        .await;

    let url = format!("{}/elsewhere/ping", app.upstream.uri());
    let resp = app.api.fetch(&url, ApiRequest::get()).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
}
