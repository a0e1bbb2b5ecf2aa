use crate::config::Config;
use crate::domain::token::TokenVerifier;
use crate::services::api_client::ApiClient;
use crate::services::auth_service::AuthService;
use crate::services::auth_store::AuthStore;
use crate::services::brand_service::BrandService;
use crate::services::category_service::CategoryService;
use crate::services::dashboard_service::DashboardService;
use crate::services::image_service::ImageService;
use crate::services::order_service::OrderService;
use crate::services::product_service::ProductService;
use crate::services::user_service::UserService;
use axum::body::Body;
use axum::http::{HeaderName, Request, StatusCode};
use axum::{
    Json, Router,
    extract::DefaultBodyLimit,
    middleware::from_fn_with_state,
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::request_id::{PropagateRequestIdLayer, RequestId, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

pub mod auth;
pub mod brands;
pub mod categories;
pub mod dashboard;
pub mod health;
pub mod images;
pub mod middleware;
pub mod orders;
pub mod products;
pub mod users;

/// Product forms carry several images.
const MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

#[derive(Clone, Debug)]
pub struct AppState {
    pub config: Config,
    pub store: AuthStore,
    pub verifier: Arc<TokenVerifier>,
    pub auth_service: AuthService,
    pub user_service: UserService,
    pub product_service: ProductService,
    pub category_service: CategoryService,
    pub brand_service: BrandService,
    pub order_service: OrderService,
    pub image_service: ImageService,
    pub dashboard_service: DashboardService,
}

/// Every service the console exposes, wired to one shared [`ApiClient`].
#[derive(Clone, Debug)]
pub struct ServiceContainer {
    pub auth_service: AuthService,
    pub user_service: UserService,
    pub product_service: ProductService,
    pub category_service: CategoryService,
    pub brand_service: BrandService,
    pub order_service: OrderService,
    pub image_service: ImageService,
    pub dashboard_service: DashboardService,
}

impl ServiceContainer {
    #[must_use]
    pub fn new(api: &ApiClient) -> Self {
        Self {
            auth_service: AuthService::new(api.clone()),
            user_service: UserService::new(api.clone()),
            product_service: ProductService::new(api.clone()),
            category_service: CategoryService::new(api.clone()),
            brand_service: BrandService::new(api.clone()),
            order_service: OrderService::new(api.clone()),
            image_service: ImageService::new(api.clone()),
            dashboard_service: DashboardService::new(api.clone()),
        }
    }
}

/// Answers a create or update. The echoed document is returned when the API
/// sent one; otherwise a created resource is a bare `201` and an update a `204`.
pub(crate) fn saved<T: Serialize>(status: StatusCode, document: Option<T>) -> Response {
    match document {
        Some(document) => (status, Json(document)).into_response(),
        None if status == StatusCode::OK => StatusCode::NO_CONTENT.into_response(),
        None => status.into_response(),
    }
}

/// Configures and returns the console router.
pub fn app_router(config: Config, store: AuthStore, verifier: TokenVerifier, services: ServiceContainer) -> Router {
    let state = AppState {
        config,
        store,
        verifier: Arc::new(verifier),
        auth_service: services.auth_service,
        user_service: services.user_service,
        product_service: services.product_service,
        category_service: services.category_service,
        brand_service: services.brand_service,
        order_service: services.order_service,
        image_service: services.image_service,
        dashboard_service: services.dashboard_service,
    };

    let public_routes = Router::new()
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/livez", get(health::livez));

    let admin_routes = Router::new()
        .route("/", get(dashboard::home))
        .route("/logout", post(auth::logout))
        .route("/dashboard", get(dashboard::stats))
        .route("/users", get(users::list_users))
        .route("/users/{id}", put(users::update_user).delete(users::delete_user))
        .route("/products", get(products::list_products).post(products::create_product))
        .route(
            "/products/{id}",
            get(products::get_product).put(products::update_product).delete(products::delete_product),
        )
        .route("/categories", get(categories::list_categories).post(categories::create_category))
        .route("/categories/{id}", put(categories::update_category).delete(categories::delete_category))
        .route("/brands", get(brands::list_brands).post(brands::create_brand))
        .route("/brands/{id}", put(brands::update_brand).delete(brands::delete_brand))
        .route("/orders", get(orders::list_orders))
        .route("/orders/{id}", get(orders::get_order).put(orders::update_order_status))
        .route("/images", get(images::list_images).post(images::upload_image))
        .route("/images/{*key}", delete(images::delete_image));

    Router::new()
        .merge(public_routes)
        .merge(admin_routes)
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(from_fn_with_state(state.clone(), middleware::edge_guard))
        .layer(PropagateRequestIdLayer::new(HeaderName::from_static("x-request-id")))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<Body>| {
                    let request_id = request
                        .extensions()
                        .get::<RequestId>()
                        .and_then(|id| id.header_value().to_str().ok())
                        .unwrap_or_default()
                        .to_string();

                    tracing::info_span!(
                        "request",
                        "request_id" = %request_id,
                        "http.request.method" = %request.method(),
                        "url.path" = %request.uri().path(),
                        "http.response.status_code" = tracing::field::Empty,
                        "otel.kind" = "server",
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>, latency: std::time::Duration, span: &tracing::Span| {
                        let status = response.status();
                        span.record("http.response.status_code", status.as_u16());

                        tracing::info!(
                            latency_ms = %latency.as_millis(),
                            status = %status.as_u16(),
                            "request completed"
                        );
                    },
                )
                .on_failure(|error, _latency, _span: &tracing::Span| {
                    tracing::error!(error = %error, "request failed");
                }),
        )
        .layer(SetRequestIdLayer::new(HeaderName::from_static("x-request-id"), middleware::MakeRequestUuid))
        .with_state(state)
}
