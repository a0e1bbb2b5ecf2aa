use crate::api::AppState;
use crate::api::middleware::AdminSession;
use crate::domain::catalog::DashboardStats;
use crate::domain::session::SessionUser;
use crate::error::Result;
use axum::{Json, extract::State};
use serde::Serialize;

#[derive(Debug, Clone, Copy, Serialize)]
pub struct NavLink {
    pub href: &'static str,
    pub label: &'static str,
}

pub const NAVIGATION: [NavLink; 7] = [
    NavLink { href: "/dashboard", label: "Dashboard" },
    NavLink { href: "/users", label: "Users" },
    NavLink { href: "/products", label: "Products" },
    NavLink { href: "/orders", label: "Orders" },
    NavLink { href: "/categories", label: "Categories" },
    NavLink { href: "/brands", label: "Brands" },
    NavLink { href: "/images", label: "Images" },
];

#[derive(Debug, Serialize)]
pub struct HomeView {
    pub user: SessionUser,
    pub navigation: &'static [NavLink],
}

/// `GET /`: the signed-in admin and the console's sections.
pub async fn home(AdminSession(session): AdminSession) -> Json<HomeView> {
    Json(HomeView { user: session.user, navigation: &NAVIGATION })
}

/// `GET /dashboard`
pub async fn stats(State(state): State<AppState>, _session: AdminSession) -> Result<Json<DashboardStats>> {
    Ok(Json(state.dashboard_service.stats().await?))
}
