#![forbid(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::todo)]
#![warn(clippy::panic)]
#![warn(clippy::dbg_macro)]
#![warn(clippy::print_stderr)]
#![warn(clippy::clone_on_ref_ptr)]
#![warn(unreachable_pub)]
#![warn(missing_debug_implementations)]
#![warn(unused_qualifications)]
#![deny(unused_must_use)]
// The CLI subcommands report to the terminal.
#![allow(clippy::print_stdout)]

use anyhow::Context;
use std::net::SocketAddr;
use std::time::Duration;
use storefront_admin::config::{Command, Config};
use storefront_admin::domain::token::TokenVerifier;
use storefront_admin::error::AppError;
use storefront_admin::{App, AppBuilder, api, telemetry};
use tokio::sync::watch;
use tracing::Instrument;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load();
    let telemetry_guard = telemetry::init_telemetry(&config.telemetry)?;

    let app = AppBuilder::new(config.clone()).build()?;
    let result = match config.command.clone().unwrap_or(Command::Serve) {
        Command::Serve => serve(config, app).await,
        Command::Login { email, password } => login(app, &email, &password).await,
        Command::Logout => logout(app).await,
        Command::Whoami => whoami(app).await,
    };

    telemetry_guard.shutdown();
    result
}

async fn serve(config: Config, app: App) -> anyhow::Result<()> {
    let boot_span = tracing::info_span!("boot_server");
    let (listener, router) = async {
        let secret = config.auth.jwt_secret.as_deref().context("--jwt-secret is required to serve the console")?;
        let verifier = TokenVerifier::new(secret);

        // Protected pages answer "loading" until this completes.
        let store = app.store.clone();
        tokio::spawn(async move { store.hydrate().await });

        let router = api::app_router(config.clone(), app.store, verifier, app.services);
        let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!(address = %addr, api = %config.api.base_url, "listening");

        Ok::<_, anyhow::Error>((listener, router))
    }
    .instrument(boot_span)
    .await?;

    let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
    storefront_admin::spawn_signal_handler(shutdown_tx);

    let mut server_rx = shutdown_rx.clone();
    let mut server = tokio::spawn(async move {
        axum::serve(listener, router)
            .with_graceful_shutdown(async move {
                let _ = server_rx.wait_for(|&s| s).await;
            })
            .await
    });

    tokio::select! {
        result = &mut server => return Ok(result??),
        _ = shutdown_rx.wait_for(|&s| s) => {}
    }

    match tokio::time::timeout(Duration::from_secs(config.server.shutdown_timeout_secs), server).await {
        Ok(result) => result??,
        Err(_) => tracing::warn!("Timeout waiting for in-flight requests to finish."),
    }
    Ok(())
}

async fn login(app: App, email: &str, password: &str) -> anyhow::Result<()> {
    app.store.hydrate().await;
    let session = app.services.auth_service.login(email, password).await?;
    println!("Signed in as {} ({})", session.user.email.as_deref().unwrap_or(email), session.user.id);
    Ok(())
}

async fn logout(app: App) -> anyhow::Result<()> {
    app.store.hydrate().await;
    app.services.auth_service.logout().await?;
    println!("Signed out");
    Ok(())
}

async fn whoami(app: App) -> anyhow::Result<()> {
    app.store.hydrate().await;
    let session = app.store.state().ok_or(AppError::Unauthenticated)?;
    let user = session.user;
    println!("{} role={}{}", user.id, user.role, user.email.map(|e| format!(" email={e}")).unwrap_or_default());
    Ok(())
}
