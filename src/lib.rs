#![forbid(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::todo)]
#![warn(clippy::panic)]
#![warn(clippy::dbg_macro)]
#![warn(clippy::print_stdout)]
#![warn(clippy::print_stderr)]
#![warn(clippy::clone_on_ref_ptr)]
#![warn(unreachable_pub)]
#![warn(missing_debug_implementations)]
#![warn(unused_qualifications)]
#![deny(unused_must_use)]

pub mod api;
pub mod config;
pub mod domain;
pub mod error;
pub mod services;
pub mod storage;
pub mod telemetry;

use crate::api::ServiceContainer;
use crate::config::Config;
use crate::services::api_client::ApiClient;
use crate::services::auth_store::AuthStore;
use crate::storage::{FileSessionStorage, SessionStorage};
use std::sync::Arc;
use tokio::sync::watch;

/// Everything a command needs: the shared session store, the pipeline bound
/// to it and the services built on top.
#[derive(Debug)]
pub struct App {
    pub store: AuthStore,
    pub api: ApiClient,
    pub services: ServiceContainer,
}

#[derive(Debug)]
pub struct AppBuilder {
    config: Config,
    storage: Option<Arc<dyn SessionStorage>>,
    http: Option<reqwest::Client>,
}

impl AppBuilder {
    #[must_use]
    pub const fn new(config: Config) -> Self {
        Self { config, storage: None, http: None }
    }

    /// Overrides the session file named in the config.
    #[must_use]
    pub fn with_storage(mut self, storage: Arc<dyn SessionStorage>) -> Self {
        self.storage = Some(storage);
        self
    }

    #[must_use]
    pub fn with_http_client(mut self, http: reqwest::Client) -> Self {
        self.http = Some(http);
        self
    }

    /// Wires the store, client and services. The store is not hydrated yet.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn build(self) -> error::Result<App> {
        let storage =
            self.storage.unwrap_or_else(|| Arc::new(FileSessionStorage::new(self.config.session.path.clone())));
        let store = AuthStore::new(storage);

        let api = match self.http {
            Some(http) => ApiClient::with_client(http, &self.config.api.base_url, store.clone()),
            None => ApiClient::new(&self.config.api, store.clone())?,
        };
        let services = ServiceContainer::new(&api);

        Ok(App { store, api, services })
    }
}

/// Flips `shutdown_tx` on Ctrl-C or SIGTERM.
pub fn spawn_signal_handler(shutdown_tx: watch::Sender<bool>) {
    tokio::spawn(async move {
        let ctrl_c = async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to install Ctrl-C handler");
                std::future::pending::<()>().await;
            }
        };

        #[cfg(unix)]
        let terminate = async {
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(mut signal) => {
                    signal.recv().await;
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to install SIGTERM handler");
                    std::future::pending::<()>().await;
                }
            }
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            () = ctrl_c => {},
            () = terminate => {},
        }

        tracing::info!("Shutdown signal received, draining connections");
        let _ = shutdown_tx.send(true);
    });
}
