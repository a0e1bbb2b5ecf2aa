use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Clone, Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Config {
    #[command(subcommand)]
    pub command: Option<Command>,

    #[command(flatten)]
    pub api: ApiConfig,

    #[command(flatten)]
    pub auth: AuthConfig,

    #[command(flatten)]
    pub session: SessionConfig,

    #[command(flatten)]
    pub server: ServerConfig,

    #[command(flatten)]
    pub telemetry: TelemetryConfig,
}

#[derive(Clone, Debug, Subcommand)]
pub enum Command {
    /// Run the admin console server (default)
    Serve,
    /// Sign in against the upstream API and persist the session
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "STOREFRONT_ADMIN_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Clear the persisted session
    Logout,
    /// Show the signed-in admin, if any
    Whoami,
}

#[derive(Clone, Debug, Args)]
pub struct ApiConfig {
    /// Base URL of the storefront REST API
    #[arg(long = "api-base-url", env = "STOREFRONT_ADMIN_API_BASE_URL", default_value = "http://localhost:3000/api")]
    pub base_url: String,

    /// Connect timeout for upstream requests; transport defaults apply when unset
    #[arg(long = "api-connect-timeout-secs", env = "STOREFRONT_ADMIN_API_CONNECT_TIMEOUT_SECS")]
    pub connect_timeout_secs: Option<u64>,
}

#[derive(Clone, Debug, Args)]
pub struct AuthConfig {
    /// Secret the upstream API signs access tokens with (HS256)
    #[arg(long, env = "STOREFRONT_ADMIN_JWT_SECRET", hide_env_values = true)]
    pub jwt_secret: Option<String>,

    /// Lifetime of the mirrored access-token cookie in seconds
    #[arg(long, env = "STOREFRONT_ADMIN_COOKIE_MAX_AGE_SECS", default_value_t = 86_400)]
    pub cookie_max_age_secs: i64,
}

#[derive(Clone, Debug, Args)]
pub struct SessionConfig {
    /// File the session record is persisted to
    #[arg(long = "session-file", env = "STOREFRONT_ADMIN_SESSION_FILE", default_value = ".storefront-admin/session.json")]
    pub path: PathBuf,
}

#[derive(Clone, Debug, Args)]
pub struct ServerConfig {
    /// Host to listen on
    #[arg(long, env = "STOREFRONT_ADMIN_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on
    #[arg(long, env = "STOREFRONT_ADMIN_PORT", default_value_t = 8080)]
    pub port: u16,

    /// Seconds to wait for in-flight requests on shutdown
    #[arg(long, env = "STOREFRONT_ADMIN_SHUTDOWN_TIMEOUT_SECS", default_value_t = 5)]
    pub shutdown_timeout_secs: u64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Clone, Debug, Args)]
pub struct TelemetryConfig {
    /// Log output format
    #[arg(long, env = "STOREFRONT_ADMIN_LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    /// OTLP gRPC endpoint for traces and metrics (e.g. http://localhost:4317)
    #[arg(long, env = "STOREFRONT_ADMIN_OTLP_ENDPOINT")]
    pub otlp_endpoint: Option<String>,
}

impl Config {
    #[must_use]
    pub fn load() -> Self {
        Self::parse()
    }
}
