//! nomboard-dash - nomination report dashboard service
//!
//! Serves the operator dashboard API: shared-password sessions, the
//! nomination report with signed video URLs, and schema diagnostics.

use anyhow::{Context, Result};
use clap::Parser;
use nomboard_common::config::{load_toml_config, ConfigLayer};
use nomboard_common::{DashboardConfig, DatabaseTls, Environment};
use nomboard_dash::db::{self, PgReportStore};
use nomboard_dash::signing::{HttpMediaSigner, MediaSigner};
use nomboard_dash::{build_router, AppState};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for nomboard-dash
///
/// Every option can also be given through its environment variable; values
/// not given here fall back to the TOML file, then to compiled defaults.
#[derive(Parser, Debug)]
#[command(name = "nomboard-dash")]
#[command(about = "Nomination report dashboard service")]
#[command(version)]
struct Args {
    /// TOML config file
    #[arg(short, long, env = "NOMBOARD_CONFIG")]
    config: Option<PathBuf>,

    /// Address to listen on
    #[arg(long, env = "NOMBOARD_BIND")]
    bind: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "NOMBOARD_PORT")]
    port: Option<u16>,

    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: Option<String>,

    /// Database TLS: disable, require or auto (managed cloud hosts)
    #[arg(long, env = "DATABASE_SSL")]
    database_ssl: Option<DatabaseTls>,

    /// Base URL of the video signing service
    #[arg(long, env = "SIGNING_SERVICE_URL")]
    signing_service_url: Option<String>,

    /// API key for the video signing service
    #[arg(long, env = "SIGNING_API_KEY", hide_env_values = true)]
    signing_api_key: Option<String>,

    /// Per-call timeout for the signing service, in seconds
    #[arg(long, env = "SIGNING_TIMEOUT_SECS")]
    signing_timeout_secs: Option<u64>,

    /// Shared operator password
    #[arg(long, env = "AUTH_PASSWORD", hide_env_values = true)]
    auth_password: Option<String>,

    /// Deployment mode: development or production
    #[arg(long, env = "NOMBOARD_ENV")]
    environment: Option<Environment>,

    /// Only nominations scoring above this are reported
    #[arg(long, env = "NOMBOARD_SCORE_THRESHOLD")]
    score_threshold: Option<f64>,
}

impl Args {
    fn into_layer(self) -> ConfigLayer {
        ConfigLayer {
            bind_address: self.bind,
            port: self.port,
            database_url: self.database_url,
            database_ssl: self.database_ssl,
            signing_service_url: self.signing_service_url,
            signing_api_key: self.signing_api_key,
            signing_timeout_secs: self.signing_timeout_secs,
            auth_password: self.auth_password,
            environment: self.environment,
            score_threshold: self.score_threshold,
            ..Default::default()
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,nomboard_dash=debug,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting nomboard-dash v{}",
        env!("CARGO_PKG_VERSION")
    );

    let args = Args::parse();

    let file_layer = match &args.config {
        Some(path) => {
            let layer = load_toml_config(path)
                .with_context(|| format!("Failed to load config file {}", path.display()))?;
            info!("Loaded config file: {}", path.display());
            Some(layer)
        }
        None => None,
    };

    let config = DashboardConfig::resolve(args.into_layer(), file_layer)
        .context("Invalid configuration")?;
    info!("Configuration: {:?}", config);

    if config.environment.is_development() {
        warn!("Development mode: error chains are returned to clients and cookies are not Secure");
    }

    let pool = match db::connect(&config).await {
        Ok(pool) => {
            info!("✓ Connected to database");
            pool
        }
        Err(e) => {
            error!("Failed to connect to database: {}", e);
            return Err(e.into());
        }
    };

    let signer: Option<Arc<dyn MediaSigner>> = match &config.signing {
        Some(signing) => {
            let signer = HttpMediaSigner::new(signing)?;
            info!("Video signing via {}", signer.endpoint());
            Some(Arc::new(signer) as Arc<dyn MediaSigner>)
        }
        None => {
            warn!("No signing service configured; videos will be returned as stored keys");
            None
        }
    };

    let addr = format!("{}:{}", config.bind_address, config.port);

    let store = Arc::new(PgReportStore::new(pool.clone()));
    let state = AppState::new(store, signer, config)?;
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("nomboard-dash listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    // Drain the pool once in-flight requests have completed
    pool.close().await;
    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
