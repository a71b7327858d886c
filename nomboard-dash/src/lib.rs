//! nomboard-dash library - nomination report dashboard service
//!
//! Read-only reporting over the contest nominations database, behind a
//! single shared operator password.

use axum::Router;
use nomboard_common::{DashboardConfig, SessionGate};
use std::sync::Arc;
use std::time::Duration;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod db;
pub mod error;
pub mod report;
pub mod signing;

use db::ReportStore;
use signing::MediaSigner;

/// Timeout for diagnostic outbound requests
const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Report queries (PostgreSQL in production)
    pub store: Arc<dyn ReportStore>,
    /// Video URL signer; `None` when no signing service is configured
    pub signer: Option<Arc<dyn MediaSigner>>,
    /// Shared-password session gate
    pub gate: SessionGate,
    /// Validated configuration
    pub config: Arc<DashboardConfig>,
    /// Client for diagnostic probes
    pub http_client: reqwest::Client,
}

impl AppState {
    /// Create new application state
    pub fn new(
        store: Arc<dyn ReportStore>,
        signer: Option<Arc<dyn MediaSigner>>,
        config: DashboardConfig,
    ) -> anyhow::Result<Self> {
        let http_client = reqwest::Client::builder().timeout(PROBE_TIMEOUT).build()?;

        Ok(Self {
            store,
            signer,
            gate: SessionGate::new(config.session_password.clone()),
            config: Arc::new(config),
            http_client,
        })
    }

    /// Replace the session gate (e.g. to change the failure delay)
    pub fn with_gate(mut self, gate: SessionGate) -> Self {
        self.gate = gate;
        self
    }
}

/// Build application router
///
/// Health and the auth endpoints are public; report and diagnostics routes
/// require a session.
pub fn build_router(state: AppState) -> Router {
    use axum::middleware;
    use axum::routing::{get, post};

    // Protected routes (require session cookie)
    let protected = Router::new()
        .route("/api/data", get(api::get_report))
        .route("/api/debug", get(api::get_debug_info))
        .route("/api/my-ip", get(api::get_outbound_ip))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            api::require_session,
        ));

    // Public routes
    let public = Router::new()
        .route("/api/auth/check", get(api::check_session))
        .route("/api/auth/login", post(api::login))
        .route("/api/auth/logout", post(api::logout))
        .merge(api::health_routes());

    Router::new()
        .merge(protected)
        .merge(public)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
