//! Shared fixtures for nomboard-dash integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request},
    Router,
};
use nomboard_common::config::ConfigLayer;
use nomboard_common::{DashboardConfig, Environment, Error, Result, SessionGate};
use nomboard_dash::db::{
    AggregateStats, ColumnInfo, Nomination, Report, ReportStore, SchemaReport, TableName,
};
use nomboard_dash::signing::MediaSigner;
use nomboard_dash::{build_router, AppState};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

pub const PASSWORD: &str = "letmein";
pub const FAILURE_DELAY: Duration = Duration::from_millis(25);

/// Nomination with only the fields the tests care about
pub fn nomination(id: i64, ai_score: f64, video: Option<&str>) -> Nomination {
    Nomination {
        id,
        ai_score,
        video: video.map(str::to_string),
        participant_id: Some(100 + id),
        first_name: Some(format!("First{}", id)),
        last_name: Some(format!("Last{}", id)),
        phone_number: Some("555-0100".to_string()),
        email: Some(format!("p{}@example.com", id)),
        nominee_first_name: Some("Nominee".to_string()),
        nominee_last_name: Some(format!("N{}", id)),
        nominee_phone_number: None,
        nominee_email: None,
        why_help_text: Some("Why text".to_string()),
        how_help_text: Some("How text".to_string()),
    }
}

/// In-memory store applying the same predicate and ordering as the SQL
pub struct MemoryStore {
    pub nominations: Vec<Nomination>,
    pub fail: bool,
}

impl MemoryStore {
    pub fn new(nominations: Vec<Nomination>) -> Self {
        Self {
            nominations,
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            nominations: Vec::new(),
            fail: true,
        }
    }
}

#[async_trait]
impl ReportStore for MemoryStore {
    async fn fetch_report(&self, score_threshold: f64) -> Result<Report> {
        if self.fail {
            return Err(Error::Internal(
                "relation \"aider_un_proche_nominations\" does not exist".to_string(),
            ));
        }

        let mut rows: Vec<Nomination> = self
            .nominations
            .iter()
            .filter(|n| n.ai_score > score_threshold)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.ai_score.total_cmp(&a.ai_score).then(a.id.cmp(&b.id)));

        let stats = if rows.is_empty() {
            AggregateStats::default()
        } else {
            let sum: f64 = rows.iter().map(|n| n.ai_score).sum();
            AggregateStats {
                highest_score: rows.iter().map(|n| n.ai_score).reduce(f64::max),
                average_score: Some(sum / rows.len() as f64),
                total_participants: rows.len() as i64,
            }
        };

        Ok(Report {
            stats,
            nominations: rows,
        })
    }

    async fn describe_schema(&self) -> Result<SchemaReport> {
        if self.fail {
            return Err(Error::Internal("permission denied for schema information_schema".to_string()));
        }

        Ok(SchemaReport {
            tables: vec![
                TableName {
                    table_name: "aider_un_proche_nominations".to_string(),
                },
                TableName {
                    table_name: "contest_participants".to_string(),
                },
            ],
            nomination_columns: vec![
                ColumnInfo {
                    column_name: "id".to_string(),
                    data_type: "integer".to_string(),
                },
                ColumnInfo {
                    column_name: "ai_score".to_string(),
                    data_type: "numeric".to_string(),
                },
            ],
            participant_columns: vec![ColumnInfo {
                column_name: "id".to_string(),
                data_type: "integer".to_string(),
            }],
        })
    }
}

pub fn test_config(environment: Environment, extra: ConfigLayer) -> DashboardConfig {
    let base = ConfigLayer {
        database_url: Some("postgres://dash@localhost:5432/contest".to_string()),
        auth_password: Some(PASSWORD.to_string()),
        environment: Some(environment),
        ..Default::default()
    };
    DashboardConfig::resolve(extra, Some(base)).expect("test config should be valid")
}

/// Router over `store` and optional `signer`
pub fn app_with(
    store: MemoryStore,
    signer: Option<Arc<dyn MediaSigner>>,
    config: DashboardConfig,
) -> Router {
    let state = AppState::new(Arc::new(store), signer, config)
        .expect("state should build")
        .with_gate(SessionGate::with_failure_delay(PASSWORD, FAILURE_DELAY));
    build_router(state)
}

pub fn app(store: MemoryStore) -> Router {
    app_with(store, None, test_config(Environment::Production, ConfigLayer::default()))
}

pub fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

pub fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Cookie header value carrying a valid session
pub fn session_cookie() -> String {
    format!("auth_token={}", PASSWORD)
}

pub async fn extract_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body");
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}

/// Serve `router` on an ephemeral local port; returns its base URL
pub async fn spawn_server(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}
