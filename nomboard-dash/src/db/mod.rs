//! Database access layer for nomboard-dash
//!
//! All access is read-only: the contest schema is owned by the ingestion
//! process, this service only reports on it.

use async_trait::async_trait;
use nomboard_common::{DashboardConfig, Result};
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions, PgSslMode};
use std::str::FromStr;
use tracing::{info, warn};

pub mod models;
mod report;
mod schema;

pub use models::{AggregateStats, ColumnInfo, Nomination, Report, SchemaReport, TableName};
pub use report::{fetch_nominations, fetch_stats};
pub use schema::{list_tables, table_columns, NOMINATIONS_TABLE, PARTICIPANTS_TABLE};

/// Read access to the nomination report
///
/// Implemented by `PgReportStore`; handlers only see the trait so they can be
/// exercised without a live database.
#[async_trait]
pub trait ReportStore: Send + Sync {
    /// Statistics and listing for nominations scoring above `score_threshold`
    async fn fetch_report(&self, score_threshold: f64) -> Result<Report>;

    /// Table and column listings for diagnostics
    async fn describe_schema(&self) -> Result<SchemaReport>;
}

/// Open the connection pool
///
/// Called once at startup; the pool is owned by `AppState` and closed on
/// shutdown. Requests beyond `max_connections` wait up to the acquire timeout.
pub async fn connect(config: &DashboardConfig) -> Result<PgPool> {
    let mut options = PgConnectOptions::from_str(&config.database_url)?;

    match config.database_tls.requires_tls(&config.database_url) {
        Some(true) => {
            options = options.ssl_mode(PgSslMode::Require);
            info!("Database TLS: required ({:?})", config.database_tls);
        }
        Some(false) => {
            options = options.ssl_mode(PgSslMode::Disable);
            info!("Database TLS: disabled ({:?})", config.database_tls);
        }
        None => info!("Database TLS: sslmode from connection string"),
    }

    let pool = PgPoolOptions::new()
        .max_connections(config.pool.max_connections)
        .acquire_timeout(config.pool.acquire_timeout)
        .idle_timeout(config.pool.idle_timeout)
        .connect_with(options)
        .await?;

    Ok(pool)
}

/// PostgreSQL-backed report store
#[derive(Clone)]
pub struct PgReportStore {
    pool: PgPool,
}

impl PgReportStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl ReportStore for PgReportStore {
    async fn fetch_report(&self, score_threshold: f64) -> Result<Report> {
        let mut tx = self.pool.begin().await?;

        // Both statements must see the same rows for the stats to describe
        // the listing.
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY")
            .execute(&mut *tx)
            .await?;

        let stats = fetch_stats(&mut *tx, score_threshold).await?;
        let nominations = fetch_nominations(&mut *tx, score_threshold).await?;

        tx.commit().await?;

        Ok(Report { stats, nominations })
    }

    async fn describe_schema(&self) -> Result<SchemaReport> {
        let tables = list_tables(&self.pool).await?;

        let nomination_columns = table_columns(&self.pool, NOMINATIONS_TABLE)
            .await
            .unwrap_or_else(|e| {
                warn!("Error fetching {} columns: {}", NOMINATIONS_TABLE, e);
                Vec::new()
            });
        let participant_columns = table_columns(&self.pool, PARTICIPANTS_TABLE)
            .await
            .unwrap_or_else(|e| {
                warn!("Error fetching {} columns: {}", PARTICIPANTS_TABLE, e);
                Vec::new()
            });

        Ok(SchemaReport {
            tables,
            nomination_columns,
            participant_columns,
        })
    }
}
