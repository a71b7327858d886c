//! Nomination report endpoint
//!
//! Query, then sign videos, then assemble. A query failure aborts the whole
//! request; signing failures only mark their own rows.

use axum::{extract::State, Json};
use tracing::debug;

use crate::error::{ApiError, ApiFailure};
use crate::report::{assemble, ReportEnvelope};
use crate::signing::enrich;
use crate::AppState;

/// GET /api/data
///
/// Requires a session (see `require_session`).
pub async fn get_report(State(state): State<AppState>) -> Result<Json<ReportEnvelope>, ApiFailure> {
    let threshold = state.config.score_threshold;

    let report = state
        .store
        .fetch_report(threshold)
        .await
        .map_err(|e| ApiError::data_load(e).respond(state.config.environment))?;

    debug!(
        threshold,
        rows = report.nominations.len(),
        "Fetched nomination report"
    );

    let nominations = enrich(state.signer.as_deref(), report.nominations).await;

    Ok(Json(assemble(&report.stats, nominations)))
}
