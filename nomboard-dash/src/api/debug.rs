//! Schema introspection endpoint (operational diagnostics)

use axum::{extract::State, Json};
use serde::Serialize;

use crate::db::SchemaReport;
use crate::error::{ApiError, ApiFailure};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct DebugResponse {
    pub success: bool,
    #[serde(flatten)]
    pub schema: SchemaReport,
}

/// GET /api/debug
///
/// Public tables plus the column listings of the nominations and
/// participants tables. Requires a session.
pub async fn get_debug_info(State(state): State<AppState>) -> Result<Json<DebugResponse>, ApiFailure> {
    let schema = state
        .store
        .describe_schema()
        .await
        .map_err(|e| ApiError::debug_info(e).respond(state.config.environment))?;

    Ok(Json(DebugResponse {
        success: true,
        schema,
    }))
}
