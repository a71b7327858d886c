//! Report envelope assembly
//!
//! Success body:
//! `{success: true, stats: {highestScore, averageScore, totalParticipants}, nominations: [...]}`
//!
//! Failure bodies are produced by `crate::error::ApiFailure`.

use serde::Serialize;

use crate::db::AggregateStats;
use crate::signing::EnrichedNomination;

/// Statistics as shown to clients
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsPayload {
    pub highest_score: f64,
    pub average_score: f64,
    pub total_participants: i64,
}

impl From<&AggregateStats> for StatsPayload {
    /// Missing or non-finite aggregates become zero
    fn from(stats: &AggregateStats) -> Self {
        Self {
            highest_score: finite_or_zero(stats.highest_score),
            average_score: finite_or_zero(stats.average_score),
            total_participants: stats.total_participants.max(0),
        }
    }
}

fn finite_or_zero(value: Option<f64>) -> f64 {
    value.filter(|v| v.is_finite()).unwrap_or(0.0)
}

/// Successful `/api/data` response
#[derive(Debug, Clone, Serialize)]
pub struct ReportEnvelope {
    pub success: bool,
    pub stats: StatsPayload,
    pub nominations: Vec<EnrichedNomination>,
}

/// Combine statistics and enriched rows
///
/// Every row is kept, whatever its enrichment outcome, in listing order.
pub fn assemble(stats: &AggregateStats, nominations: Vec<EnrichedNomination>) -> ReportEnvelope {
    ReportEnvelope {
        success: true,
        stats: StatsPayload::from(stats),
        nominations,
    }
}
