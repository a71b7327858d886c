//! Database models (read-only views of the contest schema)

use serde::{Deserialize, Serialize};

/// One nomination joined with its submitting participant
///
/// Participant fields are optional: the listing uses a LEFT JOIN, so a
/// nomination whose participant row is missing is still reported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Nomination {
    pub id: i64,
    pub ai_score: f64,
    /// Stored object key, or a signed playback URL after enrichment
    pub video: Option<String>,
    pub participant_id: Option<i64>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone_number: Option<String>,
    pub email: Option<String>,
    pub nominee_first_name: Option<String>,
    pub nominee_last_name: Option<String>,
    pub nominee_phone_number: Option<String>,
    pub nominee_email: Option<String>,
    pub why_help_text: Option<String>,
    pub how_help_text: Option<String>,
}

/// Aggregates over the nominations above the score threshold
///
/// `MAX`/`AVG` are NULL over an empty set, hence the options.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AggregateStats {
    pub highest_score: Option<f64>,
    pub average_score: Option<f64>,
    pub total_participants: i64,
}

/// Statistics and listing read from one snapshot
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Report {
    pub stats: AggregateStats,
    pub nominations: Vec<Nomination>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct TableName {
    pub table_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ColumnInfo {
    pub column_name: String,
    pub data_type: String,
}

/// Schema introspection for the diagnostics endpoint
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaReport {
    pub tables: Vec<TableName>,
    pub nomination_columns: Vec<ColumnInfo>,
    pub participant_columns: Vec<ColumnInfo>,
}
