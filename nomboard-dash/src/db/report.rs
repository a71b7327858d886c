//! Report queries
//!
//! Both statements filter on the same predicate,
//! `ai_score IS NOT NULL AND ai_score > threshold`, so the statistics always
//! describe exactly the listed rows.
//!
//! Numeric columns are cast explicitly so decoding does not depend on how
//! the external schema declares them (numeric, real, integer).

use nomboard_common::Result;
use sqlx::PgConnection;

use super::models::{AggregateStats, Nomination};

const STATS_SQL: &str = r#"
    SELECT
        MAX(ai_score)::float8 AS highest_score,
        AVG(ai_score)::float8 AS average_score,
        COUNT(*) AS total_participants
    FROM aider_un_proche_nominations
    WHERE ai_score IS NOT NULL
      AND ai_score::float8 > $1
"#;

const NOMINATIONS_SQL: &str = r#"
    SELECT
        n.id::int8 AS id,
        n.ai_score::float8 AS ai_score,
        n.video_url AS video,
        n.participant_id::int8 AS participant_id,
        p.first_name,
        p.last_name,
        p.phone AS phone_number,
        p.email,
        n.loved_one_first_name AS nominee_first_name,
        n.loved_one_last_name AS nominee_last_name,
        n.loved_one_phone AS nominee_phone_number,
        n.loved_one_email AS nominee_email,
        n.why AS why_help_text,
        n.how AS how_help_text
    FROM aider_un_proche_nominations n
    LEFT JOIN contest_participants p ON n.participant_id = p.id
    WHERE n.ai_score IS NOT NULL
      AND n.ai_score::float8 > $1
    ORDER BY n.ai_score DESC, n.id ASC
"#;

/// Highest, mean and count of scores above `score_threshold`
///
/// An empty set yields `None` aggregates and a zero count, not an error.
pub async fn fetch_stats(conn: &mut PgConnection, score_threshold: f64) -> Result<AggregateStats> {
    let (highest_score, average_score, total_participants): (Option<f64>, Option<f64>, i64) =
        sqlx::query_as(STATS_SQL)
            .bind(score_threshold)
            .fetch_one(conn)
            .await?;

    Ok(AggregateStats {
        highest_score,
        average_score,
        total_participants,
    })
}

/// Nominations above `score_threshold`, best score first
///
/// Ties are broken by id so repeated calls return the same order.
pub async fn fetch_nominations(conn: &mut PgConnection, score_threshold: f64) -> Result<Vec<Nomination>> {
    let rows = sqlx::query_as::<_, Nomination>(NOMINATIONS_SQL)
        .bind(score_threshold)
        .fetch_all(conn)
        .await?;

    Ok(rows)
}
