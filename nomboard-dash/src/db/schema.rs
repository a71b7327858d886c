//! Schema introspection queries for diagnostics

use nomboard_common::Result;
use sqlx::PgPool;

use super::models::{ColumnInfo, TableName};

/// Nominations table (one row per contest entry)
pub const NOMINATIONS_TABLE: &str = "aider_un_proche_nominations";
/// Participants table (joined by `participant_id`)
pub const PARTICIPANTS_TABLE: &str = "contest_participants";

/// List tables of the public schema in alphabetical order
pub async fn list_tables(pool: &PgPool) -> Result<Vec<TableName>> {
    let tables = sqlx::query_as::<_, TableName>(
        r#"
        SELECT table_name::text AS table_name
        FROM information_schema.tables
        WHERE table_schema = 'public'
        ORDER BY table_name
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(tables)
}

/// Column names and types of `table_name`, in declaration order
pub async fn table_columns(pool: &PgPool, table_name: &str) -> Result<Vec<ColumnInfo>> {
    let columns = sqlx::query_as::<_, ColumnInfo>(
        r#"
        SELECT column_name::text AS column_name, data_type::text AS data_type
        FROM information_schema.columns
        WHERE table_name = $1
        ORDER BY ordinal_position
        "#,
    )
    .bind(table_name)
    .fetch_all(pool)
    .await?;

    Ok(columns)
}
