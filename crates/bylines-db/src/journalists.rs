//! Database operations for the `journalists` table.

use bylines_core::{FaceHeuristics, JournalistRecord};
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::DbError;

// ---------------------------------------------------------------------------
// Row type
// ---------------------------------------------------------------------------

/// A row from the `journalists` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct JournalistRow {
    pub journalist_name: String,
    pub profile_url: Option<String>,
    pub image_filename: Option<String>,
    pub gender: Option<String>,
    pub gender_confidence: Option<f32>,
    pub age_range_low: Option<i32>,
    pub age_range_high: Option<i32>,
    pub created_at: DateTime<Utc>,
}

impl From<JournalistRow> for JournalistRecord {
    fn from(row: JournalistRow) -> Self {
        Self {
            name: row.journalist_name,
            profile_url: row.profile_url,
            image_path: row.image_filename,
            gender: row.gender,
            gender_confidence: row.gender_confidence,
            age_range_low: row.age_range_low,
            age_range_high: row.age_range_high,
        }
    }
}

const SELECT_COLUMNS: &str = "SELECT journalist_name, profile_url, image_filename, gender, \
                gender_confidence, age_range_low, age_range_high, created_at \
         FROM journalists";

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Inserts a journalist by name. An existing row with the same name is left
/// untouched.
///
/// Returns `true` if a new row was written.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn insert_journalist(pool: &PgPool, record: &JournalistRecord) -> Result<bool, DbError> {
    let result = sqlx::query(
        "INSERT INTO journalists (journalist_name, profile_url) \
         VALUES ($1, $2) \
         ON CONFLICT DO NOTHING",
    )
    .bind(&record.name)
    .bind(record.profile_url.as_deref())
    .execute(pool)
    .await?;

    Ok(result.rows_affected() == 1)
}

/// Returns every journalist, ordered by name.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_journalists(pool: &PgPool) -> Result<Vec<JournalistRow>, DbError> {
    let rows = sqlx::query_as::<_, JournalistRow>(&format!(
        "{SELECT_COLUMNS} ORDER BY journalist_name"
    ))
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Records where a journalist's headshot was written.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no journalist has that name, or
/// [`DbError::Sqlx`] if the query fails.
pub async fn update_journalist_image_path(
    pool: &PgPool,
    name: &str,
    image_path: &str,
) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE journalists \
         SET image_filename = $2 \
         WHERE journalist_name = $1",
    )
    .bind(name)
    .bind(image_path)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::NotFound);
    }
    Ok(())
}

/// Stores face-analysis estimates for a journalist.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no journalist has that name, or
/// [`DbError::Sqlx`] if the query fails.
pub async fn update_journalist_heuristics(
    pool: &PgPool,
    name: &str,
    heuristics: &FaceHeuristics,
) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE journalists \
         SET gender = $2, gender_confidence = $3, age_range_low = $4, age_range_high = $5 \
         WHERE journalist_name = $1",
    )
    .bind(name)
    .bind(&heuristics.gender)
    .bind(heuristics.gender_confidence)
    .bind(heuristics.age_range_low)
    .bind(heuristics.age_range_high)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::NotFound);
    }
    Ok(())
}
