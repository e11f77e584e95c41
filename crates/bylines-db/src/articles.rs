//! Database operations for the `articles` table.

use bylines_core::ArticleRecord;
use sqlx::PgPool;

use crate::DbError;

/// Inserts one (article, journalist) credit. Re-inserting the same pair is
/// a no-op.
///
/// Returns `true` if a new row was written.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails, including when the
/// journalist row does not exist.
pub async fn insert_article(pool: &PgPool, article: &ArticleRecord) -> Result<bool, DbError> {
    let result = sqlx::query(
        "INSERT INTO articles (first_publication_date, id, web_url, journalist_name) \
         VALUES ($1, $2, $3, $4) \
         ON CONFLICT DO NOTHING",
    )
    .bind(article.published_at)
    .bind(&article.id)
    .bind(&article.web_url)
    .bind(&article.journalist_name)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() == 1)
}
