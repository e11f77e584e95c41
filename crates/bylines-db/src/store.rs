//! The persistence seam used by the discovery and image-backfill flows.
//!
//! The flows are generic over [`JournalistStore`] so they can run against
//! Postgres in production and an in-memory map in tests.

use std::future::Future;

use bylines_core::{ArticleRecord, FaceHeuristics, JournalistRecord};
use sqlx::PgPool;

use crate::{articles, journalists, DbError};

/// Journalist and article persistence.
///
/// Inserts are idempotent: writing a record whose key already exists
/// succeeds without changing the stored row.
pub trait JournalistStore: Send + Sync {
    fn insert_journalist(
        &self,
        record: &JournalistRecord,
    ) -> impl Future<Output = Result<(), DbError>> + Send;

    fn insert_article(
        &self,
        article: &ArticleRecord,
    ) -> impl Future<Output = Result<(), DbError>> + Send;

    /// Fails with [`DbError::NotFound`] if `name` has no row.
    fn update_journalist_image_path(
        &self,
        name: &str,
        image_path: &str,
    ) -> impl Future<Output = Result<(), DbError>> + Send;

    /// Fails with [`DbError::NotFound`] if `name` has no row.
    fn update_journalist_heuristics(
        &self,
        name: &str,
        heuristics: &FaceHeuristics,
    ) -> impl Future<Output = Result<(), DbError>> + Send;

    /// Every journalist, ordered by name.
    fn list_journalists(
        &self,
    ) -> impl Future<Output = Result<Vec<JournalistRecord>, DbError>> + Send;
}

/// [`JournalistStore`] backed by a Postgres pool.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

impl JournalistStore for PgStore {
    async fn insert_journalist(&self, record: &JournalistRecord) -> Result<(), DbError> {
        if !journalists::insert_journalist(&self.pool, record).await? {
            tracing::debug!(journalist = %record.name, "journalist already stored");
        }
        Ok(())
    }

    async fn insert_article(&self, article: &ArticleRecord) -> Result<(), DbError> {
        articles::insert_article(&self.pool, article).await?;
        Ok(())
    }

    async fn update_journalist_image_path(&self, name: &str, image_path: &str) -> Result<(), DbError> {
        journalists::update_journalist_image_path(&self.pool, name, image_path).await
    }

    async fn update_journalist_heuristics(
        &self,
        name: &str,
        heuristics: &FaceHeuristics,
    ) -> Result<(), DbError> {
        journalists::update_journalist_heuristics(&self.pool, name, heuristics).await
    }

    async fn list_journalists(&self) -> Result<Vec<JournalistRecord>, DbError> {
        let rows = journalists::list_journalists(&self.pool).await?;
        Ok(rows.into_iter().map(JournalistRecord::from).collect())
    }
}
