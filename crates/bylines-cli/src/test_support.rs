//! In-memory [`JournalistStore`] used by the flow tests.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Mutex;

use bylines_core::{ArticleRecord, FaceHeuristics, JournalistRecord};
use bylines_db::{DbError, JournalistStore};

#[derive(Default)]
pub(crate) struct MemoryStore {
    journalists: Mutex<BTreeMap<String, JournalistRecord>>,
    articles: Mutex<BTreeSet<(String, String)>>,
}

impl MemoryStore {
    pub(crate) fn with_journalists(records: impl IntoIterator<Item = JournalistRecord>) -> Self {
        let store = Self::default();
        {
            let mut map = store.journalists.lock().unwrap();
            for record in records {
                map.insert(record.name.clone(), record);
            }
        }
        store
    }

    pub(crate) fn journalist(&self, name: &str) -> Option<JournalistRecord> {
        self.journalists.lock().unwrap().get(name).cloned()
    }

    pub(crate) fn journalist_names(&self) -> Vec<String> {
        self.journalists.lock().unwrap().keys().cloned().collect()
    }

    /// `(article id, journalist name)` pairs.
    pub(crate) fn article_keys(&self) -> Vec<(String, String)> {
        self.articles.lock().unwrap().iter().cloned().collect()
    }
}

impl JournalistStore for MemoryStore {
    async fn insert_journalist(&self, record: &JournalistRecord) -> Result<(), DbError> {
        self.journalists
            .lock()
            .unwrap()
            .entry(record.name.clone())
            .or_insert_with(|| record.clone());
        Ok(())
    }

    async fn insert_article(&self, article: &ArticleRecord) -> Result<(), DbError> {
        self.articles
            .lock()
            .unwrap()
            .insert((article.id.clone(), article.journalist_name.clone()));
        Ok(())
    }

    async fn update_journalist_image_path(&self, name: &str, image_path: &str) -> Result<(), DbError> {
        let mut map = self.journalists.lock().unwrap();
        let record = map.get_mut(name).ok_or(DbError::NotFound)?;
        record.image_path = Some(image_path.to_string());
        Ok(())
    }

    async fn update_journalist_heuristics(
        &self,
        name: &str,
        heuristics: &FaceHeuristics,
    ) -> Result<(), DbError> {
        let mut map = self.journalists.lock().unwrap();
        let record = map.get_mut(name).ok_or(DbError::NotFound)?;
        record.apply_heuristics(heuristics);
        Ok(())
    }

    async fn list_journalists(&self) -> Result<Vec<JournalistRecord>, DbError> {
        Ok(self.journalists.lock().unwrap().values().cloned().collect())
    }
}
