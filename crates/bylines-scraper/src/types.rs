//! Content API search response types.
//!
//! Only the subset of `GET /search` that the pipeline reads is modelled.
//!
//! ### Paging
//! `currentPage` and `pages` are both 1-based. A query with no results still
//! returns `pages: 0` with `currentPage: 1`, which callers treat as exhausted.
//!
//! ### `fields.bylineHtml`
//! Only present when the request carries `show-fields=bylineHtml`, and
//! omitted entirely for articles without a byline. Anchors in the fragment
//! carry host-relative hrefs such as `profile/barneyronay`.

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Top-level envelope: the API nests everything under `response`.
#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    pub response: SearchPage,
}

/// One page of search results.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchPage {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub start_index: u64,
    #[serde(default)]
    pub page_size: u32,
    pub current_page: u32,
    pub pages: u32,
    #[serde(default)]
    pub results: Vec<ResultEntry>,
}

/// A single article in a search page.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultEntry {
    pub id: String,
    pub web_url: String,
    pub web_publication_date: DateTime<Utc>,
    #[serde(default)]
    pub fields: ResultFields,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultFields {
    pub byline_html: Option<String>,
}

impl ResultEntry {
    /// The byline markup, or `None` when absent or blank.
    #[must_use]
    pub fn byline(&self) -> Option<&str> {
        self.fields
            .byline_html
            .as_deref()
            .filter(|b| !b.trim().is_empty())
    }
}
