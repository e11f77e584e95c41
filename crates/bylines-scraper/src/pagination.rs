//! Page-numbered pagination over the Content API search endpoint.
//!
//! The endpoint takes a 1-based `page` query parameter and reports
//! `currentPage` / `pages` in every response. Walking it is a two-state
//! machine:
//!
//! ```text
//! NotStarted --next()--> InProgress { current, total } --next()--> ...
//! ```
//!
//! collapsing to exhausted once `current == total`. Each successful fetch
//! produces a fresh [`PageState`]; a failed fetch leaves the caller's state
//! untouched.

use chrono::NaiveDate;
use reqwest::Url;

use crate::client::{redact_api_key, BylineClient};
use crate::error::ScraperError;
use crate::types::{SearchPage, SearchResponse};

/// Cursor for a paginated search, immutable between fetches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageState {
    current_page: Option<u32>,
    total_pages: Option<u32>,
    next_url: Url,
}

impl PageState {
    /// A state that has not fetched anything yet.
    #[must_use]
    pub fn new(seed: Url) -> Self {
        Self {
            current_page: None,
            total_pages: None,
            next_url: seed,
        }
    }

    /// `true` before the first fetch, then while `current_page < total_pages`.
    #[must_use]
    pub fn has_next(&self) -> bool {
        match (self.current_page, self.total_pages) {
            (Some(current), Some(total)) => current < total,
            _ => true,
        }
    }

    #[must_use]
    pub fn current_page(&self) -> Option<u32> {
        self.current_page
    }

    #[must_use]
    pub fn total_pages(&self) -> Option<u32> {
        self.total_pages
    }

    /// URL the next call to [`BylineClient::next_page`] will request.
    #[must_use]
    pub fn next_url(&self) -> &Url {
        &self.next_url
    }

    /// State after `page` was fetched from `self.next_url`.
    ///
    /// Total pages are pinned by the first response.
    fn advance(&self, page: &SearchPage) -> Self {
        Self {
            current_page: Some(page.current_page),
            total_pages: Some(self.total_pages.unwrap_or(page.pages)),
            next_url: next_page_url(&self.next_url),
        }
    }
}

/// Returns `url` with its `page` parameter incremented by one.
///
/// A missing or non-numeric `page` is treated as page 1, so the result
/// carries `page=2`. Every other query parameter keeps its position.
#[must_use]
pub fn next_page_url(url: &Url) -> Url {
    let current = url
        .query_pairs()
        .find(|(k, _)| k == "page")
        .and_then(|(_, v)| v.parse::<u32>().ok())
        .unwrap_or(1);
    let next = current.saturating_add(1).to_string();

    let mut pairs: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(k, _)| k != "page")
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    let insert_at = url
        .query_pairs()
        .position(|(k, _)| k == "page")
        .unwrap_or(pairs.len())
        .min(pairs.len());
    pairs.insert(insert_at, ("page".to_string(), next));

    let mut rewritten = url.clone();
    rewritten.query_pairs_mut().clear().extend_pairs(pairs);
    rewritten
}

/// Builds the search URL for every article first published on `day`.
///
/// # Errors
///
/// Returns [`ScraperError::InvalidUrl`] if `base_url` is not an absolute URL.
pub fn day_search_url(
    base_url: &str,
    day: NaiveDate,
    page_size: u32,
    api_key: &str,
) -> Result<Url, ScraperError> {
    let mut url = Url::parse(base_url).map_err(|e| ScraperError::InvalidUrl {
        url: base_url.to_owned(),
        reason: e.to_string(),
    })?;
    let day = day.format("%Y-%m-%d").to_string();
    url.query_pairs_mut()
        .append_pair("use-date", "first-publication")
        .append_pair("from-date", &day)
        .append_pair("to-date", &day)
        .append_pair("page-size", &page_size.to_string())
        .append_pair("show-fields", "bylineHtml")
        .append_pair("api-key", api_key);
    Ok(url)
}

impl BylineClient {
    /// Fetches the page `state` points at and returns it with the next state.
    ///
    /// # Errors
    ///
    /// Propagates any error from [`BylineClient::fetch_json`]; `state` is
    /// not consumed, so the caller still holds the pre-fetch cursor.
    pub async fn next_page(
        &self,
        state: &PageState,
    ) -> Result<(SearchPage, PageState), ScraperError> {
        tracing::debug!(url = %redact_api_key(state.next_url()), "fetching search page");
        let envelope: SearchResponse = self.fetch_json(state.next_url()).await?;
        let page = envelope.response;
        let next = state.advance(&page);
        Ok((page, next))
    }
}

/// Convenience wrapper pairing a client with a [`PageState`].
///
/// ```ignore
/// let mut paginator = SearchPaginator::new(&client, seed);
/// while paginator.has_next() {
///     let page = paginator.next().await?;
///     // ...
/// }
/// ```
pub struct SearchPaginator<'a> {
    client: &'a BylineClient,
    state: PageState,
}

impl<'a> SearchPaginator<'a> {
    #[must_use]
    pub fn new(client: &'a BylineClient, seed: Url) -> Self {
        Self {
            client,
            state: PageState::new(seed),
        }
    }

    #[must_use]
    pub fn has_next(&self) -> bool {
        self.state.has_next()
    }

    #[must_use]
    pub fn state(&self) -> &PageState {
        &self.state
    }

    #[must_use]
    pub fn url(&self) -> &Url {
        self.state.next_url()
    }

    /// Fetches the next page. The stored state only moves on success.
    ///
    /// Calling this after [`Self::has_next`] turned `false` is a caller bug;
    /// it re-requests past the last page and the response decides the state.
    ///
    /// # Errors
    ///
    /// Propagates any error from [`BylineClient::next_page`].
    pub async fn next(&mut self) -> Result<SearchPage, ScraperError> {
        let (page, state) = self.client.next_page(&self.state).await?;
        self.state = state;
        Ok(page)
    }
}
