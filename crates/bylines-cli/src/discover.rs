//! Discovery flow: search every day in a date range and persist each
//! credited journalist together with the article that credits them.
//!
//! One dispatcher task per day. Within a day the paginator runs to
//! exhaustion and every record is written as soon as it is extracted.
//! Persistence failures are logged per record and skipped; a failed page
//! fetch fails the whole day.

use std::sync::Arc;

use anyhow::Context;
use bylines_core::{ArticleRecord, DateRange};
use bylines_db::JournalistStore;
use bylines_scraper::{
    day_search_url, journalists_from_byline, BylineClient, Dispatcher, DrainSummary, ResultEntry,
    SearchPaginator, Url,
};
use chrono::NaiveDate;

pub(crate) struct DiscoverSettings {
    pub search_url: String,
    pub api_key: String,
    pub page_size: u32,
    pub concurrency: usize,
    pub range: DateRange,
}

/// Per-day counters, logged when the day finishes.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct DayTotals {
    pub pages: usize,
    pub journalists: usize,
    pub articles: usize,
    pub skipped: usize,
}

pub(crate) async fn run_discover<S>(
    store: Arc<S>,
    client: Arc<BylineClient>,
    settings: DiscoverSettings,
) -> DrainSummary
where
    S: JournalistStore + 'static,
{
    tracing::info!(
        from = %settings.range.start,
        to = %settings.range.end,
        days = settings.range.len(),
        concurrency = settings.concurrency,
        "starting discovery"
    );

    let mut dispatcher = Dispatcher::<anyhow::Error>::new("discover", settings.concurrency);
    for day in settings.range.days() {
        let store = Arc::clone(&store);
        let client = Arc::clone(&client);
        let search_url = settings.search_url.clone();
        let api_key = settings.api_key.clone();
        let page_size = settings.page_size;

        dispatcher
            .submit(day.to_string(), async move {
                let seed = day_search_url(&search_url, day, page_size, &api_key)?;
                let totals = discover_day(store.as_ref(), &client, day, seed).await?;
                tracing::info!(
                    %day,
                    pages = totals.pages,
                    journalists = totals.journalists,
                    articles = totals.articles,
                    skipped = totals.skipped,
                    "day complete"
                );
                Ok::<(), anyhow::Error>(())
            })
            .await;
    }

    dispatcher.drain().await
}

/// Walks every search page for `day` starting at `seed`.
pub(crate) async fn discover_day<S: JournalistStore>(
    store: &S,
    client: &BylineClient,
    day: NaiveDate,
    seed: Url,
) -> anyhow::Result<DayTotals> {
    let mut totals = DayTotals::default();
    let mut paginator = SearchPaginator::new(client, seed);

    while paginator.has_next() {
        let page = paginator
            .next()
            .await
            .with_context(|| format!("pagination failed for {day}"))?;
        totals.pages += 1;

        for entry in &page.results {
            persist_entry(store, entry, &mut totals).await;
        }
    }

    Ok(totals)
}

async fn persist_entry<S: JournalistStore>(store: &S, entry: &ResultEntry, totals: &mut DayTotals) {
    let web_url = match Url::parse(&entry.web_url) {
        Ok(url) => url,
        Err(e) => {
            tracing::warn!(article = %entry.id, web_url = %entry.web_url, error = %e, "unparsable article URL");
            totals.skipped += 1;
            return;
        }
    };
    let Some(byline) = entry.byline() else {
        tracing::debug!(article = %entry.id, "no byline");
        totals.skipped += 1;
        return;
    };

    for record in journalists_from_byline(byline, &web_url) {
        match store.insert_journalist(&record).await {
            Ok(()) => totals.journalists += 1,
            Err(e) => {
                tracing::warn!(journalist = %record.name, error = %e, "failed to store journalist");
            }
        }

        let article = ArticleRecord {
            id: entry.id.clone(),
            published_at: entry.web_publication_date,
            web_url: web_url.to_string(),
            journalist_name: record.name,
        };
        match store.insert_article(&article).await {
            Ok(()) => totals.articles += 1,
            Err(e) => {
                tracing::warn!(article = %article.id, journalist = %article.journalist_name, error = %e, "failed to store article");
            }
        }
    }
}

#[cfg(test)]
#[path = "discover_test.rs"]
mod tests;
