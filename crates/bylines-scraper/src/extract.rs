//! Pure extraction of journalist records and profile headshots from HTML.
//!
//! Both functions parse with `scraper` and walk the resulting tree in
//! document order (a depth-first pre-order traversal). No network I/O
//! happens here, and the parsed DOM never outlives the call.

use bylines_core::JournalistRecord;
use percent_encoding::percent_decode_str;
use reqwest::Url;
use scraper::{ElementRef, Html};

use crate::error::ScraperError;

/// Class carried by the headshot `<img>` on a contributor profile page.
pub const PROFILE_IMAGE_CLASS: &str = "index-page-header__image";

/// Turns a byline fragment into journalist records.
///
/// Every `<a>` in the fragment yields one record, in document order. The
/// anchor's href is host-relative, so its path and query are placed onto
/// the scheme, host, and port of `page_url` (the article the byline belongs
/// to) with a leading `/` enforced. The record's name is the final path
/// segment of that profile URL, percent-decoded.
///
/// A fragment with no anchors (agency credits such as "Associated Press")
/// yields exactly one record named after the trimmed byline text.
#[must_use]
pub fn journalists_from_byline(byline_html: &str, page_url: &Url) -> Vec<JournalistRecord> {
    let fragment = Html::parse_fragment(byline_html);
    let anchors: Vec<ElementRef<'_>> = fragment
        .root_element()
        .descendants()
        .filter_map(ElementRef::wrap)
        .filter(|el| el.value().name() == "a")
        .collect();

    if anchors.is_empty() {
        let text: String = fragment.root_element().text().collect();
        return vec![JournalistRecord::named(text.trim())];
    }

    anchors
        .into_iter()
        .filter_map(|anchor| {
            let href = anchor.value().attr("href").unwrap_or_default();
            match resolve_profile_url(href, page_url) {
                Ok(profile) => {
                    let name = last_path_segment(&profile);
                    Some(JournalistRecord::with_profile(name, profile.as_str()))
                }
                Err(reason) => {
                    tracing::warn!(href, page_url = %page_url, reason = %reason, "skipping unparsable byline href");
                    None
                }
            }
        })
        .collect()
}

/// Finds the headshot URL on a contributor profile page.
///
/// Returns the `src` of the first `<img>` carrying [`PROFILE_IMAGE_CLASS`],
/// resolved against `page_url`. `Ok(None)` means the page has no headshot,
/// which is an expected outcome rather than a failure.
///
/// # Errors
///
/// Returns [`ScraperError::InvalidUrl`] if the matching image has no `src`
/// or its `src` cannot be resolved.
pub fn image_url_from_profile(html: &str, page_url: &Url) -> Result<Option<Url>, ScraperError> {
    let document = Html::parse_document(html);
    let Some(img) = document
        .root_element()
        .descendants()
        .filter_map(ElementRef::wrap)
        .find(|el| {
            el.value().name() == "img" && el.value().classes().any(|c| c == PROFILE_IMAGE_CLASS)
        })
    else {
        return Ok(None);
    };

    let src = img
        .value()
        .attr("src")
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ScraperError::InvalidUrl {
            url: page_url.to_string(),
            reason: "profile header image has no src".to_owned(),
        })?;

    page_url
        .join(src)
        .map(Some)
        .map_err(|e| ScraperError::InvalidUrl {
            url: src.to_owned(),
            reason: e.to_string(),
        })
}

fn resolve_profile_url(href: &str, page_url: &Url) -> Result<Url, String> {
    let href = href.trim();
    let joined = if href.starts_with('/') || Url::parse(href).is_ok() {
        page_url.join(href)
    } else {
        page_url.join(&format!("/{href}"))
    }
    .map_err(|e| e.to_string())?;

    let mut profile = page_url.clone();
    profile.set_path(joined.path());
    profile.set_query(joined.query());
    profile.set_fragment(None);
    Ok(profile)
}

/// `Url` keeps segments percent-encoded; names are stored decoded.
fn last_path_segment(url: &Url) -> String {
    let segment = url.path_segments().and_then(Iterator::last).unwrap_or_default();
    percent_decode_str(segment).decode_utf8_lossy().into_owned()
}

#[cfg(test)]
#[path = "extract_test.rs"]
mod tests;
