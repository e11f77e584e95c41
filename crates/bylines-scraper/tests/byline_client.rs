//! Integration tests for `BylineClient` fetches, the search paginator, and
//! image download.
//!
//! Every test stands up its own `wiremock` server, so no real network
//! traffic is made. Retry tests use a 1 ms backoff base to keep wall-clock
//! time low; exact delay arithmetic is covered by the paused-clock unit
//! tests in `rate_limit`.

use chrono::NaiveDate;
use serde_json::json;
use wiremock::matchers::{method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

use bylines_scraper::{
    day_search_url, download_image, BylineClient, ImageType, ScraperError, SearchPaginator,
    SearchResponse, Url,
};

fn test_client() -> BylineClient {
    BylineClient::new(5, "bylines-test/0.1", 0, 0).expect("failed to build test BylineClient")
}

fn test_client_with_retries(max_retries: u32, backoff_base_ms: u64) -> BylineClient {
    BylineClient::new(5, "bylines-test/0.1", max_retries, backoff_base_ms)
        .expect("failed to build test BylineClient")
}

fn url(raw: &str) -> Url {
    Url::parse(raw).expect("valid test URL")
}

fn search_page_json(current_page: u32, pages: u32, ids: &[&str]) -> serde_json::Value {
    let results: Vec<serde_json::Value> = ids
        .iter()
        .map(|id| {
            json!({
                "id": id,
                "webUrl": format!("https://www.theguardian.com/{id}"),
                "webPublicationDate": "2014-03-02T09:30:00Z",
                "fields": { "bylineHtml": "<a href=\"profile/barneyronay\">Barney Ronay</a>" }
            })
        })
        .collect();
    json!({
        "response": {
            "status": "ok",
            "total": 3,
            "startIndex": 1,
            "pageSize": 1,
            "currentPage": current_page,
            "pages": pages,
            "results": results
        }
    })
}

// ---------------------------------------------------------------------------
// fetch_html
// ---------------------------------------------------------------------------

#[tokio::test]
async fn fetch_html_returns_body_on_success() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/profile/barneyronay"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>ok</html>"))
        .expect(1)
        .mount(&server)
        .await;

    let body = test_client()
        .fetch_html(&url(&format!("{}/profile/barneyronay", server.uri())))
        .await
        .expect("expected Ok");
    assert_eq!(body, "<html>ok</html>");
}

#[tokio::test]
async fn fetch_html_retries_rate_limit_then_succeeds() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/profile/x"))
        .respond_with(ResponseTemplate::new(429))
        .up_to_n_times(3)
        .expect(3)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/profile/x"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>finally</html>"))
        .expect(1)
        .mount(&server)
        .await;

    let body = test_client_with_retries(8, 1)
        .fetch_html(&url(&format!("{}/profile/x", server.uri())))
        .await
        .expect("expected success after three 429s");
    assert_eq!(body, "<html>finally</html>");
}

#[tokio::test]
async fn fetch_html_gives_up_after_retry_ceiling() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/profile/x"))
        .respond_with(ResponseTemplate::new(429))
        .expect(9)
        .mount(&server)
        .await;

    let err = test_client_with_retries(8, 1)
        .fetch_html(&url(&format!("{}/profile/x", server.uri())))
        .await
        .unwrap_err();
    assert!(
        matches!(err, ScraperError::RateLimited { attempts: 9, .. }),
        "expected RateLimited after 9 attempts, got: {err:?}"
    );
}

#[tokio::test]
async fn fetch_html_does_not_retry_server_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let err = test_client_with_retries(8, 1)
        .fetch_html(&url(&format!("{}/profile/x", server.uri())))
        .await
        .unwrap_err();
    assert!(
        matches!(err, ScraperError::UnexpectedStatus { status: 500, .. }),
        "expected UnexpectedStatus(500), got: {err:?}"
    );
}

// ---------------------------------------------------------------------------
// fetch_json
// ---------------------------------------------------------------------------

#[tokio::test]
async fn fetch_json_does_not_retry_rate_limit() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(429))
        .expect(1)
        .mount(&server)
        .await;

    let err = test_client_with_retries(8, 1)
        .fetch_json::<SearchResponse>(&url(&format!("{}/search", server.uri())))
        .await
        .unwrap_err();
    assert!(
        matches!(err, ScraperError::RateLimited { attempts: 1, .. }),
        "expected a single RateLimited attempt, got: {err:?}"
    );
}

#[tokio::test]
async fn fetch_json_reports_malformed_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json at all"))
        .mount(&server)
        .await;

    let err = test_client()
        .fetch_json::<SearchResponse>(&url(&format!("{}/search?api-key=secret", server.uri())))
        .await
        .unwrap_err();
    match err {
        ScraperError::Deserialize { context, .. } => {
            assert!(!context.contains("secret"), "api key leaked into error: {context}");
        }
        other => panic!("expected Deserialize, got: {other:?}"),
    }
}

#[tokio::test]
async fn fetch_json_surfaces_network_error() {
    let err = test_client()
        .fetch_json::<SearchResponse>(&url("http://127.0.0.1:1/search"))
        .await
        .unwrap_err();
    assert!(matches!(err, ScraperError::Http(_)), "got: {err:?}");
}

// ---------------------------------------------------------------------------
// SearchPaginator
// ---------------------------------------------------------------------------

#[tokio::test]
async fn paginator_walks_every_page_then_stops() {
    let server = MockServer::start().await;
    let day = NaiveDate::from_ymd_opt(2014, 3, 2).unwrap();

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("from-date", "2014-03-02"))
        .and(query_param("to-date", "2014-03-02"))
        .and(query_param("show-fields", "bylineHtml"))
        .and(query_param_is_missing("page"))
        .respond_with(ResponseTemplate::new(200).set_body_json(search_page_json(1, 3, &["a"])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(search_page_json(2, 3, &["b"])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("page", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(search_page_json(3, 3, &["c"])))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client();
    let seed = day_search_url(&format!("{}/search", server.uri()), day, 1, "test-key").unwrap();
    let mut paginator = SearchPaginator::new(&client, seed);

    let mut ids = Vec::new();
    while paginator.has_next() {
        let page = paginator.next().await.expect("page fetch failed");
        ids.extend(page.results.into_iter().map(|r| r.id));
    }

    assert_eq!(ids, vec!["a", "b", "c"]);
    assert_eq!(paginator.state().current_page(), Some(3));
    assert_eq!(paginator.state().total_pages(), Some(3));
}

#[tokio::test]
async fn paginator_keeps_state_when_a_page_fails() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let client = test_client();
    let seed = url(&format!("{}/search?q=x", server.uri()));
    let mut paginator = SearchPaginator::new(&client, seed.clone());

    let err = paginator.next().await.unwrap_err();
    assert!(matches!(err, ScraperError::UnexpectedStatus { status: 503, .. }));
    assert!(paginator.has_next());
    assert_eq!(paginator.url(), &seed);
    assert_eq!(paginator.state().current_page(), None);
}

#[tokio::test]
async fn paginator_with_no_results_stops_after_first_page() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(search_page_json(1, 0, &[])))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client();
    let mut paginator = SearchPaginator::new(&client, url(&format!("{}/search", server.uri())));
    let page = paginator.next().await.unwrap();
    assert!(page.results.is_empty());
    assert!(!paginator.has_next());
}

// ---------------------------------------------------------------------------
// download_image
// ---------------------------------------------------------------------------

#[tokio::test]
async fn download_image_sniffs_png() {
    let server = MockServer::start().await;
    let png = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00];
    Mock::given(method("GET"))
        .and(path("/img/barney.png"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(png.to_vec())
                .insert_header("Content-Type", "application/octet-stream"),
        )
        .mount(&server)
        .await;

    let image = download_image(&test_client(), &url(&format!("{}/img/barney.png", server.uri())))
        .await
        .expect("expected PNG download");
    assert_eq!(image.image_type, ImageType::Png);
    assert_eq!(image.bytes, png.to_vec());
    assert_eq!(image.file_name("barneyronay"), "barneyronay.png");
}

#[tokio::test]
async fn download_image_rejects_unknown_format() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/img/anim.gif"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(b"GIF89a\x01\x00\x01\x00".to_vec())
                .insert_header("Content-Type", "image/gif"),
        )
        .mount(&server)
        .await;

    let err = download_image(&test_client(), &url(&format!("{}/img/anim.gif", server.uri())))
        .await
        .unwrap_err();
    assert!(
        matches!(err, ScraperError::UnsupportedImage { ref content_type, .. } if content_type == "image/gif"),
        "expected UnsupportedImage, got: {err:?}"
    );
}

#[tokio::test]
async fn download_image_propagates_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = download_image(&test_client(), &url(&format!("{}/img/missing.jpeg", server.uri())))
        .await
        .unwrap_err();
    assert!(matches!(err, ScraperError::UnexpectedStatus { status: 404, .. }));
}
