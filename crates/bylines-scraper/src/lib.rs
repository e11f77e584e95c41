pub mod client;
pub mod error;
pub mod extract;
pub mod image;
pub mod pagination;
pub mod pool;
pub mod rate_limit;
pub mod types;

pub use client::{BylineClient, DEFAULT_BACKOFF_BASE_MS, DEFAULT_MAX_RETRIES};
pub use error::ScraperError;
pub use extract::{image_url_from_profile, journalists_from_byline};
pub use image::{download_image, DownloadedImage, ImageType};
pub use pagination::{day_search_url, next_page_url, PageState, SearchPaginator};
pub use pool::{Dispatcher, DrainSummary};
pub use reqwest::Url;
pub use types::{ResultEntry, ResultFields, SearchPage, SearchResponse};
