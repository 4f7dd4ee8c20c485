pub mod cache;
pub mod client;
pub mod coordinator;
pub mod error;
pub mod fetcher;
pub mod normalize;
pub mod parse;
pub mod politeness;
mod rate_limit;
pub mod render;
pub mod search;

pub use cache::{cache_key, CacheEntry, CacheStore, MemoryCacheStore, ResultCache};
pub use client::CatalogClient;
pub use coordinator::{FetchCoordinator, PageFetch};
pub use error::{CacheError, ScraperError};
pub use fetcher::{FetchOutcome, PageFetcher};
pub use normalize::{absolutize_url, build_record, RawItem};
pub use parse::normalize_price;
pub use politeness::PolitenessDelay;
pub use render::{RenderedFetcher, WebDriverClient};
pub use search::{PageReport, SearchAggregator, SearchDiagnostics, SearchReport};
