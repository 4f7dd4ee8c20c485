use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("rate limited by {domain} (retry after {retry_after_secs}s)")]
    RateLimited {
        domain: String,
        retry_after_secs: u64,
    },

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("invalid catalog URL \"{url}\": {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("WebDriver {command} failed: {reason}")]
    WebDriver { command: String, reason: String },

    #[error("render of {url} timed out after {timeout_secs}s")]
    RenderTimeout { url: String, timeout_secs: u64 },

    #[error("rendered tier is not configured")]
    RendererUnavailable,

    #[error("could not extract listing card: {reason}")]
    Extraction { reason: String },
}

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache backend error: {0}")]
    Backend(String),

    #[error("cache entry for {key} could not be (de)serialized: {source}")]
    Serde {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}
