#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub log_level: String,
    /// Scheme + host of the catalog, e.g. `"https://www.daraz.pk"`.
    pub catalog_origin: String,
    pub request_timeout_secs: u64,
    pub max_retries: u32,
    pub retry_backoff_base_secs: u64,
    /// W3C WebDriver endpoint for the rendered tier; `None` disables it.
    pub webdriver_url: Option<String>,
    pub render_timeout_secs: u64,
    pub render_settle_ms: u64,
    pub max_items_per_page: usize,
    pub cache_ttl_secs: u64,
    pub page_limit: u32,
    pub max_results: usize,
    pub delay_min_ms: u64,
    pub delay_max_ms: u64,
    /// Postgres URL for the persistent cache; `None` keeps the cache in memory.
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("log_level", &self.log_level)
            .field("catalog_origin", &self.catalog_origin)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("max_retries", &self.max_retries)
            .field("retry_backoff_base_secs", &self.retry_backoff_base_secs)
            .field("webdriver_url", &self.webdriver_url)
            .field("render_timeout_secs", &self.render_timeout_secs)
            .field("render_settle_ms", &self.render_settle_ms)
            .field("max_items_per_page", &self.max_items_per_page)
            .field("cache_ttl_secs", &self.cache_ttl_secs)
            .field("page_limit", &self.page_limit)
            .field("max_results", &self.max_results)
            .field("delay_min_ms", &self.delay_min_ms)
            .field("delay_max_ms", &self.delay_max_ms)
            .field(
                "database_url",
                &self.database_url.as_ref().map(|_| "[redacted]"),
            )
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .finish()
    }
}
