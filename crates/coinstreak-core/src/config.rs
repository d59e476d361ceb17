use std::env;

/// Public coin market data API.
pub const DEFAULT_API_URL: &str = "https://api.coinpaprika.com/v1";

/// Per-request timeout applied when none is configured.
pub const DEFAULT_TIMEOUT_MS: u64 = 5_000;

/// Maximum number of daily rows the historical endpoint returns per request.
pub const DEFAULT_ROWS_LIMIT: usize = 360;

/// Remote API settings used by the reconciler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_ms: u64,
    pub rows_limit: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: String::from(DEFAULT_API_URL),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            rows_limit: DEFAULT_ROWS_LIMIT,
        }
    }
}

impl ApiConfig {
    /// Defaults, with the base URL taken from `COINSTREAK_API_URL` when set.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(url) = env::var("COINSTREAK_API_URL") {
            let url = url.trim();
            if !url.is_empty() {
                config.base_url = url.to_owned();
            }
        }
        config
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// A zero limit is clamped to one row per page.
    pub fn with_rows_limit(mut self, rows_limit: usize) -> Self {
        self.rows_limit = rows_limit.max(1);
        self
    }

    pub fn currency_url(&self, coin: &str) -> String {
        format!(
            "{}/coins/{}",
            self.base_url.trim_end_matches('/'),
            urlencoding::encode(coin)
        )
    }

    pub fn historical_url(&self, coin: &str) -> String {
        format!("{}/ohlcv/historical", self.currency_url(coin))
    }
}
