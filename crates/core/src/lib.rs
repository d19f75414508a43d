pub mod advisor;
pub mod domain;
pub mod market;
pub mod storage;

pub mod config {
    use anyhow::Context;

    pub const DEFAULT_DATABASE_URL: &str = "sqlite://finadvisor.db?mode=rwc";

    #[derive(Debug, Clone)]
    pub struct Settings {
        pub database_url: Option<String>,
        pub sentry_dsn: Option<String>,
        pub coingecko_base_url: Option<String>,
        pub alpha_vantage_base_url: Option<String>,
        pub alpha_vantage_api_key: Option<String>,
        pub market_timeout_secs: Option<u64>,
    }

    impl Settings {
        pub fn from_env() -> anyhow::Result<Self> {
            let market_timeout_secs = match std::env::var("MARKET_TIMEOUT_SECS") {
                Ok(s) => Some(
                    s.trim()
                        .parse::<u64>()
                        .with_context(|| format!("MARKET_TIMEOUT_SECS is not a number: {s}"))?,
                ),
                Err(_) => None,
            };

            Ok(Self {
                database_url: non_empty_var("DATABASE_URL"),
                sentry_dsn: non_empty_var("SENTRY_DSN"),
                coingecko_base_url: non_empty_var("COINGECKO_BASE_URL"),
                alpha_vantage_base_url: non_empty_var("ALPHA_VANTAGE_BASE_URL"),
                alpha_vantage_api_key: non_empty_var("ALPHA_VANTAGE_API_KEY"),
                market_timeout_secs,
            })
        }

        /// Falls back to a local SQLite file so the binaries start without any setup.
        pub fn database_url(&self) -> &str {
            self.database_url.as_deref().unwrap_or(DEFAULT_DATABASE_URL)
        }
    }

    fn non_empty_var(key: &str) -> Option<String> {
        std::env::var(key).ok().filter(|s| !s.trim().is_empty())
    }
}
