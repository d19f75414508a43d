pub mod provider;
pub mod scoring;
pub mod types;

use crate::config::Settings;
use crate::market::provider::{AlphaVantageClient, CoinGeckoClient, QuoteProvider};
use crate::market::types::{CryptoQuote, DataSource, MarketSnapshot, Quote, StockQuote};
use std::sync::Arc;

pub const FALLBACK_BTC_PRICE: f64 = 45_000.0;
pub const FALLBACK_SPY_PRICE: f64 = 4_500.0;

/// Fetches both quote sources and scores them. A failing source is replaced by its
/// fallback quote and flagged as [`DataSource::Fallback`]; fetching never errors.
#[derive(Clone)]
pub struct MarketDataSource {
    crypto: Arc<dyn QuoteProvider<CryptoQuote>>,
    stocks: Arc<dyn QuoteProvider<StockQuote>>,
}

impl MarketDataSource {
    pub fn new(
        crypto: Arc<dyn QuoteProvider<CryptoQuote>>,
        stocks: Arc<dyn QuoteProvider<StockQuote>>,
    ) -> Self {
        Self { crypto, stocks }
    }

    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        Ok(Self::new(
            Arc::new(CoinGeckoClient::from_settings(settings)?),
            Arc::new(AlphaVantageClient::from_settings(settings)?),
        ))
    }

    pub async fn snapshot(&self) -> MarketSnapshot {
        let (crypto, stocks) = tokio::join!(self.crypto.fetch_quotes(), self.stocks.fetch_quotes());

        let (mut crypto, crypto_source) =
            live_or_fallback(self.crypto.provider_name(), crypto, fallback_crypto);
        let (mut stocks, stock_source) =
            live_or_fallback(self.stocks.provider_name(), stocks, fallback_stocks);

        // Scored before the per-symbol top-up below.
        let scores = scoring::score(&crypto, &stocks);

        let mut fallback_symbols = Vec::new();
        if crypto_source == DataSource::Live {
            fill_missing(
                self.crypto.provider_name(),
                &mut crypto,
                fallback_crypto,
                &mut fallback_symbols,
            );
        }
        if stock_source == DataSource::Live {
            fill_missing(
                self.stocks.provider_name(),
                &mut stocks,
                fallback_stocks,
                &mut fallback_symbols,
            );
        }
        tracing::debug!(
            ?crypto_source,
            ?stock_source,
            trend = ?scores.trend,
            sentiment = scores.sentiment,
            "market snapshot computed"
        );

        MarketSnapshot {
            fetched_at: chrono::Utc::now(),
            crypto,
            stocks,
            crypto_source,
            stock_source,
            fallback_symbols,
            scores,
        }
    }
}

fn live_or_fallback<Q>(
    provider: &'static str,
    fetched: anyhow::Result<Vec<Q>>,
    fallback: fn() -> Vec<Q>,
) -> (Vec<Q>, DataSource) {
    match fetched {
        Ok(quotes) if !quotes.is_empty() => (quotes, DataSource::Live),
        Ok(_) => {
            tracing::warn!(provider, "provider returned no quotes; using fallback");
            (fallback(), DataSource::Fallback)
        }
        Err(err) => {
            tracing::warn!(provider, error = %format!("{err:#}"), "market fetch failed; using fallback");
            (fallback(), DataSource::Fallback)
        }
    }
}

/// Appends the fallback quote for every fallback symbol a live provider left out.
fn fill_missing<Q: Quote>(
    provider: &'static str,
    quotes: &mut Vec<Q>,
    fallback: fn() -> Vec<Q>,
    filled: &mut Vec<String>,
) {
    for quote in fallback() {
        if quotes
            .iter()
            .any(|q| q.symbol().eq_ignore_ascii_case(quote.symbol()))
        {
            continue;
        }
        tracing::warn!(provider, symbol = quote.symbol(), "live quotes lack symbol; using fallback");
        filled.push(quote.symbol().to_string());
        quotes.push(quote);
    }
}

pub fn fallback_crypto() -> Vec<CryptoQuote> {
    vec![CryptoQuote {
        symbol: "BTC".to_string(),
        name: "bitcoin".to_string(),
        price: FALLBACK_BTC_PRICE,
        change_24h: 0.0,
        market_cap: None,
        volume_24h: None,
    }]
}

pub fn fallback_stocks() -> Vec<StockQuote> {
    vec![StockQuote {
        symbol: "SPY".to_string(),
        price: FALLBACK_SPY_PRICE,
        change_percent: 0.0,
        volume: None,
    }]
}
