use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CryptoQuote {
    pub symbol: String,
    pub name: String,
    pub price: f64,
    /// 24h change in percent (`-1.5` means -1.5%).
    pub change_24h: f64,
    pub market_cap: Option<f64>,
    pub volume_24h: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockQuote {
    pub symbol: String,
    pub price: f64,
    /// Day change in percent.
    pub change_percent: f64,
    pub volume: Option<f64>,
}

pub trait Quote {
    fn symbol(&self) -> &str;
}

impl Quote for CryptoQuote {
    fn symbol(&self) -> &str {
        &self.symbol
    }
}

impl Quote for StockQuote {
    fn symbol(&self) -> &str {
        &self.symbol
    }
}

/// Whether a source answered or its hardcoded stand-in was used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    Live,
    Fallback,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Bullish,
    Bearish,
    Neutral,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VolatilityLevel {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketScores {
    pub trend: Trend,
    pub volatility: VolatilityLevel,
    /// Mean absolute percent change behind `volatility`.
    pub volatility_index: f64,
    pub sentiment: f64,
    pub confidence: f64,
    pub risk: f64,
    /// Fractional return estimate (`0.012` = 1.2%).
    pub predicted_return: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketSnapshot {
    pub fetched_at: DateTime<Utc>,
    pub crypto: Vec<CryptoQuote>,
    pub stocks: Vec<StockQuote>,
    pub crypto_source: DataSource,
    pub stock_source: DataSource,
    /// Fallback quotes appended to a live source that did not answer for them.
    #[serde(default)]
    pub fallback_symbols: Vec<String>,
    pub scores: MarketScores,
}

impl MarketSnapshot {
    pub fn price_of(&self, symbol: &str) -> Option<f64> {
        self.crypto
            .iter()
            .find(|q| q.symbol.eq_ignore_ascii_case(symbol))
            .map(|q| q.price)
            .or_else(|| {
                self.stocks
                    .iter()
                    .find(|q| q.symbol.eq_ignore_ascii_case(symbol))
                    .map(|q| q.price)
            })
    }

    pub fn is_degraded(&self) -> bool {
        self.crypto_source == DataSource::Fallback
            || self.stock_source == DataSource::Fallback
            || !self.fallback_symbols.is_empty()
    }
}
