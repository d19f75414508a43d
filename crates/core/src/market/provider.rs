use crate::config::Settings;
use crate::market::types::{CryptoQuote, StockQuote};
use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;

pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_COINGECKO_BASE_URL: &str = "https://api.coingecko.com/api/v3";
const DEFAULT_ALPHA_VANTAGE_BASE_URL: &str = "https://www.alphavantage.co";
const DEFAULT_ALPHA_VANTAGE_API_KEY: &str = "demo";

/// CoinGecko ids paired with the ticker symbol we expose.
pub const TRACKED_COINS: [(&str, &str); 5] = [
    ("bitcoin", "BTC"),
    ("ethereum", "ETH"),
    ("solana", "SOL"),
    ("cardano", "ADA"),
    ("polkadot", "DOT"),
];

pub const TRACKED_STOCKS: [&str; 3] = ["SPY", "QQQ", "VTI"];

#[async_trait::async_trait]
pub trait QuoteProvider<Q>: Send + Sync {
    fn provider_name(&self) -> &'static str;

    async fn fetch_quotes(&self) -> Result<Vec<Q>>;
}

fn build_http(settings: &Settings) -> Result<reqwest::Client> {
    let timeout_secs = settings.market_timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS);
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .context("failed to build market data http client")
}

async fn get_json(
    http: &reqwest::Client,
    url: &str,
    query: &[(&str, &str)],
) -> Result<Value> {
    let res = http
        .get(url)
        .query(query)
        .send()
        .await
        .with_context(|| format!("market data request failed: {url}"))?;

    let status = res.status();
    let text = res
        .text()
        .await
        .context("failed to read market data response")?;

    if !status.is_success() {
        anyhow::bail!("market data HTTP {status}: {text}");
    }

    serde_json::from_str::<Value>(&text)
        .with_context(|| format!("market data response is not valid JSON: {text}"))
}

#[derive(Debug, Clone)]
pub struct CoinGeckoClient {
    http: reqwest::Client,
    base_url: String,
}

impl CoinGeckoClient {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let base_url = settings
            .coingecko_base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_COINGECKO_BASE_URL.to_string());

        Ok(Self {
            http: build_http(settings)?,
            base_url,
        })
    }

    fn url(&self) -> String {
        format!("{}/simple/price", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait::async_trait]
impl QuoteProvider<CryptoQuote> for CoinGeckoClient {
    fn provider_name(&self) -> &'static str {
        "coingecko"
    }

    async fn fetch_quotes(&self) -> Result<Vec<CryptoQuote>> {
        let ids = TRACKED_COINS
            .iter()
            .map(|(id, _)| *id)
            .collect::<Vec<_>>()
            .join(",");

        let raw = get_json(
            &self.http,
            &self.url(),
            &[
                ("ids", ids.as_str()),
                ("vs_currencies", "usd"),
                ("include_market_cap", "true"),
                ("include_24hr_vol", "true"),
                ("include_24hr_change", "true"),
            ],
        )
        .await?;

        parse_simple_price(raw)
    }
}

#[derive(Debug, Clone, Deserialize)]
struct SimplePriceEntry {
    usd: Option<f64>,
    usd_market_cap: Option<f64>,
    usd_24h_vol: Option<f64>,
    usd_24h_change: Option<f64>,
}

pub fn parse_simple_price(raw: Value) -> Result<Vec<CryptoQuote>> {
    let entries = serde_json::from_value::<HashMap<String, SimplePriceEntry>>(raw)
        .context("failed to parse simple/price response")?;

    let mut out = Vec::with_capacity(TRACKED_COINS.len());
    for (id, symbol) in TRACKED_COINS {
        let Some(entry) = entries.get(id) else {
            tracing::debug!(coin = id, "coin missing from simple/price response");
            continue;
        };
        let Some(price) = entry.usd else {
            tracing::debug!(coin = id, "coin has no usd price");
            continue;
        };
        out.push(CryptoQuote {
            symbol: symbol.to_string(),
            name: id.to_string(),
            price,
            change_24h: entry.usd_24h_change.unwrap_or(0.0),
            market_cap: entry.usd_market_cap,
            volume_24h: entry.usd_24h_vol,
        });
    }

    anyhow::ensure!(!out.is_empty(), "simple/price response contained no tracked coins");
    Ok(out)
}

#[derive(Debug, Clone)]
pub struct AlphaVantageClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl AlphaVantageClient {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let base_url = settings
            .alpha_vantage_base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_ALPHA_VANTAGE_BASE_URL.to_string());
        let api_key = settings
            .alpha_vantage_api_key
            .clone()
            .unwrap_or_else(|| DEFAULT_ALPHA_VANTAGE_API_KEY.to_string());

        Ok(Self {
            http: build_http(settings)?,
            base_url,
            api_key,
        })
    }

    fn url(&self) -> String {
        format!("{}/query", self.base_url.trim_end_matches('/'))
    }

    async fn fetch_one(&self, symbol: &str) -> Result<StockQuote> {
        let raw = get_json(
            &self.http,
            &self.url(),
            &[
                ("function", "GLOBAL_QUOTE"),
                ("symbol", symbol),
                ("apikey", self.api_key.as_str()),
            ],
        )
        .await?;

        parse_global_quote(raw)
    }
}

#[async_trait::async_trait]
impl QuoteProvider<StockQuote> for AlphaVantageClient {
    fn provider_name(&self) -> &'static str {
        "alpha_vantage"
    }

    /// Symbols that fail are skipped; the call only errors when none succeed.
    async fn fetch_quotes(&self) -> Result<Vec<StockQuote>> {
        let mut out = Vec::with_capacity(TRACKED_STOCKS.len());
        let mut last_err = None;
        for symbol in TRACKED_STOCKS {
            match self.fetch_one(symbol).await {
                Ok(q) => out.push(q),
                Err(err) => {
                    tracing::debug!(symbol, error = %err, "stock quote fetch failed; skipping");
                    last_err = Some(err);
                }
            }
        }

        match (out.is_empty(), last_err) {
            (true, Some(err)) => Err(err.context("no stock quotes could be fetched")),
            _ => Ok(out),
        }
    }
}

#[derive(Debug, Deserialize)]
struct GlobalQuoteResponse {
    #[serde(rename = "Global Quote")]
    global_quote: Option<GlobalQuote>,
    #[serde(rename = "Note")]
    note: Option<String>,
    #[serde(rename = "Information")]
    information: Option<String>,
    #[serde(rename = "Error Message")]
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GlobalQuote {
    #[serde(rename = "01. symbol")]
    symbol: Option<String>,
    #[serde(rename = "05. price")]
    price: Option<String>,
    #[serde(rename = "06. volume")]
    volume: Option<String>,
    #[serde(rename = "10. change percent")]
    change_percent: Option<String>,
}

pub fn parse_global_quote(raw: Value) -> Result<StockQuote> {
    let resp = serde_json::from_value::<GlobalQuoteResponse>(raw)
        .context("failed to parse GLOBAL_QUOTE response")?;

    if let Some(msg) = resp
        .error_message
        .or(resp.note)
        .or(resp.information)
    {
        anyhow::bail!("alpha vantage refused the request: {msg}");
    }

    let quote = resp
        .global_quote
        .context("GLOBAL_QUOTE response has no quote")?;
    let symbol = quote
        .symbol
        .filter(|s| !s.trim().is_empty())
        .context("GLOBAL_QUOTE response has no symbol")?;
    let price = quote
        .price
        .as_deref()
        .context("GLOBAL_QUOTE response has no price")?
        .trim()
        .parse::<f64>()
        .context("GLOBAL_QUOTE price is not a number")?;
    let change_percent = quote
        .change_percent
        .as_deref()
        .map(|s| s.trim().trim_end_matches('%').parse::<f64>())
        .transpose()
        .context("GLOBAL_QUOTE change percent is not a number")?
        .unwrap_or(0.0);
    let volume = quote.volume.and_then(|s| s.trim().parse::<f64>().ok());

    Ok(StockQuote {
        symbol,
        price,
        change_percent,
        volume,
    })
}
