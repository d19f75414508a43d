//! Scalar market scores. Every function is pure and total: empty input yields a
//! neutral value instead of NaN.

use crate::market::types::{CryptoQuote, MarketScores, StockQuote, Trend, VolatilityLevel};

const TREND_THRESHOLD_PCT: f64 = 2.0;
const HIGH_VOLATILITY_PCT: f64 = 5.0;
const MEDIUM_VOLATILITY_PCT: f64 = 2.0;

// Market cap at which the size term of crypto risk reaches zero-ish (10bn USD).
const RISK_CAP_SCALE: f64 = 1.0e10;

const NEUTRAL_SENTIMENT: f64 = 0.5;
const NEUTRAL_CONFIDENCE: f64 = 0.5;
const NEUTRAL_RISK: f64 = 0.5;

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, n) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    (n > 0).then(|| sum / n as f64)
}

pub fn market_trend(changes: &[f64]) -> Trend {
    match mean(changes.iter().copied()) {
        Some(avg) if avg > TREND_THRESHOLD_PCT => Trend::Bullish,
        Some(avg) if avg < -TREND_THRESHOLD_PCT => Trend::Bearish,
        _ => Trend::Neutral,
    }
}

pub fn volatility_index(changes: &[f64]) -> f64 {
    mean(changes.iter().map(|c| c.abs())).unwrap_or(0.0)
}

pub fn volatility_level(changes: &[f64]) -> VolatilityLevel {
    let idx = volatility_index(changes);
    if idx > HIGH_VOLATILITY_PCT {
        VolatilityLevel::High
    } else if idx > MEDIUM_VOLATILITY_PCT {
        VolatilityLevel::Medium
    } else {
        VolatilityLevel::Low
    }
}

fn turnover(q: &CryptoQuote) -> Option<f64> {
    match (q.volume_24h, q.market_cap) {
        (Some(vol), Some(cap)) if cap > 0.0 => Some(vol / cap),
        _ => None,
    }
}

/// Changes mapped onto [0, 1] (±10% saturates), weighted towards heavily traded coins.
pub fn sentiment(quotes: &[CryptoQuote]) -> f64 {
    let mut weighted = 0.0;
    let mut total_weight = 0.0;
    for q in quotes {
        let normalized = (0.5 + q.change_24h / 20.0).clamp(0.0, 1.0);
        let weight = 1.0 + turnover(q).unwrap_or(0.0).min(1.0);
        weighted += normalized * weight;
        total_weight += weight;
    }
    if total_weight > 0.0 {
        weighted / total_weight
    } else {
        NEUTRAL_SENTIMENT
    }
}

pub fn confidence(quotes: &[CryptoQuote]) -> f64 {
    if quotes.is_empty() {
        return NEUTRAL_CONFIDENCE;
    }
    let volume_score =
        (mean(quotes.iter().map(|q| turnover(q).unwrap_or(0.0))).unwrap_or(0.0) * 10.0)
            .clamp(0.0, 1.0);
    let stability =
        (1.0 - mean(quotes.iter().map(|q| q.change_24h.abs())).unwrap_or(0.0) / 10.0)
            .clamp(0.0, 1.0);
    0.4 * volume_score + 0.6 * stability
}

pub fn crypto_risk(q: &CryptoQuote) -> f64 {
    let swing = (q.change_24h.abs() / 10.0).clamp(0.0, 1.0);
    let size = match q.market_cap {
        Some(cap) if cap > 0.0 => (RISK_CAP_SCALE / cap).clamp(0.0, 1.0),
        _ => 1.0,
    };
    0.6 * swing + 0.4 * size
}

pub fn stock_risk(q: &StockQuote) -> f64 {
    (q.change_percent.abs() / 5.0).clamp(0.0, 1.0)
}

pub fn overall_risk(crypto: &[CryptoQuote], stocks: &[StockQuote]) -> f64 {
    mean(
        crypto
            .iter()
            .map(crypto_risk)
            .chain(stocks.iter().map(stock_risk)),
    )
    .unwrap_or(NEUTRAL_RISK)
}

/// Market-cap weighted blend of momentum and sentiment; equal weights when no cap is known.
pub fn predicted_return(quotes: &[CryptoQuote], sentiment: f64) -> f64 {
    if quotes.is_empty() {
        return 0.0;
    }
    let caps: Vec<f64> = quotes
        .iter()
        .map(|q| q.market_cap.filter(|c| *c > 0.0).unwrap_or(0.0))
        .collect();
    let cap_total: f64 = caps.iter().sum();
    let sentiment_adj = (sentiment - 0.5) * 0.1;

    quotes
        .iter()
        .zip(&caps)
        .map(|(q, cap)| {
            let weight = if cap_total > 0.0 {
                cap / cap_total
            } else {
                1.0 / quotes.len() as f64
            };
            weight * (q.change_24h / 100.0 * 0.3 + sentiment_adj)
        })
        .sum()
}

pub fn score(crypto: &[CryptoQuote], stocks: &[StockQuote]) -> MarketScores {
    let changes: Vec<f64> = crypto
        .iter()
        .map(|q| q.change_24h)
        .chain(stocks.iter().map(|q| q.change_percent))
        .collect();
    let sentiment = sentiment(crypto);

    MarketScores {
        trend: market_trend(&changes),
        volatility: volatility_level(&changes),
        volatility_index: volatility_index(&changes),
        sentiment,
        confidence: confidence(crypto),
        risk: overall_risk(crypto, stocks),
        predicted_return: predicted_return(crypto, sentiment),
    }
}
