use crate::domain::user::RiskTolerance;
use crate::market::types::MarketSnapshot;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Allocation {
    pub asset: String,
    pub amount: f64,
    pub percent: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Advice {
    pub user_id: i64,
    pub risk_tolerance: RiskTolerance,
    pub monthly_savings: f64,
    pub allocations: Vec<Allocation>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Timeframe {
    ShortTerm,
    MediumTerm,
    LongTerm,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendation {
    pub symbol: String,
    pub percent: f64,
    pub amount: f64,
    pub current_price: Option<f64>,
    pub confidence: f64,
    pub risk_level: RiskLevel,
    pub timeframe: Timeframe,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationSet {
    pub user_id: i64,
    pub risk_tolerance: RiskTolerance,
    pub monthly_savings: f64,
    pub generated_at: DateTime<Utc>,
    pub recommendations: Vec<Recommendation>,
    pub market: MarketSnapshot,
}

/// Percent split across asset classes; always sums to 100.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AssetMix {
    pub stocks: f64,
    pub crypto: f64,
    pub bonds: f64,
    pub cash: f64,
}

impl AssetMix {
    pub fn total(&self) -> f64 {
        self.stocks + self.crypto + self.bonds + self.cash
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskProfile {
    pub user_id: i64,
    pub score: f64,
    pub category: RiskTolerance,
    pub allocation: AssetMix,
    pub confidence: f64,
}
