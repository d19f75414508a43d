use crate::domain::recommendation::{Advice, Allocation, Recommendation, RiskLevel, Timeframe};
use crate::domain::user::RiskTolerance;
use crate::market::types::MarketSnapshot;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TierSlot {
    pub symbol: &'static str,
    pub percent: f64,
    pub confidence: f64,
    pub risk_level: RiskLevel,
    pub timeframe: Timeframe,
}

const fn slot(
    symbol: &'static str,
    percent: f64,
    confidence: f64,
    risk_level: RiskLevel,
    timeframe: Timeframe,
) -> TierSlot {
    TierSlot {
        symbol,
        percent,
        confidence,
        risk_level,
        timeframe,
    }
}

const CONSERVATIVE: [TierSlot; 2] = [
    slot("SPY", 70.0, 0.85, RiskLevel::Low, Timeframe::LongTerm),
    slot("BTC", 30.0, 0.60, RiskLevel::High, Timeframe::LongTerm),
];

const MODERATE: [TierSlot; 2] = [
    slot("SPY", 50.0, 0.80, RiskLevel::Medium, Timeframe::MediumTerm),
    slot("BTC", 50.0, 0.65, RiskLevel::High, Timeframe::MediumTerm),
];

const AGGRESSIVE: [TierSlot; 2] = [
    slot("SPY", 30.0, 0.75, RiskLevel::Medium, Timeframe::MediumTerm),
    slot("BTC", 70.0, 0.70, RiskLevel::High, Timeframe::ShortTerm),
];

pub fn tier_table(tolerance: RiskTolerance) -> &'static [TierSlot; 2] {
    match tolerance {
        RiskTolerance::Conservative => &CONSERVATIVE,
        RiskTolerance::Moderate => &MODERATE,
        RiskTolerance::Aggressive => &AGGRESSIVE,
    }
}

/// Savings that can actually be put to work. A monthly deficit invests nothing.
pub fn investable(monthly_savings: f64) -> f64 {
    monthly_savings.max(0.0)
}

pub fn advice(user_id: i64, tolerance: RiskTolerance, monthly_savings: f64) -> Advice {
    let funds = investable(monthly_savings);
    let allocations = tier_table(tolerance)
        .iter()
        .map(|s| Allocation {
            asset: s.symbol.to_string(),
            amount: funds * s.percent / 100.0,
            percent: s.percent,
        })
        .collect();

    Advice {
        user_id,
        risk_tolerance: tolerance,
        monthly_savings,
        allocations,
    }
}

pub fn recommendations(
    tolerance: RiskTolerance,
    monthly_savings: f64,
    market: &MarketSnapshot,
) -> Vec<Recommendation> {
    let funds = investable(monthly_savings);
    tier_table(tolerance)
        .iter()
        .map(|s| Recommendation {
            symbol: s.symbol.to_string(),
            percent: s.percent,
            amount: funds * s.percent / 100.0,
            current_price: market.price_of(s.symbol),
            confidence: s.confidence,
            risk_level: s.risk_level,
            timeframe: s.timeframe,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::types::{DataSource, StockQuote};
    use crate::market::{fallback_crypto, scoring};

    fn split(tolerance: RiskTolerance) -> Vec<(String, f64)> {
        advice(1, tolerance, 1000.0)
            .allocations
            .into_iter()
            .map(|a| (a.asset, a.percent))
            .collect()
    }

    #[test]
    fn every_tier_sums_to_one_hundred() {
        for t in RiskTolerance::ALL {
            let total: f64 = tier_table(t).iter().map(|s| s.percent).sum();
            assert_eq!(total, 100.0, "{t}");
        }
    }

    #[test]
    fn splits_follow_the_tolerance() {
        assert_eq!(
            split(RiskTolerance::Conservative),
            vec![("SPY".to_string(), 70.0), ("BTC".to_string(), 30.0)]
        );
        assert_eq!(
            split(RiskTolerance::Aggressive),
            vec![("SPY".to_string(), 30.0), ("BTC".to_string(), 70.0)]
        );
        assert_eq!(
            split(RiskTolerance::from_tag("whatever")),
            vec![("SPY".to_string(), 50.0), ("BTC".to_string(), 50.0)]
        );
    }

    #[test]
    fn amounts_are_savings_times_percent() {
        let a = advice(9, RiskTolerance::Conservative, 2000.0);
        assert_eq!(a.allocations[0].amount, 1400.0);
        assert_eq!(a.allocations[1].amount, 600.0);
        assert_eq!(a.monthly_savings, 2000.0);
    }

    #[test]
    fn deficit_reports_savings_but_invests_nothing() {
        let a = advice(9, RiskTolerance::Aggressive, -150.0);
        assert_eq!(a.monthly_savings, -150.0);
        assert!(a.allocations.iter().all(|x| x.amount == 0.0));
        let total: f64 = a.allocations.iter().map(|x| x.percent).sum();
        assert_eq!(total, 100.0);
    }

    #[test]
    fn recommendations_carry_prices_and_labels() {
        let crypto = fallback_crypto();
        let stocks = vec![StockQuote {
            symbol: "SPY".into(),
            price: 512.0,
            change_percent: 0.4,
            volume: None,
        }];
        let market = MarketSnapshot {
            fetched_at: chrono::Utc::now(),
            scores: scoring::score(&crypto, &stocks),
            crypto,
            stocks,
            crypto_source: DataSource::Fallback,
            stock_source: DataSource::Live,
            fallback_symbols: Vec::new(),
        };

        let recs = recommendations(RiskTolerance::Conservative, 300.0, &market);
        assert_eq!(recs.len(), 2);
        assert_eq!(recs[0].current_price, Some(512.0));
        assert_eq!(recs[0].risk_level, RiskLevel::Low);
        assert_eq!(recs[1].current_price, Some(45_000.0));
        assert_eq!(recs[1].amount, 90.0);
        assert_eq!(recs[1].timeframe, Timeframe::LongTerm);
    }
}
