use crate::domain::recommendation::{AssetMix, RiskProfile};
use crate::domain::user::{RiskTolerance, User};

const BASE_CONFIDENCE: f64 = 0.6;
const FIELD_CONFIDENCE_BONUS: f64 = 0.1;

fn age_factor(age: Option<i32>) -> f64 {
    match age {
        None => 0.15,
        Some(a) if a < 30 => 0.3,
        Some(a) if a < 45 => 0.2,
        Some(a) if a < 60 => 0.1,
        Some(_) => 0.0,
    }
}

fn income_factor(annual_income: Option<f64>) -> f64 {
    match annual_income {
        Some(i) if i > 100_000.0 => 0.3,
        Some(i) if i > 50_000.0 => 0.2,
        _ => 0.1,
    }
}

fn tolerance_factor(tolerance: RiskTolerance) -> f64 {
    match tolerance {
        RiskTolerance::Aggressive => 0.4,
        RiskTolerance::Moderate => 0.25,
        RiskTolerance::Conservative => 0.1,
    }
}

pub fn category_for(score: f64) -> RiskTolerance {
    if score >= 0.7 {
        RiskTolerance::Aggressive
    } else if score >= 0.4 {
        RiskTolerance::Moderate
    } else {
        RiskTolerance::Conservative
    }
}

pub fn asset_mix(category: RiskTolerance) -> AssetMix {
    let (stocks, crypto, bonds, cash) = match category {
        RiskTolerance::Conservative => (30.0, 5.0, 50.0, 15.0),
        RiskTolerance::Moderate => (50.0, 15.0, 25.0, 10.0),
        RiskTolerance::Aggressive => (60.0, 30.0, 5.0, 5.0),
    };
    AssetMix {
        stocks,
        crypto,
        bonds,
        cash,
    }
}

pub fn assess(user: &User) -> RiskProfile {
    let score = (age_factor(user.age)
        + income_factor(user.annual_income)
        + tolerance_factor(user.effective_risk_tolerance()))
    .clamp(0.0, 1.0);
    let category = category_for(score);

    let populated = [
        user.age.is_some(),
        user.annual_income.is_some(),
        user.risk_tolerance.is_some(),
    ]
    .into_iter()
    .filter(|p| *p)
    .count();

    RiskProfile {
        user_id: user.id,
        score,
        category,
        allocation: asset_mix(category),
        confidence: BASE_CONFIDENCE + FIELD_CONFIDENCE_BONUS * populated as f64,
    }
}
