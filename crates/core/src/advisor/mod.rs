//! Heuristic investment advice built from stored transactions and market quotes.

pub mod allocation;
pub mod risk_profile;
pub mod savings;

use crate::domain::recommendation::{Advice, RecommendationSet};
use crate::domain::user::User;
use crate::market::MarketDataSource;
use crate::storage::transactions;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

pub async fn monthly_savings(
    pool: &SqlitePool,
    user_id: i64,
    now: DateTime<Utc>,
) -> anyhow::Result<f64> {
    let recent =
        transactions::list_for_user_since(pool, user_id, savings::window_start(now)).await?;
    // Future-dated entries are not savings yet.
    let in_window: Vec<_> = recent.into_iter().filter(|t| t.occurred_at <= now).collect();
    Ok(savings::monthly_savings(&in_window))
}

pub async fn advice_for_user(pool: &SqlitePool, user: &User) -> anyhow::Result<Advice> {
    let savings = monthly_savings(pool, user.id, Utc::now()).await?;
    let advice = allocation::advice(user.id, user.effective_risk_tolerance(), savings);
    tracing::debug!(
        user_id = user.id,
        tolerance = %advice.risk_tolerance,
        monthly_savings = savings,
        "advice generated"
    );
    Ok(advice)
}

pub async fn recommendations_for_user(
    pool: &SqlitePool,
    market: &MarketDataSource,
    user: &User,
) -> anyhow::Result<RecommendationSet> {
    let now = Utc::now();
    let savings = monthly_savings(pool, user.id, now).await?;
    let snapshot = market.snapshot().await;
    let tolerance = user.effective_risk_tolerance();

    if snapshot.is_degraded() {
        tracing::info!(user_id = user.id, "recommendations built on fallback market data");
    }

    Ok(RecommendationSet {
        user_id: user.id,
        risk_tolerance: tolerance,
        monthly_savings: savings,
        generated_at: now,
        recommendations: allocation::recommendations(tolerance, savings, &snapshot),
        market: snapshot,
    })
}
