use axum::{
    extract::State,
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use finadvisor_core::advisor::{self, risk_profile, savings};
use finadvisor_core::domain::recommendation::{Advice, RecommendationSet, RiskProfile};
use serde::Serialize;

use crate::error::ApiResult;
use crate::extract::ApiPath;
use crate::routes::users::load_user;
use crate::AppState;

#[derive(Debug, Serialize)]
struct SavingsSummary {
    user_id: i64,
    monthly_savings: f64,
    window_months: u32,
    window_start: DateTime<Utc>,
}

async fn get_savings(
    State(state): State<AppState>,
    ApiPath(user_id): ApiPath<i64>,
) -> ApiResult<Json<SavingsSummary>> {
    let pool = state.pool()?;
    load_user(pool, user_id).await?;

    let now = Utc::now();
    let monthly_savings = advisor::monthly_savings(pool, user_id, now).await?;
    Ok(Json(SavingsSummary {
        user_id,
        monthly_savings,
        window_months: savings::WINDOW_MONTHS,
        window_start: savings::window_start(now),
    }))
}

async fn get_advice(
    State(state): State<AppState>,
    ApiPath(user_id): ApiPath<i64>,
) -> ApiResult<Json<Advice>> {
    let pool = state.pool()?;
    let user = load_user(pool, user_id).await?;
    Ok(Json(advisor::advice_for_user(pool, &user).await?))
}

async fn get_risk_profile(
    State(state): State<AppState>,
    ApiPath(user_id): ApiPath<i64>,
) -> ApiResult<Json<RiskProfile>> {
    let user = load_user(state.pool()?, user_id).await?;
    Ok(Json(risk_profile::assess(&user)))
}

async fn get_recommendations(
    State(state): State<AppState>,
    ApiPath(user_id): ApiPath<i64>,
) -> ApiResult<Json<RecommendationSet>> {
    let pool = state.pool()?;
    let user = load_user(pool, user_id).await?;
    let set = advisor::recommendations_for_user(pool, &state.market, &user).await?;
    Ok(Json(set))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users/:id/savings", get(get_savings))
        .route("/users/:id/advice", get(get_advice))
        .route("/users/:id/risk-profile", get(get_risk_profile))
        .route("/users/:id/recommendations", get(get_recommendations))
}
