use axum::{
    extract::State,
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use finadvisor_core::domain::category::{Category, NewCategory};
use finadvisor_core::storage::categories;

use crate::error::{ApiError, ApiResult};
use crate::extract::{ApiJson, ApiPath};
use crate::routes::users::load_user;
use crate::AppState;

async fn create_category(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<NewCategory>,
) -> ApiResult<(StatusCode, Json<Category>)> {
    input.validate().map_err(ApiError::bad_request)?;
    let pool = state.pool()?;
    load_user(pool, input.user_id).await?;

    let category = categories::insert_category(pool, &input).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

async fn list_user_categories(
    State(state): State<AppState>,
    ApiPath(user_id): ApiPath<i64>,
) -> ApiResult<Json<Vec<Category>>> {
    let pool = state.pool()?;
    load_user(pool, user_id).await?;
    Ok(Json(categories::list_for_user(pool, user_id).await?))
}

async fn delete_category(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<StatusCode> {
    if !categories::delete_category(state.pool()?, id).await? {
        return Err(ApiError::not_found("category", id));
    }
    Ok(StatusCode::NO_CONTENT)
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/categories", post(create_category))
        .route("/categories/:id", delete(delete_category))
        .route("/users/:id/categories", get(list_user_categories))
}
