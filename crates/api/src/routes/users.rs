use axum::{
    extract::State,
    http::StatusCode,
    routing::get,
    Json, Router,
};
use finadvisor_core::domain::user::{NewUser, User, UserUpdate};
use finadvisor_core::storage::users;
use sqlx::SqlitePool;

use crate::error::{ApiError, ApiResult};
use crate::extract::{ApiJson, ApiPath};
use crate::AppState;

pub(crate) async fn load_user(pool: &SqlitePool, id: i64) -> ApiResult<User> {
    users::get_user(pool, id)
        .await?
        .ok_or_else(|| ApiError::not_found("user", id))
}

async fn create_user(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<NewUser>,
) -> ApiResult<(StatusCode, Json<User>)> {
    input.validate().map_err(ApiError::bad_request)?;
    let user = users::insert_user(state.pool()?, &input).await?;
    tracing::info!(user_id = user.id, "user created");
    Ok((StatusCode::CREATED, Json(user)))
}

async fn list_users(State(state): State<AppState>) -> ApiResult<Json<Vec<User>>> {
    Ok(Json(users::list_users(state.pool()?).await?))
}

async fn get_user(State(state): State<AppState>, ApiPath(id): ApiPath<i64>) -> ApiResult<Json<User>> {
    Ok(Json(load_user(state.pool()?, id).await?))
}

async fn update_user(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(update): ApiJson<UserUpdate>,
) -> ApiResult<Json<User>> {
    update.validate().map_err(ApiError::bad_request)?;
    let pool = state.pool()?;

    let mut user = load_user(pool, id).await?;
    update.apply_to(&mut user);

    let user = users::update_user(pool, &user)
        .await?
        .ok_or_else(|| ApiError::not_found("user", id))?;
    Ok(Json(user))
}

async fn delete_user(State(state): State<AppState>, ApiPath(id): ApiPath<i64>) -> ApiResult<StatusCode> {
    if !users::delete_user(state.pool()?, id).await? {
        return Err(ApiError::not_found("user", id));
    }
    tracing::info!(user_id = id, "user deleted");
    Ok(StatusCode::NO_CONTENT)
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route(
            "/users/:id",
            get(get_user).put(update_user).delete(delete_user),
        )
}
