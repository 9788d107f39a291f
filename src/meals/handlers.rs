use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    routing::{delete, get, post},
    Json, Router,
};
use tracing::{info, instrument};

use super::dto::{
    DailySummary, DateQuery, MealHistoryResponse, MessageResponse, SaveMealRequest,
    SaveMealResponse,
};
use super::services;
use crate::{error::AppError, state::AppState};

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/meal-history", get(meal_history))
        .route("/daily-summary", get(daily_summary))
}

pub fn write_routes() -> Router<AppState> {
    Router::new()
        .route("/save-meal", post(save_meal))
        .route("/meal/:meal_id", delete(delete_meal))
}

/// POST /save-meal
#[instrument(skip(state, body))]
pub async fn save_meal(
    State(state): State<AppState>,
    body: Result<Json<SaveMealRequest>, JsonRejection>,
) -> Result<Json<SaveMealResponse>, AppError> {
    let Json(req) = body?;
    let meal_id = services::save_meal(&state.meals, req).await?;
    Ok(Json(SaveMealResponse {
        message: "Meal saved successfully".into(),
        meal_id,
    }))
}

/// GET /meal-history?date=YYYY-MM-DD
#[instrument(skip(state))]
pub async fn meal_history(
    State(state): State<AppState>,
    query: Result<Query<DateQuery>, QueryRejection>,
) -> Result<Json<MealHistoryResponse>, AppError> {
    let Query(q) = query?;
    let meals = state.meals.list(q.date().as_deref()).await;
    Ok(Json(MealHistoryResponse { meals }))
}

/// GET /daily-summary?date=YYYY-MM-DD (defaults to today)
#[instrument(skip(state))]
pub async fn daily_summary(
    State(state): State<AppState>,
    query: Result<Query<DateQuery>, QueryRejection>,
) -> Result<Json<DailySummary>, AppError> {
    let Query(q) = query?;
    Ok(Json(services::daily_summary(&state.meals, q.date()).await))
}

/// DELETE /meal/:meal_id
///
/// Reports success whether or not the id existed.
#[instrument(skip(state))]
pub async fn delete_meal(
    State(state): State<AppState>,
    id: Result<Path<u64>, PathRejection>,
) -> Result<Json<MessageResponse>, AppError> {
    let Path(meal_id) = id?;
    let removed = state.meals.remove(meal_id).await;
    info!(meal_id, removed, "meal deleted");
    Ok(Json(MessageResponse {
        message: "Meal deleted successfully".into(),
    }))
}
