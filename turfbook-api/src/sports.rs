use axum::{
    extract::{Path, State},
    routing::{get, put},
    Json, Router,
};

use crate::{error::AppError, state, state::AppState};
use turfbook_catalog::{Sport, SportUpdate};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/sports", get(list_sports))
        .route("/v1/sports/{id}", get(get_sport))
        .route("/v1/admin/sports/{id}", put(update_sport))
}

async fn list_sports(State(app): State<AppState>) -> Json<Vec<Sport>> {
    let sports = state::lock(&app.sports);
    Json(sports.list().into_iter().cloned().collect())
}

async fn get_sport(
    State(app): State<AppState>,
    Path(sport_id): Path<String>,
) -> Result<Json<Sport>, AppError> {
    let sports = state::lock(&app.sports);
    sports
        .get(&sport_id)
        .cloned()
        .map(Json)
        .ok_or_else(|| AppError::NotFoundError(format!("Sport not found: {sport_id}")))
}

async fn update_sport(
    State(app): State<AppState>,
    Path(sport_id): Path<String>,
    Json(update): Json<SportUpdate>,
) -> Result<Json<Sport>, AppError> {
    let mut sports = state::lock(&app.sports);
    let sport = sports
        .update(&sport_id, update)
        .map_err(|e| AppError::NotFoundError(e.to_string()))?;
    tracing::info!(%sport_id, "Sport updated");
    Ok(Json(sport.clone()))
}
