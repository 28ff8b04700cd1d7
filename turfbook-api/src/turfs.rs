use axum::{
    extract::{Path, Query, State},
    routing::{get, post, put},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use crate::{error::AppError, state, state::AppState};
use turfbook_catalog::{NewTurf, Turf, TurfError, TurfUpdate};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/turfs", get(list_turfs))
        .route("/v1/turfs/{id}", get(get_turf))
        .route("/v1/admin/turfs", post(create_turf))
        .route("/v1/admin/turfs/{id}", put(update_turf).delete(remove_turf))
}

#[derive(Debug, Deserialize)]
struct TurfQuery {
    sport_id: Option<String>,
}

async fn list_turfs(
    State(app): State<AppState>,
    Query(query): Query<TurfQuery>,
) -> Json<Vec<Turf>> {
    let turfs = state::lock(&app.turfs);
    let listed = match query.sport_id {
        Some(sport_id) => turfs.list_for_sport(&sport_id).into_iter().cloned().collect(),
        None => turfs.list().to_vec(),
    };
    Json(listed)
}

async fn get_turf(
    State(app): State<AppState>,
    Path(turf_id): Path<String>,
) -> Result<Json<Turf>, AppError> {
    let turfs = state::lock(&app.turfs);
    turfs
        .get(&turf_id)
        .cloned()
        .map(Json)
        .ok_or_else(|| AppError::NotFoundError(format!("Turf not found: {turf_id}")))
}

async fn create_turf(
    State(app): State<AppState>,
    Json(new_turf): Json<NewTurf>,
) -> Result<Json<Turf>, AppError> {
    let sports = state::lock(&app.sports);
    let mut turfs = state::lock(&app.turfs);
    let turf = turfs.create(new_turf, &sports).map_err(map_turf_error)?;
    tracing::info!(turf_id = %turf.id, "Turf created");
    Ok(Json(turf.clone()))
}

async fn update_turf(
    State(app): State<AppState>,
    Path(turf_id): Path<String>,
    Json(update): Json<TurfUpdate>,
) -> Result<Json<Turf>, AppError> {
    let mut turfs = state::lock(&app.turfs);
    let turf = turfs.update(&turf_id, update).map_err(map_turf_error)?;
    tracing::info!(%turf_id, "Turf updated");
    Ok(Json(turf.clone()))
}

async fn remove_turf(
    State(app): State<AppState>,
    Path(turf_id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let mut turfs = state::lock(&app.turfs);
    let removed = turfs.remove(&turf_id).map_err(map_turf_error)?;
    tracing::info!(%turf_id, name = %removed.name, "Turf removed");
    Ok(Json(json!({ "removed": removed.id })))
}

fn map_turf_error(err: TurfError) -> AppError {
    match err {
        TurfError::NotFound(_) => AppError::NotFoundError(err.to_string()),
        TurfError::UnknownSport(_) => AppError::ValidationError(err.to_string()),
    }
}
