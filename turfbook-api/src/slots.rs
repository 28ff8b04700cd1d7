use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::HeaderMap,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::{auth, bookings::BookingService, error::AppError, state, state::AppState};
use turfbook_catalog::grid::TimeSlot;
use turfbook_checkout::{BookingReceipt, CheckoutContext, ConfirmationFlow};
use turfbook_core::booking::CustomerDetails;
use turfbook_core::payment::{verify_payment_signature, PaymentProof, SignatureError};
use turfbook_reservation::HoldToken;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/slots", get(list_slots))
        .route("/v1/slots/hold", post(hold_slot))
        .route("/v1/slots/confirm", post(confirm_slot))
}

#[derive(Debug, Deserialize)]
struct SlotQuery {
    date: String,
    sport_id: String,
}

#[derive(Debug, Deserialize)]
struct HoldRequest {
    slot_id: String,
    date: String,
    sport_id: String,
}

#[derive(Debug, Serialize)]
struct HoldResponse {
    hold_token: HoldToken,
    expires_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct ConfirmSlotRequest {
    slot_id: String,
    date: String,
    sport_id: String,
    hold_token: HoldToken,
    customer: CustomerDetails,
    payment_proof: Option<PaymentProof>,
}

fn validate_date(date: &str) -> Result<(), AppError> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map(|_| ())
        .map_err(|_| AppError::ValidationError(format!("Invalid date: {date}")))
}

/// Read the slot grid for one day and sport. Expired holds are swept
/// before the grid is returned, so a lapsed slot reads back as free.
async fn list_slots(
    State(app): State<AppState>,
    Query(query): Query<SlotQuery>,
) -> Result<Json<Vec<TimeSlot>>, AppError> {
    validate_date(&query.date)?;
    let slots = grid_for(&app, &query.date, &query.sport_id)?;
    Ok(Json(slots))
}

async fn hold_slot(
    State(app): State<AppState>,
    Json(req): Json<HoldRequest>,
) -> Result<Json<HoldResponse>, AppError> {
    validate_date(&req.date)?;
    // Materialize the day's grid so a hold on a fresh date can land.
    grid_for(&app, &req.date, &req.sport_id)?;

    let grant = app
        .slots
        .mark_pending(&req.slot_id, &req.date, &req.sport_id)
        .map_err(AppError::from_hold)?;

    tracing::info!(slot_id = %req.slot_id, expires_at = %grant.expires_at, "Slot held");
    Ok(Json(HoldResponse {
        hold_token: grant.token,
        expires_at: grant.expires_at,
    }))
}

/// Confirm a held slot. The booking record is written first; the slot
/// flips to booked only after that write succeeds.
async fn confirm_slot(
    State(app): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<ConfirmSlotRequest>,
) -> Result<Json<BookingReceipt>, AppError> {
    validate_date(&req.date)?;
    req.customer
        .validate()
        .map_err(AppError::ValidationError)?;

    if let Some(proof) = &req.payment_proof {
        verify_payment_signature(proof, &app.payment.gateway_key_secret)
            .map_err(map_signature_error)?;
    }

    let identity = auth::caller_identity(&headers, &app.auth);
    let context = confirm_context(&app, &req)?;

    let backend = Arc::new(BookingService::new(
        app.bookings.clone(),
        app.payment.gateway_key_secret.clone(),
        identity,
    ));
    let flow = ConfirmationFlow::new(backend, app.slots.clone());

    let receipt = flow
        .confirm(&context, req.hold_token, &req.customer, req.payment_proof)
        .await
        .map_err(AppError::from_checkout)?;

    Ok(Json(receipt))
}

/// Bind the confirmation to its full selection context. All catalogue
/// lookups happen here, before any await point, so the registry locks
/// never cross one.
fn confirm_context(app: &AppState, req: &ConfirmSlotRequest) -> Result<CheckoutContext, AppError> {
    let slots = grid_for(app, &req.date, &req.sport_id)?;
    let slot = slots.iter().find(|s| s.id == req.slot_id);

    let sports = state::lock(&app.sports);
    let turfs = state::lock(&app.turfs);
    let sport = sports.get(&req.sport_id);
    let turf = slot.and_then(|s| turfs.get(&s.turf_id));

    CheckoutContext::try_from_selection(sport, turf, slot, Some(&req.date))
        .map_err(AppError::from_checkout)
}

fn grid_for(app: &AppState, date: &str, sport_id: &str) -> Result<Vec<TimeSlot>, AppError> {
    let active_turfs = {
        let sports = state::lock(&app.sports);
        if !sports.contains(sport_id) {
            return Err(AppError::ValidationError(format!(
                "Unknown sport: {sport_id}"
            )));
        }
        let turfs = state::lock(&app.turfs);
        turfs.active_for_sport(sport_id)
    };
    Ok(app.slots.slots_for(date, sport_id, &active_turfs))
}

fn map_signature_error(err: SignatureError) -> AppError {
    match err {
        SignatureError::Mismatch => AppError::SignatureMismatch,
        other => AppError::ValidationError(other.to_string()),
    }
}
