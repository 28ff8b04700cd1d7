use std::sync::Arc;

use async_trait::async_trait;
use axum::{extract::State, http::HeaderMap, routing::post, Json, Router};

use crate::{auth, error::AppError, state::AppState};
use turfbook_checkout::{BookingBackend, BookingReceipt, CreateBookingRequest};
use turfbook_core::booking::{BookingRecord, NewBooking};
use turfbook_core::identity::CallerIdentity;
use turfbook_core::payment::{verify_payment_signature, SignatureError};
use turfbook_core::repository::BookingRepository;

pub fn routes() -> Router<AppState> {
    Router::new().route("/v1/bookings", post(create_booking).get(list_bookings))
}

#[derive(Debug, thiserror::Error)]
pub enum BookingServiceError {
    #[error("Invalid customer details: {0}")]
    InvalidCustomer(String),

    #[error(transparent)]
    Signature(#[from] SignatureError),

    #[error("Booking persistence failed: {0}")]
    Persistence(String),
}

/// The trust boundary for booking creation. Everything a client sends
/// is re-checked here: customer details are validated, the payment
/// signature is recomputed with the server-held secret, and the caller
/// identity comes from the verified token, never the request body.
pub struct BookingService {
    repo: Arc<dyn BookingRepository>,
    gateway_key_secret: String,
    identity: CallerIdentity,
}

impl BookingService {
    pub fn new(
        repo: Arc<dyn BookingRepository>,
        gateway_key_secret: String,
        identity: CallerIdentity,
    ) -> Self {
        Self {
            repo,
            gateway_key_secret,
            identity,
        }
    }

    pub async fn create(
        &self,
        req: CreateBookingRequest,
    ) -> Result<BookingReceipt, BookingServiceError> {
        req.customer
            .validate()
            .map_err(BookingServiceError::InvalidCustomer)?;

        let payment_reference = match &req.payment_proof {
            Some(proof) => {
                verify_payment_signature(proof, &self.gateway_key_secret)?;

                // One payment, one booking: a repeat of the same
                // reference returns the record already written.
                let existing = self
                    .repo
                    .find_by_payment_reference(&proof.payment_id)
                    .await
                    .map_err(|e| BookingServiceError::Persistence(e.to_string()))?;
                if let Some(existing) = existing {
                    tracing::info!(
                        booking_id = %existing.id,
                        payment_id = %proof.payment_id,
                        "Duplicate confirmation, returning existing booking"
                    );
                    return Ok(BookingReceipt {
                        success: true,
                        booking_id: existing.id,
                    });
                }
                Some(proof.payment_id.clone())
            }
            None => None,
        };

        let new_booking = NewBooking {
            slot_id: req.slot_id,
            turf_id: req.turf_id,
            date: req.date,
            customer: req.customer,
            payment_reference,
            user_id: self.identity.user_id.clone(),
        };

        let booking_id = self
            .repo
            .create_booking(&new_booking)
            .await
            .map_err(|e| BookingServiceError::Persistence(e.to_string()))?;

        Ok(BookingReceipt {
            success: true,
            booking_id,
        })
    }
}

#[async_trait]
impl BookingBackend for BookingService {
    async fn create_booking(
        &self,
        request: CreateBookingRequest,
    ) -> Result<BookingReceipt, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self.create(request).await?)
    }
}

async fn create_booking(
    State(app): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<CreateBookingRequest>,
) -> Result<Json<BookingReceipt>, AppError> {
    let identity = auth::caller_identity(&headers, &app.auth);
    let service = BookingService::new(
        app.bookings.clone(),
        app.payment.gateway_key_secret.clone(),
        identity,
    );
    let receipt = service.create(req).await.map_err(map_service_error)?;
    Ok(Json(receipt))
}

async fn list_bookings(
    State(app): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<BookingRecord>>, AppError> {
    let identity = auth::caller_identity(&headers, &app.auth);
    let bookings = app
        .bookings
        .list_bookings(&identity.user_id)
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))?;
    Ok(Json(bookings))
}

fn map_service_error(err: BookingServiceError) -> AppError {
    match err {
        BookingServiceError::InvalidCustomer(msg) => AppError::ValidationError(msg),
        BookingServiceError::Signature(SignatureError::Mismatch) => AppError::SignatureMismatch,
        BookingServiceError::Signature(other) => AppError::ValidationError(other.to_string()),
        BookingServiceError::Persistence(msg) => AppError::InternalServerError(msg),
    }
}
