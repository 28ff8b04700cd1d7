use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use turfbook_checkout::CheckoutError;
use turfbook_reservation::HoldError;

#[derive(Debug)]
pub enum AppError {
    AuthenticationError(String),
    ValidationError(String),
    NotFoundError(String),
    ConflictError(String),
    SignatureMismatch,
    InternalServerError(String),
    Anyhow(anyhow::Error),
}

impl AppError {
    /// Slot-state failures map to 409 except a missing slot, which is a
    /// plain 404.
    pub fn from_hold(err: HoldError) -> Self {
        match err {
            HoldError::SlotNotFound(id) => AppError::NotFoundError(format!("Slot not found: {id}")),
            other => AppError::ConflictError(other.to_string()),
        }
    }

    pub fn from_checkout(err: CheckoutError) -> Self {
        match err {
            CheckoutError::SlotConflict(hold) => AppError::from_hold(hold),
            CheckoutError::MissingContext(field) => {
                AppError::ValidationError(format!("Missing checkout context: {field}"))
            }
            CheckoutError::InvalidCustomer(msg) => AppError::ValidationError(msg),
            CheckoutError::SessionExpired => {
                AppError::ConflictError("Checkout session expired".to_string())
            }
            CheckoutError::GatewayFailed(msg) | CheckoutError::ConfirmationFailed(msg) => {
                AppError::InternalServerError(msg)
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::AuthenticationError(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFoundError(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::ConflictError(msg) => (StatusCode::CONFLICT, msg),
            AppError::SignatureMismatch => (
                StatusCode::BAD_REQUEST,
                "Payment signature verification failed".to_string(),
            ),
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error".to_string(),
                )
            }
            AppError::Anyhow(err) => {
                tracing::error!("Internal Server Error: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self::Anyhow(err.into())
    }
}
