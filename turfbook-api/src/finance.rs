use axum::{extract::State, routing::get, Json, Router};
use serde::Deserialize;

use crate::{error::AppError, state, state::AppState};
use turfbook_core::ledger::{SportSummary, Transaction, TransactionKind};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/v1/admin/transactions",
            get(list_transactions).post(record_transaction),
        )
        .route("/v1/admin/finance/summary", get(finance_summary))
}

#[derive(Debug, Deserialize)]
struct NewTransaction {
    kind: TransactionKind,
    sport_id: String,
    amount: i64,
    description: String,
    date: String,
    category: String,
}

async fn list_transactions(State(app): State<AppState>) -> Json<Vec<Transaction>> {
    let ledger = state::lock(&app.ledger);
    Json(ledger.entries().to_vec())
}

async fn record_transaction(
    State(app): State<AppState>,
    Json(req): Json<NewTransaction>,
) -> Result<Json<Transaction>, AppError> {
    if req.amount <= 0 {
        return Err(AppError::ValidationError(
            "Transaction amount must be positive".to_string(),
        ));
    }
    {
        let sports = state::lock(&app.sports);
        if !sports.contains(&req.sport_id) {
            return Err(AppError::ValidationError(format!(
                "Unknown sport: {}",
                req.sport_id
            )));
        }
    }

    let mut ledger = state::lock(&app.ledger);
    let txn = ledger.record(
        req.kind,
        &req.sport_id,
        req.amount,
        &req.description,
        &req.date,
        &req.category,
    );
    tracing::info!(txn_id = %txn.id, sport_id = %req.sport_id, "Transaction recorded");
    Ok(Json(txn.clone()))
}

/// Income/expense/net per sport, the numbers behind the admin
/// accounting view.
async fn finance_summary(State(app): State<AppState>) -> Json<Vec<SportSummary>> {
    let ledger = state::lock(&app.ledger);
    Json(ledger.summarize())
}
