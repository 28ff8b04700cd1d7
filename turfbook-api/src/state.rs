use std::sync::{Arc, Mutex, MutexGuard};

use turfbook_catalog::{SportRegistry, TurfCatalog};
use turfbook_core::ledger::TransactionLedger;
use turfbook_core::repository::BookingRepository;
use turfbook_reservation::SlotCache;

#[derive(Clone)]
pub struct AuthConfig {
    pub secret: String,
    pub expiration: u64,
}

#[derive(Clone)]
pub struct PaymentSettings {
    /// Server-held gateway key secret; signs and verifies payment proofs.
    pub gateway_key_secret: String,
    pub currency: String,
}

#[derive(Clone)]
pub struct AppState {
    pub sports: Arc<Mutex<SportRegistry>>,
    pub turfs: Arc<Mutex<TurfCatalog>>,
    pub slots: SlotCache,
    pub bookings: Arc<dyn BookingRepository>,
    pub ledger: Arc<Mutex<TransactionLedger>>,
    pub auth: AuthConfig,
    pub payment: PaymentSettings,
}

/// Lock a state mutex, recovering the guard if a handler panicked while
/// holding it.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}
