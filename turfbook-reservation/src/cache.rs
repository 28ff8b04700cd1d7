use chrono::Utc;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::store::{HoldError, HoldGrant, HoldToken, SlotStore};
use turfbook_catalog::grid::TimeSlot;
use turfbook_catalog::turf::Turf;
use turfbook_core::booking::CustomerDetails;

/// Shared handle over the slot store. The store is the only mutable
/// shared resource in the system; every access goes through this mutex,
/// which is what makes `mark_pending` a compare-and-swap. A
/// multi-instance deployment would replace this with a shared store
/// offering per-slot CAS.
#[derive(Clone)]
pub struct SlotCache {
    inner: Arc<Mutex<SlotStore>>,
}

impl SlotCache {
    pub fn new(store: SlotStore) -> Self {
        Self {
            inner: Arc::new(Mutex::new(store)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SlotStore> {
        // A poisoned lock means a panic mid-transition; the store's
        // per-entry state is still consistent enough to serve reads.
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    pub fn slots_for(&self, date: &str, sport_id: &str, turfs: &[Turf]) -> Vec<TimeSlot> {
        self.lock().slots_for(date, sport_id, turfs, Utc::now())
    }

    pub fn mark_pending(
        &self,
        slot_id: &str,
        date: &str,
        sport_id: &str,
    ) -> Result<HoldGrant, HoldError> {
        self.lock().mark_pending(slot_id, date, sport_id, Utc::now())
    }

    pub fn confirm_booking(
        &self,
        slot_id: &str,
        date: &str,
        sport_id: &str,
        token: HoldToken,
        customer: CustomerDetails,
        payment_reference: Option<&str>,
    ) -> Result<(), HoldError> {
        self.lock().confirm_booking(
            slot_id,
            date,
            sport_id,
            token,
            customer,
            payment_reference,
            Utc::now(),
        )
    }
}

impl Default for SlotCache {
    fn default() -> Self {
        Self::new(SlotStore::new())
    }
}
