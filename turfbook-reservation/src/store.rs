use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use turfbook_catalog::grid::{generate_slots, TimeSlot};
use turfbook_catalog::turf::Turf;
use turfbook_core::booking::CustomerDetails;

/// Hold duration in seconds. The checkout countdown runs off the same
/// value so the visible timer and the hold expiry never drift apart.
pub const DEFAULT_HOLD_SECONDS: i64 = 300;

/// Cache entries for dates older than this are evicted during reads.
pub const DEFAULT_RETENTION_DAYS: i64 = 7;

/// Opaque token minted when a slot is held. Only the holder can confirm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HoldToken(Uuid);

impl HoldToken {
    fn mint() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for HoldToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Returned by `mark_pending`: the token to confirm with, and the
/// instant the hold lapses.
#[derive(Debug, Clone, Serialize)]
pub struct HoldGrant {
    pub token: HoldToken,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, thiserror::Error)]
pub enum HoldError {
    #[error("Slot not found: {0}")]
    SlotNotFound(String),

    #[error("Slot already held: {0}")]
    SlotAlreadyHeld(String),

    #[error("Slot already booked: {0}")]
    SlotAlreadyBooked(String),

    #[error("Slot is not held: {0}")]
    SlotNotHeld(String),

    #[error("Hold token does not match the active hold for slot {0}")]
    HoldTokenMismatch(String),
}

struct Hold {
    token: HoldToken,
    expires_at: DateTime<Utc>,
}

struct DayEntry {
    slots: Vec<TimeSlot>,
    /// Active holds keyed by slot id.
    holds: HashMap<String, Hold>,
    /// Payment reference recorded at confirmation, keyed by slot id.
    /// Drives idempotent re-confirmation.
    payment_refs: HashMap<String, Option<String>>,
}

impl DayEntry {
    fn new(slots: Vec<TimeSlot>) -> Self {
        Self {
            slots,
            holds: HashMap::new(),
            payment_refs: HashMap::new(),
        }
    }

    /// Lazy expiry sweep: lapsed holds revert to free. Runs before every
    /// read or transition; there is no background scheduler.
    fn sweep(&mut self, now: DateTime<Utc>) {
        for slot in &mut self.slots {
            if slot.is_pending {
                match slot.pending_until {
                    Some(expiry) if expiry < now => {
                        tracing::debug!(slot_id = %slot.id, "Hold expired, releasing slot");
                        slot.is_pending = false;
                        slot.pending_until = None;
                        self.holds.remove(&slot.id);
                    }
                    _ => {}
                }
            }
        }
        self.holds.retain(|_, hold| hold.expires_at >= now);
    }
}

/// The slot cache and reservation protocol. One instance owns all slot
/// state; no other component writes slot fields. Methods take an
/// explicit `now` so transitions and expiry are testable; the shared
/// `SlotCache` handle supplies wall-clock time.
pub struct SlotStore {
    hold_duration: Duration,
    retention: Duration,
    entries: HashMap<(String, String), DayEntry>,
}

impl SlotStore {
    pub fn new() -> Self {
        Self::with_rules(DEFAULT_HOLD_SECONDS, DEFAULT_RETENTION_DAYS)
    }

    pub fn with_rules(hold_seconds: i64, retention_days: i64) -> Self {
        Self {
            hold_duration: Duration::seconds(hold_seconds),
            retention: Duration::days(retention_days),
            entries: HashMap::new(),
        }
    }

    pub fn hold_duration(&self) -> Duration {
        self.hold_duration
    }

    /// Slots for a (date, sport) key. Materialized from the given turfs
    /// on first request, then served from cache so slot state survives
    /// repeated reads. The expiry sweep and retention eviction run
    /// before anything is returned.
    pub fn slots_for(
        &mut self,
        date: &str,
        sport_id: &str,
        turfs: &[Turf],
        now: DateTime<Utc>,
    ) -> Vec<TimeSlot> {
        self.evict_stale(now);

        let key = (date.to_string(), sport_id.to_string());
        let entry = self
            .entries
            .entry(key)
            .or_insert_with(|| DayEntry::new(generate_slots(date, sport_id, turfs)));
        entry.sweep(now);
        entry.slots.clone()
    }

    /// Free -> Pending. Compare-and-swap under the store lock: fails if
    /// the slot is not free at the moment of transition.
    pub fn mark_pending(
        &mut self,
        slot_id: &str,
        date: &str,
        sport_id: &str,
        now: DateTime<Utc>,
    ) -> Result<HoldGrant, HoldError> {
        let expires_at = now + self.hold_duration;
        let entry = self.entry_mut(date, sport_id, slot_id)?;
        entry.sweep(now);

        let slot = find_slot(&mut entry.slots, slot_id)?;
        if slot.is_booked {
            return Err(HoldError::SlotAlreadyBooked(slot_id.to_string()));
        }
        if slot.is_pending {
            return Err(HoldError::SlotAlreadyHeld(slot_id.to_string()));
        }

        slot.is_pending = true;
        slot.pending_until = Some(expires_at);

        let token = HoldToken::mint();
        entry.holds.insert(
            slot_id.to_string(),
            Hold { token, expires_at },
        );

        tracing::info!(%slot_id, %token, %expires_at, "Slot held");
        Ok(HoldGrant { token, expires_at })
    }

    /// Pending -> Booked. Requires the token minted by `mark_pending`;
    /// an expired or missing hold cannot be confirmed, so a second
    /// customer can never silently overwrite another's hold. Idempotent
    /// for an already-booked slot when the payment reference matches.
    pub fn confirm_booking(
        &mut self,
        slot_id: &str,
        date: &str,
        sport_id: &str,
        token: HoldToken,
        customer: CustomerDetails,
        payment_reference: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<(), HoldError> {
        let entry = self.entry_mut(date, sport_id, slot_id)?;
        entry.sweep(now);

        {
            let slot = find_slot(&mut entry.slots, slot_id)?;
            if slot.is_booked {
                let recorded = entry.payment_refs.get(slot_id);
                if recorded.map(|r| r.as_deref()) == Some(payment_reference) {
                    tracing::info!(%slot_id, "Slot already confirmed with same payment reference");
                    return Ok(());
                }
                return Err(HoldError::SlotAlreadyBooked(slot_id.to_string()));
            }
            if !slot.is_pending {
                return Err(HoldError::SlotNotHeld(slot_id.to_string()));
            }
        }

        match entry.holds.get(slot_id) {
            Some(hold) if hold.token == token => {}
            Some(_) => return Err(HoldError::HoldTokenMismatch(slot_id.to_string())),
            None => return Err(HoldError::SlotNotHeld(slot_id.to_string())),
        }

        let slot = find_slot(&mut entry.slots, slot_id)?;
        slot.is_booked = true;
        slot.is_pending = false;
        slot.pending_until = None;
        slot.customer_details = Some(customer);

        entry.holds.remove(slot_id);
        entry
            .payment_refs
            .insert(slot_id.to_string(), payment_reference.map(String::from));

        tracing::info!(%slot_id, "Slot confirmed");
        Ok(())
    }

    fn entry_mut(
        &mut self,
        date: &str,
        sport_id: &str,
        slot_id: &str,
    ) -> Result<&mut DayEntry, HoldError> {
        self.entries
            .get_mut(&(date.to_string(), sport_id.to_string()))
            .ok_or_else(|| HoldError::SlotNotFound(slot_id.to_string()))
    }

    /// Drop entries whose date fell out of the retention window.
    fn evict_stale(&mut self, now: DateTime<Utc>) {
        let cutoff = (now - self.retention).date_naive();
        self.entries.retain(|(date, _), _| {
            match NaiveDate::parse_from_str(date, "%Y-%m-%d") {
                Ok(d) => d >= cutoff,
                // Unparseable keys cannot age out meaningfully; keep them.
                Err(_) => true,
            }
        });
    }

    #[cfg(test)]
    pub(crate) fn entry_count(&self) -> usize {
        self.entries.len()
    }
}

impl Default for SlotStore {
    fn default() -> Self {
        Self::new()
    }
}

fn find_slot<'a>(slots: &'a mut [TimeSlot], slot_id: &str) -> Result<&'a mut TimeSlot, HoldError> {
    slots
        .iter_mut()
        .find(|s| s.id == slot_id)
        .ok_or_else(|| HoldError::SlotNotFound(slot_id.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn football_turf() -> Vec<Turf> {
        vec![Turf {
            id: "turf-1".to_string(),
            name: "Green Arena 5v5".to_string(),
            sport_id: "football".to_string(),
            turf_type: "5v5".to_string(),
            location: "HSR Layout, Bangalore".to_string(),
            price_per_hour: 1200,
            image: String::new(),
            amenities: vec![],
            is_active: true,
        }]
    }

    fn customer() -> CustomerDetails {
        CustomerDetails {
            name: "Rahul Sharma".to_string(),
            email: "rahul@example.com".to_string(),
            phone: "+91 98765-43210".to_string(),
        }
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 10, 0, 0).unwrap()
    }

    const DATE: &str = "2026-03-01";
    const SPORT: &str = "football";
    const SLOT: &str = "slot-turf-1-2026-03-01-18:00";

    fn store_with_slots() -> SlotStore {
        let mut store = SlotStore::new();
        let slots = store.slots_for(DATE, SPORT, &football_turf(), t0());
        assert_eq!(slots.len(), 18);
        store
    }

    #[test]
    fn test_cache_is_source_of_truth() {
        let mut store = store_with_slots();
        let grant = store.mark_pending(SLOT, DATE, SPORT, t0()).unwrap();
        assert_eq!(grant.expires_at, t0() + Duration::seconds(300));

        // Re-read with a different turf list: cached state wins, the
        // pending flag survives.
        let slots = store.slots_for(DATE, SPORT, &[], t0());
        assert_eq!(slots.len(), 18);
        let slot = slots.iter().find(|s| s.id == SLOT).unwrap();
        assert!(slot.is_pending);
        assert_eq!(slot.pending_until, Some(grant.expires_at));
    }

    #[test]
    fn test_double_hold_conflicts() {
        let mut store = store_with_slots();
        store.mark_pending(SLOT, DATE, SPORT, t0()).unwrap();
        let second = store.mark_pending(SLOT, DATE, SPORT, t0());
        assert!(matches!(second, Err(HoldError::SlotAlreadyHeld(_))));
    }

    #[test]
    fn test_hold_on_unknown_slot_fails() {
        let mut store = store_with_slots();
        let result = store.mark_pending("slot-nope", DATE, SPORT, t0());
        assert!(matches!(result, Err(HoldError::SlotNotFound(_))));

        // Key never materialized
        let result = store.mark_pending(SLOT, "2026-04-01", SPORT, t0());
        assert!(matches!(result, Err(HoldError::SlotNotFound(_))));
    }

    #[test]
    fn test_expired_hold_reads_free_on_next_read() {
        let mut store = store_with_slots();
        store.mark_pending(SLOT, DATE, SPORT, t0()).unwrap();

        // One second past the hold horizon
        let later = t0() + Duration::seconds(DEFAULT_HOLD_SECONDS + 1);
        let slots = store.slots_for(DATE, SPORT, &football_turf(), later);
        let slot = slots.iter().find(|s| s.id == SLOT).unwrap();
        assert!(slot.is_free());
        assert!(slot.pending_until.is_none());

        // And the slot is holdable again
        assert!(store.mark_pending(SLOT, DATE, SPORT, later).is_ok());
    }

    #[test]
    fn test_confirm_requires_hold_token() {
        let mut store = store_with_slots();

        // Confirming a free slot is rejected outright
        let free = store.confirm_booking(
            SLOT,
            DATE,
            SPORT,
            HoldToken::mint(),
            customer(),
            None,
            t0(),
        );
        assert!(matches!(free, Err(HoldError::SlotNotHeld(_))));

        // A foreign token cannot confirm someone else's hold
        store.mark_pending(SLOT, DATE, SPORT, t0()).unwrap();
        let foreign = store.confirm_booking(
            SLOT,
            DATE,
            SPORT,
            HoldToken::mint(),
            customer(),
            None,
            t0(),
        );
        assert!(matches!(foreign, Err(HoldError::HoldTokenMismatch(_))));
    }

    #[test]
    fn test_confirm_after_expiry_fails() {
        let mut store = store_with_slots();
        let grant = store.mark_pending(SLOT, DATE, SPORT, t0()).unwrap();

        let later = t0() + Duration::seconds(DEFAULT_HOLD_SECONDS + 1);
        let result =
            store.confirm_booking(SLOT, DATE, SPORT, grant.token, customer(), None, later);
        assert!(matches!(result, Err(HoldError::SlotNotHeld(_))));
    }

    #[test]
    fn test_confirm_transitions_and_invariants() {
        let mut store = store_with_slots();
        let grant = store.mark_pending(SLOT, DATE, SPORT, t0()).unwrap();
        store
            .confirm_booking(
                SLOT,
                DATE,
                SPORT,
                grant.token,
                customer(),
                Some("pay_123"),
                t0(),
            )
            .unwrap();

        let slots = store.slots_for(DATE, SPORT, &football_turf(), t0());
        for slot in &slots {
            // Never booked and pending at once
            assert!(!(slot.is_booked && slot.is_pending));
            // Booked implies customer details
            if slot.is_booked {
                assert!(slot.customer_details.is_some());
                assert!(slot.pending_until.is_none());
            }
        }
        let slot = slots.iter().find(|s| s.id == SLOT).unwrap();
        assert!(slot.is_booked);

        // No transition out of Booked: a new hold attempt fails
        let rehold = store.mark_pending(SLOT, DATE, SPORT, t0());
        assert!(matches!(rehold, Err(HoldError::SlotAlreadyBooked(_))));

        // Booked slots do not expire
        let much_later = t0() + Duration::days(1);
        let slots = store.slots_for(DATE, SPORT, &football_turf(), much_later);
        assert!(slots.iter().find(|s| s.id == SLOT).unwrap().is_booked);
    }

    #[test]
    fn test_confirm_is_idempotent_per_payment_reference() {
        let mut store = store_with_slots();
        let grant = store.mark_pending(SLOT, DATE, SPORT, t0()).unwrap();
        store
            .confirm_booking(
                SLOT,
                DATE,
                SPORT,
                grant.token,
                customer(),
                Some("pay_123"),
                t0(),
            )
            .unwrap();

        // Same reference: fine, even with a stale token
        let again = store.confirm_booking(
            SLOT,
            DATE,
            SPORT,
            grant.token,
            customer(),
            Some("pay_123"),
            t0(),
        );
        assert!(again.is_ok());

        // Different reference: a genuine double-booking attempt
        let other = store.confirm_booking(
            SLOT,
            DATE,
            SPORT,
            grant.token,
            customer(),
            Some("pay_999"),
            t0(),
        );
        assert!(matches!(other, Err(HoldError::SlotAlreadyBooked(_))));
    }

    #[test]
    fn test_stale_dates_are_evicted() {
        let mut store = store_with_slots();
        assert_eq!(store.entry_count(), 1);

        // Reading a much later date pushes 2026-03-01 past retention
        let later = t0() + Duration::days(DEFAULT_RETENTION_DAYS + 2);
        store.slots_for("2026-03-10", SPORT, &football_turf(), later);
        assert_eq!(store.entry_count(), 1);
    }
}
