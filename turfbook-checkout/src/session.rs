use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use turfbook_catalog::grid::TimeSlot;
use turfbook_catalog::sport::Sport;
use turfbook_catalog::turf::Turf;
use turfbook_core::booking::CustomerDetails;
use turfbook_core::payment::{GatewayCheckout, GatewayPrefill};
use turfbook_reservation::{HoldError, HoldGrant};

#[derive(Debug, thiserror::Error)]
pub enum CheckoutError {
    #[error("Missing checkout context: {0}")]
    MissingContext(&'static str),

    #[error("Invalid customer details: {0}")]
    InvalidCustomer(String),

    #[error("Checkout session expired")]
    SessionExpired,

    #[error("Payment gateway failed: {0}")]
    GatewayFailed(String),

    #[error("Booking confirmation failed: {0}")]
    ConfirmationFailed(String),

    #[error(transparent)]
    SlotConflict(#[from] HoldError),
}

/// Everything a checkout session is bound to. Built from the selection
/// flow; any missing piece sends the caller back to slot selection.
#[derive(Debug, Clone, Serialize)]
pub struct CheckoutContext {
    pub sport_id: String,
    pub sport_name: String,
    pub turf_id: String,
    pub turf_name: String,
    pub slot_id: String,
    pub date: String,
    pub start_time: String,
    pub end_time: String,
    /// Slot price in whole currency units.
    pub price: i64,
}

impl CheckoutContext {
    /// Assemble the context from the selection state. This is the
    /// non-negotiable entry guard: no sport, turf, slot or date means
    /// no checkout.
    pub fn try_from_selection(
        sport: Option<&Sport>,
        turf: Option<&Turf>,
        slot: Option<&TimeSlot>,
        date: Option<&str>,
    ) -> Result<Self, CheckoutError> {
        let sport = sport.ok_or(CheckoutError::MissingContext("sport"))?;
        let turf = turf.ok_or(CheckoutError::MissingContext("turf"))?;
        let slot = slot.ok_or(CheckoutError::MissingContext("slot"))?;
        let date = date.ok_or(CheckoutError::MissingContext("date"))?;

        Ok(Self {
            sport_id: sport.id.clone(),
            sport_name: sport.name.clone(),
            turf_id: turf.id.clone(),
            turf_name: turf.name.clone(),
            slot_id: slot.id.clone(),
            date: date.to_string(),
            start_time: slot.start_time.clone(),
            end_time: slot.end_time.clone(),
            price: slot.price,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", tag = "state")]
pub enum SessionState {
    AwaitingPayment,
    Completed { booking_id: Uuid },
    Abandoned,
}

/// A bounded-time payment attempt bound to one held slot. The deadline
/// is the hold's expiry instant, so the visible countdown and the
/// cache-side hold lapse together.
#[derive(Debug)]
pub struct CheckoutSession {
    pub context: CheckoutContext,
    pub hold: HoldGrant,
    state: SessionState,
    attempts: u32,
}

impl CheckoutSession {
    pub fn new(context: CheckoutContext, hold: HoldGrant) -> Self {
        Self {
            context,
            hold,
            state: SessionState::AwaitingPayment,
            attempts: 0,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Seconds left on the countdown, clamped at zero.
    pub fn remaining_seconds(&self, now: DateTime<Utc>) -> i64 {
        (self.hold.expires_at - now).num_seconds().max(0)
    }

    /// Countdown tick. At zero the session is abandoned: the user goes
    /// back to slot selection and the hold lapses via the cache sweep;
    /// nothing is proactively released.
    pub fn check_expired(&mut self, now: DateTime<Utc>) -> bool {
        if self.state == SessionState::AwaitingPayment && now >= self.hold.expires_at {
            tracing::info!(slot_id = %self.context.slot_id, "Checkout session expired");
            self.state = SessionState::Abandoned;
        }
        self.state == SessionState::Abandoned
    }

    pub(crate) fn record_attempt(&mut self) {
        self.attempts += 1;
    }

    pub(crate) fn complete(&mut self, booking_id: Uuid) {
        self.state = SessionState::Completed { booking_id };
    }

    /// The gateway invocation payload: amount in minor currency units,
    /// display strings, and the customer prefill.
    pub fn gateway_checkout(&self, customer: &CustomerDetails) -> GatewayCheckout {
        GatewayCheckout {
            amount_minor: self.context.price * 100,
            currency: "INR".to_string(),
            name: self.context.turf_name.clone(),
            description: format!(
                "{} | {} {}-{}",
                self.context.sport_name,
                self.context.date,
                self.context.start_time,
                self.context.end_time
            ),
            prefill: GatewayPrefill {
                name: customer.name.clone(),
                email: customer.email.clone(),
                contact: customer.phone.clone(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use turfbook_reservation::{HoldGrant, SlotStore};

    fn context() -> CheckoutContext {
        CheckoutContext {
            sport_id: "football".to_string(),
            sport_name: "Football".to_string(),
            turf_id: "turf-1".to_string(),
            turf_name: "Green Arena 5v5".to_string(),
            slot_id: "slot-turf-1-2026-03-01-18:00".to_string(),
            date: "2026-03-01".to_string(),
            start_time: "18:00".to_string(),
            end_time: "19:00".to_string(),
            price: 1200,
        }
    }

    fn grant_at(now: DateTime<Utc>) -> HoldGrant {
        let mut store = SlotStore::new();
        let turf = Turf {
            id: "turf-1".to_string(),
            name: "Green Arena 5v5".to_string(),
            sport_id: "football".to_string(),
            turf_type: "5v5".to_string(),
            location: String::new(),
            price_per_hour: 1200,
            image: String::new(),
            amenities: vec![],
            is_active: true,
        };
        store.slots_for("2026-03-01", "football", &[turf], now);
        store
            .mark_pending("slot-turf-1-2026-03-01-18:00", "2026-03-01", "football", now)
            .unwrap()
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 10, 0, 0).unwrap()
    }

    #[test]
    fn test_missing_context_is_rejected() {
        let sport = Sport {
            id: "football".to_string(),
            name: "Football".to_string(),
            icon: String::new(),
            accent_color: String::new(),
            dark_background: String::new(),
            description: String::new(),
            starting_price: 1200,
            available_turfs: 1,
            default_duration: 60,
            is_active: true,
        };
        let result =
            CheckoutContext::try_from_selection(Some(&sport), None, None, Some("2026-03-01"));
        assert!(matches!(result, Err(CheckoutError::MissingContext("turf"))));
    }

    #[test]
    fn test_countdown_tracks_hold_expiry() {
        let session = CheckoutSession::new(context(), grant_at(t0()));
        assert_eq!(session.remaining_seconds(t0()), 300);
        assert_eq!(
            session.remaining_seconds(t0() + Duration::seconds(120)),
            180
        );
        assert_eq!(
            session.remaining_seconds(t0() + Duration::seconds(400)),
            0
        );
    }

    #[test]
    fn test_expiry_abandons_session() {
        let mut session = CheckoutSession::new(context(), grant_at(t0()));
        assert!(!session.check_expired(t0() + Duration::seconds(299)));
        assert_eq!(session.state(), &SessionState::AwaitingPayment);

        assert!(session.check_expired(t0() + Duration::seconds(300)));
        assert_eq!(session.state(), &SessionState::Abandoned);

        // No further ticks change anything
        assert!(session.check_expired(t0() + Duration::seconds(301)));
        assert_eq!(session.state(), &SessionState::Abandoned);
    }

    #[test]
    fn test_gateway_checkout_uses_minor_units() {
        let session = CheckoutSession::new(context(), grant_at(t0()));
        let customer = CustomerDetails {
            name: "Rahul Sharma".to_string(),
            email: "rahul@example.com".to_string(),
            phone: "+91 98765-43210".to_string(),
        };
        let checkout = session.gateway_checkout(&customer);
        assert_eq!(checkout.amount_minor, 120_000);
        assert_eq!(checkout.currency, "INR");
        assert_eq!(checkout.prefill.email, "rahul@example.com");
    }
}
