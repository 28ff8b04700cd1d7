use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::session::{CheckoutContext, CheckoutError, CheckoutSession};
use turfbook_core::booking::CustomerDetails;
use turfbook_core::payment::{
    sign_payment, GatewayCheckout, GatewayOutcome, PaymentGateway, PaymentProof,
};
use turfbook_reservation::{HoldToken, SlotCache};

/// Wire request for the booking confirmation call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBookingRequest {
    pub slot_id: String,
    pub turf_id: String,
    pub date: String,
    pub customer: CustomerDetails,
    pub payment_proof: Option<PaymentProof>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingReceipt {
    pub success: bool,
    pub booking_id: Uuid,
}

/// Seam to the booking confirmation endpoint: signature verification and
/// persistence happen behind it. It is the single source of truth for
/// whether a booking exists.
#[async_trait]
pub trait BookingBackend: Send + Sync {
    async fn create_booking(
        &self,
        request: CreateBookingRequest,
    ) -> Result<BookingReceipt, Box<dyn std::error::Error + Send + Sync>>;
}

/// Remote-first confirmation: the backend call must succeed before any
/// local slot state changes. A backend failure leaves the hold intact
/// and surfaces a retryable error, never a false "confirmed".
pub struct ConfirmationFlow {
    backend: Arc<dyn BookingBackend>,
    slots: SlotCache,
}

impl ConfirmationFlow {
    pub fn new(backend: Arc<dyn BookingBackend>, slots: SlotCache) -> Self {
        Self { backend, slots }
    }

    pub async fn confirm(
        &self,
        context: &CheckoutContext,
        token: HoldToken,
        customer: &CustomerDetails,
        proof: Option<PaymentProof>,
    ) -> Result<BookingReceipt, CheckoutError> {
        let receipt = self
            .backend
            .create_booking(CreateBookingRequest {
                slot_id: context.slot_id.clone(),
                turf_id: context.turf_id.clone(),
                date: context.date.clone(),
                customer: customer.clone(),
                payment_proof: proof.clone(),
            })
            .await
            .map_err(|e| CheckoutError::ConfirmationFailed(e.to_string()))?;

        // The remote record exists; now reflect it in the slot cache.
        self.slots.confirm_booking(
            &context.slot_id,
            &context.date,
            &context.sport_id,
            token,
            customer.clone(),
            proof.as_ref().map(|p| p.payment_id.as_str()),
        )?;

        Ok(receipt)
    }
}

#[derive(Debug)]
pub enum CheckoutOutcome {
    Confirmed(BookingReceipt),
    /// The customer closed the gateway widget; the session stays open
    /// and retryable.
    Dismissed,
}

/// Drives one checkout session: validates the form, enforces the
/// countdown, hands off to the gateway and runs the confirmation flow
/// on success.
pub struct CheckoutOrchestrator {
    gateway: Arc<dyn PaymentGateway>,
    flow: ConfirmationFlow,
}

impl CheckoutOrchestrator {
    pub fn new(gateway: Arc<dyn PaymentGateway>, flow: ConfirmationFlow) -> Self {
        Self { gateway, flow }
    }

    pub async fn attempt_payment(
        &self,
        session: &mut CheckoutSession,
        customer: &CustomerDetails,
        now: DateTime<Utc>,
    ) -> Result<CheckoutOutcome, CheckoutError> {
        customer
            .validate()
            .map_err(CheckoutError::InvalidCustomer)?;

        if let crate::session::SessionState::Completed { booking_id } = session.state() {
            // Repeat submits after success are a no-op.
            return Ok(CheckoutOutcome::Confirmed(BookingReceipt {
                success: true,
                booking_id: *booking_id,
            }));
        }

        if session.check_expired(now) {
            return Err(CheckoutError::SessionExpired);
        }

        session.record_attempt();
        let checkout = session.gateway_checkout(customer);

        match self
            .gateway
            .collect(&checkout)
            .await
            .map_err(|e| CheckoutError::GatewayFailed(e.to_string()))?
        {
            GatewayOutcome::Dismissed => {
                tracing::info!(slot_id = %session.context.slot_id, "Gateway dismissed, session retryable");
                Ok(CheckoutOutcome::Dismissed)
            }
            GatewayOutcome::Completed(proof) => {
                let receipt = self
                    .flow
                    .confirm(&session.context, session.hold.token, customer, Some(proof))
                    .await?;
                session.complete(receipt.booking_id);
                Ok(CheckoutOutcome::Confirmed(receipt))
            }
        }
    }
}

/// Gateway stand-in for tests and local runs.
pub struct MockGateway {
    behavior: MockBehavior,
}

pub enum MockBehavior {
    /// Produce a correctly signed proof with the given secret.
    Approve { secret: String },
    Dismiss,
    Fail,
}

impl MockGateway {
    pub fn approving(secret: &str) -> Self {
        Self {
            behavior: MockBehavior::Approve {
                secret: secret.to_string(),
            },
        }
    }

    pub fn dismissing() -> Self {
        Self {
            behavior: MockBehavior::Dismiss,
        }
    }

    pub fn failing() -> Self {
        Self {
            behavior: MockBehavior::Fail,
        }
    }
}

#[async_trait]
impl PaymentGateway for MockGateway {
    async fn collect(
        &self,
        _checkout: &GatewayCheckout,
    ) -> Result<GatewayOutcome, Box<dyn std::error::Error + Send + Sync>> {
        match &self.behavior {
            MockBehavior::Approve { secret } => {
                let order_id = format!("order_{}", Uuid::new_v4().simple());
                let payment_id = format!("pay_{}", Uuid::new_v4().simple());
                let signature = sign_payment(&order_id, &payment_id, secret);
                Ok(GatewayOutcome::Completed(PaymentProof {
                    payment_id,
                    order_id,
                    signature,
                }))
            }
            MockBehavior::Dismiss => Ok(GatewayOutcome::Dismissed),
            MockBehavior::Fail => Err("Simulated gateway outage".into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use std::sync::Mutex;
    use turfbook_catalog::turf::Turf;
    use turfbook_reservation::{SlotCache, SlotStore};

    const SPORT: &str = "football";

    // The cache handle runs on wall-clock time, so use a live date to
    // stay inside the retention window.
    fn date() -> String {
        Utc::now().date_naive().format("%Y-%m-%d").to_string()
    }

    fn slot_id() -> String {
        format!("slot-turf-1-{}-18:00", date())
    }

    struct RecordingBackend {
        calls: Mutex<Vec<CreateBookingRequest>>,
        fail: bool,
    }

    impl RecordingBackend {
        fn new(fail: bool) -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                fail,
            }
        }
    }

    #[async_trait]
    impl BookingBackend for RecordingBackend {
        async fn create_booking(
            &self,
            request: CreateBookingRequest,
        ) -> Result<BookingReceipt, Box<dyn std::error::Error + Send + Sync>> {
            if self.fail {
                return Err("store unavailable".into());
            }
            self.calls.lock().unwrap().push(request);
            Ok(BookingReceipt {
                success: true,
                booking_id: Uuid::new_v4(),
            })
        }
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 10, 0, 0).unwrap()
    }

    fn turf() -> Turf {
        Turf {
            id: "turf-1".to_string(),
            name: "Green Arena 5v5".to_string(),
            sport_id: SPORT.to_string(),
            turf_type: "5v5".to_string(),
            location: String::new(),
            price_per_hour: 1200,
            image: String::new(),
            amenities: vec![],
            is_active: true,
        }
    }

    fn customer() -> CustomerDetails {
        CustomerDetails {
            name: "Rahul Sharma".to_string(),
            email: "rahul@example.com".to_string(),
            phone: "+91 98765-43210".to_string(),
        }
    }

    fn context() -> CheckoutContext {
        CheckoutContext {
            sport_id: SPORT.to_string(),
            sport_name: "Football".to_string(),
            turf_id: "turf-1".to_string(),
            turf_name: "Green Arena 5v5".to_string(),
            slot_id: slot_id(),
            date: date(),
            start_time: "18:00".to_string(),
            end_time: "19:00".to_string(),
            price: 1200,
        }
    }

    /// Cache with the grid materialized and the checkout slot held.
    fn held_session(cache: &SlotCache) -> CheckoutSession {
        cache.slots_for(&date(), SPORT, &[turf()]);
        let grant = cache.mark_pending(&slot_id(), &date(), SPORT).unwrap();
        CheckoutSession::new(context(), grant)
    }

    #[tokio::test]
    async fn test_successful_checkout_books_slot() {
        let cache = SlotCache::new(SlotStore::new());
        let mut session = held_session(&cache);
        let backend = Arc::new(RecordingBackend::new(false));

        let orchestrator = CheckoutOrchestrator::new(
            Arc::new(MockGateway::approving("secret")),
            ConfirmationFlow::new(backend.clone(), cache.clone()),
        );

        let outcome = orchestrator
            .attempt_payment(&mut session, &customer(), Utc::now())
            .await
            .unwrap();
        assert!(matches!(outcome, CheckoutOutcome::Confirmed(_)));
        assert_eq!(backend.calls.lock().unwrap().len(), 1);

        let slots = cache.slots_for(&date(), SPORT, &[turf()]);
        let slot = slots.iter().find(|s| s.id == slot_id()).unwrap();
        assert!(slot.is_booked);
        assert!(slot.customer_details.is_some());
    }

    #[tokio::test]
    async fn test_backend_failure_leaves_hold_intact() {
        let cache = SlotCache::new(SlotStore::new());
        let mut session = held_session(&cache);

        let orchestrator = CheckoutOrchestrator::new(
            Arc::new(MockGateway::approving("secret")),
            ConfirmationFlow::new(Arc::new(RecordingBackend::new(true)), cache.clone()),
        );

        let result = orchestrator
            .attempt_payment(&mut session, &customer(), Utc::now())
            .await;
        assert!(matches!(result, Err(CheckoutError::ConfirmationFailed(_))));

        // Not confirmed locally: the remote call is authoritative
        let slots = cache.slots_for(&date(), SPORT, &[turf()]);
        let slot = slots.iter().find(|s| s.id == slot_id()).unwrap();
        assert!(!slot.is_booked);
        assert!(slot.is_pending);
    }

    #[tokio::test]
    async fn test_dismissal_is_retryable() {
        let cache = SlotCache::new(SlotStore::new());
        let mut session = held_session(&cache);
        let backend = Arc::new(RecordingBackend::new(false));

        let dismissing = CheckoutOrchestrator::new(
            Arc::new(MockGateway::dismissing()),
            ConfirmationFlow::new(backend.clone(), cache.clone()),
        );
        let outcome = dismissing
            .attempt_payment(&mut session, &customer(), Utc::now())
            .await
            .unwrap();
        assert!(matches!(outcome, CheckoutOutcome::Dismissed));
        assert_eq!(backend.calls.lock().unwrap().len(), 0);

        // Same session retries successfully
        let approving = CheckoutOrchestrator::new(
            Arc::new(MockGateway::approving("secret")),
            ConfirmationFlow::new(backend.clone(), cache.clone()),
        );
        let outcome = approving
            .attempt_payment(&mut session, &customer(), Utc::now())
            .await
            .unwrap();
        assert!(matches!(outcome, CheckoutOutcome::Confirmed(_)));
        assert_eq!(session.attempts(), 2);
    }

    #[tokio::test]
    async fn test_expired_session_cannot_pay() {
        let cache = SlotCache::new(SlotStore::new());
        let mut session = held_session(&cache);

        let orchestrator = CheckoutOrchestrator::new(
            Arc::new(MockGateway::approving("secret")),
            ConfirmationFlow::new(Arc::new(RecordingBackend::new(false)), cache.clone()),
        );

        let past_deadline = session.hold.expires_at + Duration::seconds(1);
        let result = orchestrator
            .attempt_payment(&mut session, &customer(), past_deadline)
            .await;
        assert!(matches!(result, Err(CheckoutError::SessionExpired)));
    }

    #[tokio::test]
    async fn test_invalid_form_blocks_submission() {
        let cache = SlotCache::new(SlotStore::new());
        let mut session = held_session(&cache);

        let orchestrator = CheckoutOrchestrator::new(
            Arc::new(MockGateway::approving("secret")),
            ConfirmationFlow::new(Arc::new(RecordingBackend::new(false)), cache.clone()),
        );

        let incomplete = CustomerDetails {
            name: String::new(),
            email: "rahul@example.com".to_string(),
            phone: "+91 98765-43210".to_string(),
        };
        let result = orchestrator
            .attempt_payment(&mut session, &incomplete, t0())
            .await;
        assert!(matches!(result, Err(CheckoutError::InvalidCustomer(_))));
        assert_eq!(session.attempts(), 0);
    }
}
