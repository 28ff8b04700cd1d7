use async_trait::async_trait;
use uuid::Uuid;

use crate::booking::{BookingRecord, NewBooking};

/// Repository trait for booking persistence. The confirmation endpoint
/// is the only writer; records are immutable once created.
#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// Persist a new booking and return its server-generated id.
    async fn create_booking(
        &self,
        booking: &NewBooking,
    ) -> Result<Uuid, Box<dyn std::error::Error + Send + Sync>>;

    async fn get_booking(
        &self,
        id: Uuid,
    ) -> Result<Option<BookingRecord>, Box<dyn std::error::Error + Send + Sync>>;

    /// Lookup by gateway payment reference, used to deduplicate repeated
    /// confirmations of the same payment.
    async fn find_by_payment_reference(
        &self,
        reference: &str,
    ) -> Result<Option<BookingRecord>, Box<dyn std::error::Error + Send + Sync>>;

    async fn list_bookings(
        &self,
        user_id: &str,
    ) -> Result<Vec<BookingRecord>, Box<dyn std::error::Error + Send + Sync>>;
}
