use async_trait::async_trait;
use chrono::Utc;
use std::sync::Mutex;
use uuid::Uuid;

use turfbook_core::booking::{BookingRecord, BookingStatus, NewBooking};
use turfbook_core::repository::BookingRepository;

/// Keeps bookings in a Vec behind a mutex. Used by tests and local runs
/// that have no Postgres available.
#[derive(Default)]
pub struct InMemoryBookingRepository {
    records: Mutex<Vec<BookingRecord>>,
}

impl InMemoryBookingRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<BookingRecord>> {
        match self.records.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

#[async_trait]
impl BookingRepository for InMemoryBookingRepository {
    async fn create_booking(
        &self,
        booking: &NewBooking,
    ) -> Result<Uuid, Box<dyn std::error::Error + Send + Sync>> {
        let record = BookingRecord {
            id: Uuid::new_v4(),
            slot_id: booking.slot_id.clone(),
            turf_id: booking.turf_id.clone(),
            date: booking.date.clone(),
            customer: booking.customer.clone(),
            payment_reference: booking.payment_reference.clone(),
            user_id: booking.user_id.clone(),
            status: BookingStatus::Confirmed,
            created_at: Utc::now(),
        };
        let id = record.id;
        self.lock().push(record);
        Ok(id)
    }

    async fn get_booking(
        &self,
        id: Uuid,
    ) -> Result<Option<BookingRecord>, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self.lock().iter().find(|r| r.id == id).cloned())
    }

    async fn find_by_payment_reference(
        &self,
        reference: &str,
    ) -> Result<Option<BookingRecord>, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self
            .lock()
            .iter()
            .find(|r| r.payment_reference.as_deref() == Some(reference))
            .cloned())
    }

    async fn list_bookings(
        &self,
        user_id: &str,
    ) -> Result<Vec<BookingRecord>, Box<dyn std::error::Error + Send + Sync>> {
        let mut matches: Vec<BookingRecord> = self
            .lock()
            .iter()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect();
        matches.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(matches)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use turfbook_core::booking::CustomerDetails;

    fn new_booking(reference: Option<&str>) -> NewBooking {
        NewBooking {
            slot_id: "slot-turf-1-2026-03-01-18:00".to_string(),
            turf_id: "turf-1".to_string(),
            date: "2026-03-01".to_string(),
            customer: CustomerDetails {
                name: "Rahul Sharma".to_string(),
                email: "rahul@example.com".to_string(),
                phone: "9876543210".to_string(),
            },
            payment_reference: reference.map(String::from),
            user_id: "guest".to_string(),
        }
    }

    #[tokio::test]
    async fn create_then_get_round_trips() {
        let repo = InMemoryBookingRepository::new();
        let id = repo.create_booking(&new_booking(None)).await.unwrap();

        let fetched = repo.get_booking(id).await.unwrap().unwrap();
        assert_eq!(fetched.slot_id, "slot-turf-1-2026-03-01-18:00");
        assert_eq!(fetched.status, BookingStatus::Confirmed);
    }

    #[tokio::test]
    async fn finds_booking_by_payment_reference() {
        let repo = InMemoryBookingRepository::new();
        repo.create_booking(&new_booking(Some("pay_abc123")))
            .await
            .unwrap();

        let found = repo.find_by_payment_reference("pay_abc123").await.unwrap();
        assert!(found.is_some());
        assert!(repo
            .find_by_payment_reference("pay_missing")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn lists_only_the_requested_users_bookings() {
        let repo = InMemoryBookingRepository::new();
        repo.create_booking(&new_booking(None)).await.unwrap();

        let mut other = new_booking(None);
        other.user_id = "user-42".to_string();
        repo.create_booking(&other).await.unwrap();

        let guest = repo.list_bookings("guest").await.unwrap();
        assert_eq!(guest.len(), 1);
        assert_eq!(guest[0].user_id, "guest");
    }
}
