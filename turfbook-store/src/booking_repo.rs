use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use turfbook_core::booking::{BookingRecord, BookingStatus, CustomerDetails, NewBooking};
use turfbook_core::repository::BookingRepository;

pub struct PgBookingRepository {
    pool: PgPool,
}

impl PgBookingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct BookingRow {
    id: Uuid,
    slot_id: String,
    turf_id: String,
    date: String,
    customer_name: String,
    customer_email: String,
    customer_phone: String,
    payment_reference: Option<String>,
    user_id: String,
    created_at: DateTime<Utc>,
}

impl From<BookingRow> for BookingRecord {
    fn from(row: BookingRow) -> Self {
        BookingRecord {
            id: row.id,
            slot_id: row.slot_id,
            turf_id: row.turf_id,
            date: row.date,
            customer: CustomerDetails {
                name: row.customer_name,
                email: row.customer_email,
                phone: row.customer_phone,
            },
            payment_reference: row.payment_reference,
            user_id: row.user_id,
            status: BookingStatus::Confirmed,
            created_at: row.created_at,
        }
    }
}

const SELECT_COLUMNS: &str = "SELECT id, slot_id, turf_id, date, customer_name, customer_email, \
     customer_phone, payment_reference, user_id, created_at FROM bookings";

#[async_trait]
impl BookingRepository for PgBookingRepository {
    async fn create_booking(
        &self,
        booking: &NewBooking,
    ) -> Result<Uuid, Box<dyn std::error::Error + Send + Sync>> {
        let booking_id = Uuid::new_v4();

        // Single statement: either the full row lands or nothing does.
        sqlx::query(
            r#"
            INSERT INTO bookings (id, slot_id, turf_id, date, customer_name, customer_email,
                                  customer_phone, payment_reference, user_id, status, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, 'CONFIRMED', NOW())
            "#,
        )
        .bind(booking_id)
        .bind(&booking.slot_id)
        .bind(&booking.turf_id)
        .bind(&booking.date)
        .bind(&booking.customer.name)
        .bind(&booking.customer.email)
        .bind(&booking.customer.phone)
        .bind(&booking.payment_reference)
        .bind(&booking.user_id)
        .execute(&self.pool)
        .await?;

        tracing::info!(%booking_id, slot_id = %booking.slot_id, "Booking persisted");
        Ok(booking_id)
    }

    async fn get_booking(
        &self,
        id: Uuid,
    ) -> Result<Option<BookingRecord>, Box<dyn std::error::Error + Send + Sync>> {
        let row = sqlx::query_as::<_, BookingRow>(&format!("{} WHERE id = $1", SELECT_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(BookingRecord::from))
    }

    async fn find_by_payment_reference(
        &self,
        reference: &str,
    ) -> Result<Option<BookingRecord>, Box<dyn std::error::Error + Send + Sync>> {
        let row = sqlx::query_as::<_, BookingRow>(&format!(
            "{} WHERE payment_reference = $1",
            SELECT_COLUMNS
        ))
        .bind(reference)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(BookingRecord::from))
    }

    async fn list_bookings(
        &self,
        user_id: &str,
    ) -> Result<Vec<BookingRecord>, Box<dyn std::error::Error + Send + Sync>> {
        let rows = sqlx::query_as::<_, BookingRow>(&format!(
            "{} WHERE user_id = $1 ORDER BY created_at DESC",
            SELECT_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(BookingRecord::from).collect())
    }
}
