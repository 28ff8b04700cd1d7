use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::turf::Turf;
use turfbook_core::booking::CustomerDetails;

/// Hourly slot boundaries. The final slot wraps to midnight.
pub const GRID_HOURS: [&str; 18] = [
    "06:00", "07:00", "08:00", "09:00", "10:00", "11:00", "12:00", "13:00", "14:00", "15:00",
    "16:00", "17:00", "18:00", "19:00", "20:00", "21:00", "22:00", "23:00",
];

/// A bookable window. Identity is `turf_id + date + start_time`; the id
/// string is deterministic so repeated generation yields the same slots.
///
/// Invariants, enforced by the reservation protocol:
/// - at most one of `is_booked` / `is_pending` is true;
/// - `pending_until` is set iff `is_pending`;
/// - `is_booked` implies `customer_details` is present.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeSlot {
    pub id: String,
    pub turf_id: String,
    pub sport_id: String,
    pub date: String,
    pub start_time: String,
    pub end_time: String,
    pub price: i64,
    pub is_booked: bool,
    pub is_pending: bool,
    pub pending_until: Option<DateTime<Utc>>,
    pub customer_details: Option<CustomerDetails>,
}

impl TimeSlot {
    pub fn is_free(&self) -> bool {
        !self.is_booked && !self.is_pending
    }
}

/// Derive the slot grid for one (date, sport) pair from the active turfs
/// of that sport. All slots start free; availability changes only through
/// the reservation protocol. Zero turfs yields an empty grid.
pub fn generate_slots(date: &str, sport_id: &str, turfs: &[Turf]) -> Vec<TimeSlot> {
    let mut slots = Vec::with_capacity(turfs.len() * GRID_HOURS.len());

    for turf in turfs {
        for (index, hour) in GRID_HOURS.iter().enumerate() {
            let end_time = GRID_HOURS.get(index + 1).copied().unwrap_or("00:00");
            slots.push(TimeSlot {
                id: format!("slot-{}-{}-{}", turf.id, date, hour),
                turf_id: turf.id.clone(),
                sport_id: sport_id.to_string(),
                date: date.to_string(),
                start_time: hour.to_string(),
                end_time: end_time.to_string(),
                price: turf.price_per_hour,
                is_booked: false,
                is_pending: false,
                pending_until: None,
                customer_details: None,
            });
        }
    }

    slots
}
