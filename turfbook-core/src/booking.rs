use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Contact details captured on the checkout form.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CustomerDetails {
    pub name: String,
    pub email: String,
    pub phone: String,
}

impl CustomerDetails {
    /// Form-level validation: all three fields must be non-empty before
    /// the checkout submit button is allowed through.
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Customer name is required".to_string());
        }
        if self.email.trim().is_empty() || !self.email.contains('@') {
            return Err("A valid customer email is required".to_string());
        }
        if self.phone.trim().is_empty() {
            return Err("Customer phone is required".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
    Confirmed,
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BookingStatus::Confirmed => write!(f, "CONFIRMED"),
        }
    }
}

/// Write model for a booking record. The server assigns the id, status
/// and creation timestamp; callers never supply them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewBooking {
    pub slot_id: String,
    pub turf_id: String,
    pub date: String,
    pub customer: CustomerDetails,
    pub payment_reference: Option<String>,
    pub user_id: String,
}

/// A persisted booking. Immutable after creation: there is no update or
/// cancellation path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingRecord {
    pub id: Uuid,
    pub slot_id: String,
    pub turf_id: String,
    pub date: String,
    pub customer: CustomerDetails,
    pub payment_reference: Option<String>,
    pub user_id: String,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_customer_details_validation() {
        let ok = CustomerDetails {
            name: "Rahul Sharma".to_string(),
            email: "rahul@example.com".to_string(),
            phone: "+91 98765-43210".to_string(),
        };
        assert!(ok.validate().is_ok());

        let missing_phone = CustomerDetails {
            phone: "".to_string(),
            ..ok.clone()
        };
        assert!(missing_phone.validate().is_err());

        let bad_email = CustomerDetails {
            email: "not-an-email".to_string(),
            ..ok
        };
        assert!(bad_email.validate().is_err());
    }
}
