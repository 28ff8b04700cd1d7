use serde::{Deserialize, Serialize};

/// Marker recorded on bookings created without an authenticated caller.
pub const GUEST_USER: &str = "guest";

/// JWT claims for customers and guests. Guests carry a generated `sub`
/// and the GUEST role.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CustomerClaims {
    pub sub: String,
    pub email: Option<String>,
    pub role: String,
    pub exp: usize,
}

/// The identity a booking is bound to. Derived server-side from the
/// verified token; client-supplied user ids are ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerIdentity {
    pub user_id: String,
}

impl CallerIdentity {
    pub fn authenticated(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
        }
    }

    pub fn guest() -> Self {
        Self {
            user_id: GUEST_USER.to_string(),
        }
    }

    pub fn is_guest(&self) -> bool {
        self.user_id == GUEST_USER
    }
}

impl From<&CustomerClaims> for CallerIdentity {
    fn from(claims: &CustomerClaims) -> Self {
        CallerIdentity::authenticated(claims.sub.clone())
    }
}
