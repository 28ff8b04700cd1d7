pub mod cache;
pub mod store;

pub use cache::SlotCache;
pub use store::{HoldError, HoldGrant, HoldToken, SlotStore, DEFAULT_HOLD_SECONDS};
