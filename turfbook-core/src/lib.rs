pub mod booking;
pub mod identity;
pub mod ledger;
pub mod payment;
pub mod repository;
