pub mod orchestrator;
pub mod session;

pub use orchestrator::{
    BookingBackend, BookingReceipt, CheckoutOrchestrator, CheckoutOutcome, ConfirmationFlow,
    CreateBookingRequest, MockGateway,
};
pub use session::{CheckoutContext, CheckoutError, CheckoutSession, SessionState};
