pub mod grid;
pub mod sport;
pub mod turf;

pub use grid::{generate_slots, TimeSlot, GRID_HOURS};
pub use sport::{Sport, SportError, SportRegistry, SportUpdate};
pub use turf::{NewTurf, Turf, TurfCatalog, TurfError, TurfUpdate};
