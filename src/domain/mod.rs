pub mod age;
pub mod filter;
pub mod models;
pub mod notifications;
pub mod schedule;
pub mod squad;
pub mod users;

pub use filter::FilterState;
pub use models::*;
pub use schedule::{DateRange, GameStatus, OwnerFilter, Scheduled};
pub use squad::{ShadowSquad, Slot, MAX_CANDIDATES_PER_SLOT};
