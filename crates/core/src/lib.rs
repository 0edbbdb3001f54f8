pub mod compose;
pub mod intent;
pub mod language;
pub mod models;
pub mod schedule;

pub use compose::{apology, reply3, Trilingual};
pub use intent::{classification_rules, extract, normalize_text};
pub use language::detect;
pub use models::*;
pub use schedule::{
    parse_departure, simulate_location, simulated_delay_minutes, DatasetError, ScheduleStore,
};
