//! Employee roster: the record type and the JSON loader.

mod loader;
mod types;

pub use loader::{load_roster, parse_roster, RosterError};
pub use types::Employee;
