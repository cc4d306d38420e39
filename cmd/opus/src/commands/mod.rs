//! CLI commands module.

mod inspect;
mod roundtrip;
mod util;

pub use inspect::InspectCommand;
pub use roundtrip::RoundtripCommand;

pub(crate) use util::*;
