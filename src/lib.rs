// Mullvad device cleaner library
// Keeps the devices registered on a Mullvad account in line with an allowlist

pub mod allowlist;
pub mod api;
pub mod cleaner;
pub mod config;
pub mod device;
pub mod error;

pub use allowlist::Allowlist;
pub use api::{AccountApi, MullvadClient};
pub use cleaner::{Cleaner, Mode, Sleeper, ThreadSleeper, TickReport};
pub use error::{CleanerError, Result};
