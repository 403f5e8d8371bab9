pub mod facade;
pub mod traits;

#[cfg(test)]
pub mod mock;

pub use facade::{Screen, Target, DEFAULT_WAIT_TIMEOUT_MS};
pub use traits::{By, DriverCapabilities, ElementHandle, Key, Locator, UiDriver, WaitMode};
