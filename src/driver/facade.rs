//! Synchronized element access over a [`UiDriver`]
//!
//! All wait-mode selection lives here so screens never tap an element
//! before it is interactive or read text before it has rendered.

use crate::driver::traits::{ElementHandle, Key, Locator, UiDriver, WaitMode};
use crate::error::TesterError;
use anyhow::Result;
use std::time::{Duration, Instant};

/// Default bound for element waits. Matches the app's slowest screen
/// transitions on emulators.
pub const DEFAULT_WAIT_TIMEOUT_MS: u64 = 35_000;

const POLL_INTERVAL_MS: u64 = 250;

/// Interaction target: either an element resolved earlier in the same
/// interaction, or a locator to be resolved on demand.
#[derive(Debug, Clone)]
pub enum Target {
    Element(ElementHandle),
    Locator(Locator),
}

impl From<ElementHandle> for Target {
    fn from(element: ElementHandle) -> Self {
        Target::Element(element)
    }
}

impl From<Locator> for Target {
    fn from(locator: Locator) -> Self {
        Target::Locator(locator)
    }
}

impl From<&Locator> for Target {
    fn from(locator: &Locator) -> Self {
        Target::Locator(locator.clone())
    }
}

/// Facade over a [`UiDriver`] holding the wait configuration.
///
/// Screens borrow one of these instead of the raw driver.
pub struct Screen<'d> {
    driver: &'d dyn UiDriver,
    timeout: Duration,
}

impl<'d> Screen<'d> {
    pub fn new(driver: &'d dyn UiDriver) -> Self {
        Self::with_timeout(driver, Duration::from_millis(DEFAULT_WAIT_TIMEOUT_MS))
    }

    pub fn with_timeout(driver: &'d dyn UiDriver, timeout: Duration) -> Self {
        Self { driver, timeout }
    }

    pub fn driver(&self) -> &dyn UiDriver {
        self.driver
    }

    /// Poll the UI tree until an element satisfies `mode`, up to the
    /// configured timeout. Fails with [`TesterError::NotFound`] when the
    /// timeout elapses first.
    pub async fn resolve(&self, locator: &Locator, mode: WaitMode) -> Result<ElementHandle> {
        let start = Instant::now();
        loop {
            if let Some(element) = self.driver.try_find(locator, mode).await? {
                return Ok(element);
            }
            if start.elapsed() >= self.timeout {
                return Err(TesterError::NotFound {
                    locator: locator.to_string(),
                    mode: mode.as_str().to_string(),
                    timeout_ms: self.timeout.as_millis() as u64,
                }
                .into());
            }
            tokio::time::sleep(Duration::from_millis(POLL_INTERVAL_MS)).await;
        }
    }

    /// Resolve `target` if it is still a locator, waiting for `mode`.
    async fn resolve_target(&self, target: Target, mode: WaitMode) -> Result<ElementHandle> {
        match target {
            Target::Element(element) => Ok(element),
            Target::Locator(locator) => self.resolve(&locator, mode).await,
        }
    }

    /// Click an element. Locators are resolved with `Clickable` first so the
    /// tap never lands on an element that is not interactive yet.
    pub async fn click(&self, target: impl Into<Target>) -> Result<()> {
        let element = self.resolve_target(target.into(), WaitMode::Clickable).await?;
        self.driver.tap(&element).await
    }

    /// Read an element's textual content, resolving locators with `Presence`.
    pub async fn read_text(&self, target: impl Into<Target>) -> Result<String> {
        let element = self.resolve_target(target.into(), WaitMode::Presence).await?;
        self.driver.element_text(&element).await
    }

    /// Clear a field and type `text` into it, resolving locators with
    /// `Presence`.
    pub async fn enter_text(&self, target: impl Into<Target>, text: &str) -> Result<()> {
        let element = self.resolve_target(target.into(), WaitMode::Presence).await?;
        self.driver.clear_and_type(&element, text).await
    }

    /// Send a key event to the device.
    pub async fn send_key(&self, key: Key) -> Result<()> {
        self.driver.send_key(key).await
    }
}
