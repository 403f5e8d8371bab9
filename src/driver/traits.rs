use crate::error::TesterError;
use anyhow::Result;
use async_trait::async_trait;
use std::fmt;
use std::str::FromStr;

/// Locator strategy for finding UI elements
///
/// Strategy values are opaque to the facade; only the driver interprets them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum By {
    /// XPath expression over the UI hierarchy
    XPath,
    /// Accessibility identifier / content description
    AccessibilityId,
}

impl fmt::Display for By {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            By::XPath => write!(f, "xpath"),
            By::AccessibilityId => write!(f, "accessibility-id"),
        }
    }
}

/// Symbolic (strategy, value) descriptor used to find a UI element
/// at interaction time. Immutable; screens define these as constants
/// or build them from templates (e.g. a suggestion row for a city name).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locator {
    pub by: By,
    pub value: String,
}

impl Locator {
    pub fn xpath(value: impl Into<String>) -> Self {
        Self {
            by: By::XPath,
            value: value.into(),
        }
    }

    pub fn accessibility_id(value: impl Into<String>) -> Self {
        Self {
            by: By::AccessibilityId,
            value: value.into(),
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.by, self.value)
    }
}

/// Condition an element must satisfy before an operation proceeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitMode {
    /// Element exists in the UI tree
    Presence,
    /// Element exists and is rendered on screen
    Visible,
    /// Element is visible and accepts taps
    Clickable,
}

impl WaitMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            WaitMode::Presence => "presence",
            WaitMode::Visible => "visible",
            WaitMode::Clickable => "clickable",
        }
    }
}

impl FromStr for WaitMode {
    type Err = TesterError;

    /// Rejects unknown modes before any wait begins.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "presence" => Ok(WaitMode::Presence),
            "visible" => Ok(WaitMode::Visible),
            "clickable" => Ok(WaitMode::Clickable),
            other => Err(TesterError::InvalidArgument(format!(
                "wait mode must be one of 'presence', 'visible', 'clickable', got '{other}'"
            ))),
        }
    }
}

/// Key events forwarded to the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Enter,
    Back,
}

/// Transient handle to an element resolved against the current UI tree
/// snapshot. The tree may mutate between interactions, so handles are
/// used immediately and never cached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementHandle {
    pub id: String,
}

impl ElementHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

/// Static driver capabilities, queried once at session start.
#[derive(Debug, Clone)]
pub struct DriverCapabilities {
    pub platform: String,
    pub device: Option<String>,
}

/// Platform-agnostic UI driver interface
///
/// This trait is the boundary to the real automation transport (Appium,
/// UiAutomator, ...). Screens never talk to it directly; they go through
/// the [`Screen`](crate::driver::facade::Screen) facade, which owns the
/// wait semantics.
#[async_trait]
pub trait UiDriver: Send + Sync {
    /// Probe the current UI tree once for an element satisfying `mode`.
    ///
    /// Returns `Ok(None)` when no such element exists right now; the facade
    /// is responsible for polling. Driver transport failures are errors.
    async fn try_find(&self, locator: &Locator, mode: WaitMode) -> Result<Option<ElementHandle>>;

    /// Dispatch a tap to a resolved element.
    async fn tap(&self, element: &ElementHandle) -> Result<()>;

    /// Extract the textual content of a resolved element.
    async fn element_text(&self, element: &ElementHandle) -> Result<String>;

    /// Clear a field's existing content, then type `text` into it.
    async fn clear_and_type(&self, element: &ElementHandle, text: &str) -> Result<()>;

    /// Send a key event to the device (not tied to an element).
    async fn send_key(&self, key: Key) -> Result<()>;

    /// Platform capabilities of the underlying session.
    fn capabilities(&self) -> &DriverCapabilities;
}
