use thiserror::Error;

/// Failure conditions surfaced by the tester.
///
/// There is no retry or recovery layer anywhere: every condition propagates
/// straight to the caller (usually a test or the CLI) through `anyhow`.
#[derive(Debug, Error)]
pub enum TesterError {
    /// No element satisfied the wait condition within the timeout.
    #[error("element not found: {locator} ({mode}) after {timeout_ms}ms")]
    NotFound {
        locator: String,
        mode: String,
        timeout_ms: u64,
    },

    /// A caller-supplied argument was rejected before any work started.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Displayed text could not be parsed as a temperature.
    #[error("could not parse temperature from {0:?}")]
    Parse(String),

    /// The weather API answered with a non-200 status.
    #[error("weather API returned HTTP {status}")]
    HttpFailure { status: u16 },

    /// The record store was used after `close()`.
    #[error("record store connection is closed")]
    ConnectionClosed,
}
