//! Renderer boundary.
//!
//! Some marketplaces only materialize listing markup after client-side
//! scripts run. The pipeline treats that capability as an injected
//! strategy behind this trait; no renderer ships with the crate. The
//! embedding application resolves availability once at startup and fails
//! fast if a rendered fetch mode is configured without an implementation.

use std::time::Duration;

use futures::future::BoxFuture;
use thiserror::Error;

/// Executes a page's client-side logic and returns the realized markup.
pub trait Renderer: Send + Sync {
    /// Navigate to `url`, optionally wait for `wait_selector` to appear,
    /// and return the resulting markup.
    ///
    /// The selector wait is best-effort: its absence within the deadline
    /// is not a failure, since the markup may still be usable. Only a
    /// navigation-level timeout is an error.
    fn render<'a>(
        &'a self,
        url: &'a str,
        timeout: Duration,
        wait_selector: Option<&'a str>,
    ) -> BoxFuture<'a, Result<String, RenderError>>;
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("navigation timed out for {url}")]
    NavigationTimeout { url: String },

    #[error("render failed for {url}: {reason}")]
    Failed { url: String, reason: String },
}
