//! HTTP fetch layer for marketplace pages.
//!
//! Static mode issues a plain GET with retry, exponential backoff, and
//! human-like pacing, presenting a fresh outbound identity on every
//! attempt. Render mode delegates the whole call to an injected
//! [`Renderer`] with a single bounded timeout and no internal retry
//! loop; callers that want retries for rendered fetches wrap `fetch`
//! themselves.

use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

use crate::error::FetchError;
use crate::identity::{Identity, IdentityRotator};
use crate::render::Renderer;

/// Retry and pacing schedule for static-mode fetches.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts per URL. The first failure consumes attempt 1.
    pub max_attempts: u32,
    /// Base for the exponential backoff before retry attempts.
    pub backoff_base_secs: f64,
    /// Ceiling on any single backoff sleep (jitter excluded).
    pub backoff_cap_secs: f64,
    /// Lower bound of the randomized pacing delay before the first attempt.
    pub min_delay_secs: f64,
    /// Upper bound of the randomized pacing delay before the first attempt.
    pub max_delay_secs: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_base_secs: 2.0,
            backoff_cap_secs: 10.0,
            min_delay_secs: 2.0,
            max_delay_secs: 5.0,
        }
    }
}

impl RetryPolicy {
    /// Policy with no sleeps at all, for tests and local sinks.
    #[must_use]
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            backoff_base_secs: 0.0,
            backoff_cap_secs: 0.0,
            min_delay_secs: 0.0,
            max_delay_secs: 0.0,
        }
    }
}

/// How markup is obtained for a URL, resolved once at configuration time.
#[derive(Clone)]
pub enum FetchStrategy {
    /// Plain HTTP GET of the server response body.
    Static,
    /// Delegate to a renderer that executes the page's scripts first.
    Rendered {
        renderer: Arc<dyn Renderer>,
        timeout_secs: u64,
        wait_selector: Option<String>,
    },
}

/// Fetches marketplace pages, returning the raw markup. No parsing
/// happens here.
pub struct FetchClient {
    strategy: FetchStrategy,
    rotator: IdentityRotator,
    policy: RetryPolicy,
    timeout_secs: u64,
}

impl FetchClient {
    #[must_use]
    pub fn new(
        strategy: FetchStrategy,
        rotator: IdentityRotator,
        policy: RetryPolicy,
        timeout_secs: u64,
    ) -> Self {
        Self {
            strategy,
            rotator,
            policy,
            timeout_secs,
        }
    }

    /// Fetches `url` and returns the page markup.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] once all attempts are exhausted (static
    /// mode) or the single render delegation fails (render mode). The
    /// error carried is the one from the final attempt.
    pub async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        match &self.strategy {
            FetchStrategy::Static => self.fetch_static(url).await,
            FetchStrategy::Rendered {
                renderer,
                timeout_secs,
                wait_selector,
            } => {
                Self::fetch_rendered(
                    renderer.as_ref(),
                    url,
                    *timeout_secs,
                    wait_selector.as_deref(),
                )
                .await
            }
        }
    }

    async fn fetch_static(&self, url: &str) -> Result<String, FetchError> {
        let max_attempts = self.policy.max_attempts.max(1);
        let mut attempt = 0u32;

        loop {
            self.pause_before(attempt).await;

            let identity = self.rotator.next_identity();
            match self.attempt_static(url, &identity).await {
                Ok(body) => return Ok(body),
                Err(err) => {
                    attempt += 1;
                    if attempt >= max_attempts {
                        return Err(err);
                    }
                    tracing::warn!(
                        url,
                        attempt,
                        max_attempts,
                        error = %err,
                        "fetch attempt failed; retrying after backoff"
                    );
                }
            }
        }
    }

    /// Sleeps the pacing delay (first attempt) or the capped exponential
    /// backoff plus jitter (retries). `failures` is the number of
    /// attempts that have already failed.
    async fn pause_before(&self, failures: u32) {
        let secs = if failures == 0 {
            let (min, max) = (self.policy.min_delay_secs, self.policy.max_delay_secs);
            if max <= 0.0 {
                0.0
            } else if min >= max {
                max
            } else {
                rand::rng().random_range(min..max)
            }
        } else {
            let backoff = backoff_secs(
                failures,
                self.policy.backoff_base_secs,
                self.policy.backoff_cap_secs,
            );
            if backoff <= 0.0 {
                0.0
            } else {
                backoff + rand::rng().random_range(0.0..1.0)
            }
        };

        if secs > 0.0 {
            tokio::time::sleep(Duration::from_secs_f64(secs)).await;
        }
    }

    async fn attempt_static(&self, url: &str, identity: &Identity) -> Result<String, FetchError> {
        let client = self.build_attempt_client(url, identity)?;

        let response = client
            .get(url)
            .send()
            .await
            .map_err(|e| classify_transport_error(url, self.timeout_secs, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus {
                status: status.as_u16(),
                url: url.to_owned(),
            });
        }

        response
            .text()
            .await
            .map_err(|e| classify_transport_error(url, self.timeout_secs, e))
    }

    /// Builds a one-shot `reqwest::Client` carrying this attempt's identity.
    ///
    /// Proxy and header configuration are per-client in reqwest, so each
    /// attempt gets its own client. When a proxy is in play, certificate
    /// verification is disabled for that attempt (accepted risk of
    /// unverified proxy endpoints); direct connections keep verification
    /// on.
    fn build_attempt_client(
        &self,
        url: &str,
        identity: &Identity,
    ) -> Result<reqwest::Client, FetchError> {
        let mut headers = HeaderMap::new();
        for (name, value) in identity.headers {
            if let (Ok(n), Ok(v)) = (
                HeaderName::from_bytes(name.as_bytes()),
                HeaderValue::from_str(value),
            ) {
                headers.insert(n, v);
            }
        }

        let mut builder = reqwest::Client::builder()
            .timeout(Duration::from_secs(self.timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(identity.user_agent)
            .default_headers(headers);

        if let Some(proxy_url) = &identity.proxy {
            let proxy = reqwest::Proxy::all(proxy_url).map_err(|e| FetchError::Network {
                url: url.to_owned(),
                source: e,
            })?;
            builder = builder.proxy(proxy).danger_accept_invalid_certs(true);
        }

        builder.build().map_err(|e| FetchError::Network {
            url: url.to_owned(),
            source: e,
        })
    }

    async fn fetch_rendered(
        renderer: &dyn Renderer,
        url: &str,
        timeout_secs: u64,
        wait_selector: Option<&str>,
    ) -> Result<String, FetchError> {
        let timeout = Duration::from_secs(timeout_secs);
        match tokio::time::timeout(timeout, renderer.render(url, timeout, wait_selector)).await {
            Ok(Ok(markup)) => Ok(markup),
            Ok(Err(e)) => Err(FetchError::RenderTimeout {
                url: url.to_owned(),
                reason: e.to_string(),
            }),
            Err(_elapsed) => Err(FetchError::RenderTimeout {
                url: url.to_owned(),
                reason: format!("render deadline of {timeout_secs}s exceeded"),
            }),
        }
    }
}

/// Capped exponential backoff: `base * 2^failures`, clamped to `cap`.
fn backoff_secs(failures: u32, base: f64, cap: f64) -> f64 {
    let factor = 2f64.powi(i32::try_from(failures.min(32)).unwrap_or(32));
    (base * factor).min(cap)
}

fn classify_transport_error(url: &str, timeout_secs: u64, err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        FetchError::Timeout {
            url: url.to_owned(),
            timeout_secs,
        }
    } else {
        FetchError::Network {
            url: url.to_owned(),
            source: err,
        }
    }
}
