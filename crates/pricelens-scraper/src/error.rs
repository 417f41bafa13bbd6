use thiserror::Error;

/// Failure of a fetch call after all attempts are exhausted.
///
/// Static-mode fetches retry transient variants internally up to the
/// configured attempt cap; the error surfaced here is the one from the
/// final attempt. Render-mode fetches are single-attempt and only ever
/// surface [`FetchError::RenderTimeout`].
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("network error fetching {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("timed out fetching {url} after {timeout_secs}s")]
    Timeout { url: String, timeout_secs: u64 },

    #[error("unexpected HTTP status {status} from {url}")]
    HttpStatus { status: u16, url: String },

    #[error("render failed for {url}: {reason}")]
    RenderTimeout { url: String, reason: String },
}

/// Failure delivering a single record to the ingestion endpoint.
///
/// Collected per record; never aborts delivery of the remaining records.
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("sink returned HTTP status {status}")]
    HttpStatus { status: u16 },

    #[error("sink request timed out")]
    Timeout,

    #[error("network error reaching sink: {0}")]
    Network(#[from] reqwest::Error),
}

/// Why a platform's entire scrape attempt produced nothing.
#[derive(Debug, Error)]
pub enum PlatformError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("no usable records parsed from listing markup")]
    NoRecords,

    #[error("no marketplace adapter registered for this tag")]
    UnknownPlatform,
}

/// A platform whose scrape attempt failed wholesale.
///
/// Reported in the run summary; excluded from aggregated output; never
/// fails the overall run.
#[derive(Debug)]
pub struct PlatformFailure {
    pub platform: String,
    pub error: PlatformError,
}

impl std::fmt::Display for PlatformFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.platform, self.error)
    }
}
