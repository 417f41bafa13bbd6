//! Outbound identity rotation.
//!
//! Every fetch attempt presents a fresh identity: a realistic browser
//! header template, a User-Agent drawn independently from its own pool
//! (widening the fingerprint space beyond template × nothing), and an
//! optional proxy taken round-robin from the configured pool.

use std::sync::atomic::{AtomicUsize, Ordering};

use rand::seq::IndexedRandom;

/// Chrome-era desktop User-Agents rotated across attempts.
const USER_AGENTS: [&str; 5] = [
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/121.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36 Edg/120.0.0.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/121.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/121.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:122.0) Gecko/20100101 Firefox/122.0",
];

/// Header sets mimicking a navigating browser. The User-Agent is NOT part
/// of the template; it is selected separately per attempt.
const HEADER_TEMPLATES: [&[(&str, &str)]; 2] = [
    &[
        ("accept", "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,image/apng,*/*;q=0.8"),
        ("accept-language", "en-US,en;q=0.9,hi;q=0.8"),
        ("cache-control", "max-age=0"),
        ("sec-ch-ua", "\"Not_A Brand\";v=\"8\", \"Chromium\";v=\"120\", \"Google Chrome\";v=\"120\""),
        ("sec-ch-ua-mobile", "?0"),
        ("sec-ch-ua-platform", "\"Windows\""),
        ("sec-fetch-dest", "document"),
        ("sec-fetch-mode", "navigate"),
        ("sec-fetch-site", "none"),
        ("sec-fetch-user", "?1"),
        ("upgrade-insecure-requests", "1"),
    ],
    &[
        ("accept", "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8"),
        ("accept-language", "en-US,en;q=0.5"),
        ("sec-fetch-dest", "document"),
        ("sec-fetch-mode", "navigate"),
        ("sec-fetch-site", "none"),
        ("upgrade-insecure-requests", "1"),
    ],
];

/// The identity presented for one fetch attempt.
#[derive(Debug, Clone)]
pub struct Identity {
    pub headers: &'static [(&'static str, &'static str)],
    pub user_agent: &'static str,
    pub proxy: Option<String>,
}

/// Supplies a fresh [`Identity`] per call. Never fails: empty pools
/// degenerate to repeating the same value.
///
/// The proxy cursor is the pipeline's only shared mutable state; it
/// advances one position per call regardless of the attempt's outcome,
/// and is an atomic so concurrent platform scrapes never observe the
/// same slot inconsistently.
#[derive(Debug)]
pub struct IdentityRotator {
    proxies: Vec<String>,
    proxy_cursor: AtomicUsize,
}

impl IdentityRotator {
    #[must_use]
    pub fn new(proxies: Vec<String>) -> Self {
        Self {
            proxies,
            proxy_cursor: AtomicUsize::new(0),
        }
    }

    /// Returns the identity for the next fetch attempt.
    #[must_use]
    pub fn next_identity(&self) -> Identity {
        let mut rng = rand::rng();
        let headers = *HEADER_TEMPLATES
            .choose(&mut rng)
            .unwrap_or(&HEADER_TEMPLATES[0]);
        let user_agent = *USER_AGENTS.choose(&mut rng).unwrap_or(&USER_AGENTS[0]);

        let proxy = if self.proxies.is_empty() {
            None
        } else {
            let slot = self.proxy_cursor.fetch_add(1, Ordering::Relaxed) % self.proxies.len();
            Some(self.proxies[slot].clone())
        };

        Identity {
            headers,
            user_agent,
            proxy,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_proxies_means_no_proxy_in_identity() {
        let rotator = IdentityRotator::new(vec![]);
        for _ in 0..10 {
            assert!(rotator.next_identity().proxy.is_none());
        }
    }

    #[test]
    fn singleton_proxy_pool_repeats_the_same_proxy() {
        let rotator = IdentityRotator::new(vec!["http://only:8080".to_string()]);
        for _ in 0..5 {
            assert_eq!(
                rotator.next_identity().proxy.as_deref(),
                Some("http://only:8080")
            );
        }
    }

    #[test]
    fn proxies_rotate_round_robin_and_wrap() {
        let rotator = IdentityRotator::new(vec![
            "http://a:8080".to_string(),
            "http://b:8080".to_string(),
            "http://c:8080".to_string(),
        ]);
        let picks: Vec<String> = (0..7)
            .map(|_| rotator.next_identity().proxy.expect("proxy configured"))
            .collect();
        assert_eq!(
            picks,
            vec![
                "http://a:8080",
                "http://b:8080",
                "http://c:8080",
                "http://a:8080",
                "http://b:8080",
                "http://c:8080",
                "http://a:8080",
            ]
        );
    }

    #[test]
    fn user_agent_always_comes_from_the_pool() {
        let rotator = IdentityRotator::new(vec![]);
        for _ in 0..20 {
            let identity = rotator.next_identity();
            assert!(USER_AGENTS.contains(&identity.user_agent));
        }
    }

    #[test]
    fn header_template_never_carries_a_user_agent() {
        // The UA is drawn independently; a template that also set one
        // would silently pin the fingerprint.
        for template in HEADER_TEMPLATES {
            assert!(template.iter().all(|(name, _)| *name != "user-agent"));
        }
    }
}
