//! Per-domain politeness delays between listing page fetches

use crate::config::{Config, PolitenessEntry};
use crate::url::{domain_of, matches_wildcard};
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Delay rules for listing sites
///
/// The first entry whose pattern matches a domain decides its delay; other
/// domains get the default delay.
#[derive(Debug, Clone)]
pub struct PolitenessPolicy {
    entries: Vec<PolitenessEntry>,
    default_delay: Duration,
}

impl PolitenessPolicy {
    pub fn new(entries: Vec<PolitenessEntry>, default_delay: Duration) -> Self {
        Self {
            entries,
            default_delay,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.politeness.clone(),
            Duration::from_secs(config.crawler.default_delay_secs),
        )
    }

    /// The delay to keep between two requests to `domain`
    pub fn delay_for(&self, domain: &str) -> Duration {
        self.entries
            .iter()
            .find(|entry| matches_wildcard(&entry.domain, domain))
            .map(|entry| Duration::from_secs(entry.delay_secs))
            .unwrap_or(self.default_delay)
    }

    /// Starts tracking request times for one crawl
    pub fn tracker(&self) -> PolitenessTracker<'_> {
        PolitenessTracker {
            policy: self,
            last_request: HashMap::new(),
        }
    }
}

/// Last request time per domain during one crawl
#[derive(Debug)]
pub struct PolitenessTracker<'a> {
    policy: &'a PolitenessPolicy,
    last_request: HashMap<String, Instant>,
}

impl PolitenessTracker<'_> {
    /// Records a request to `domain` at `now`
    pub fn record_request(&mut self, domain: &str, now: Instant) {
        self.last_request.insert(domain.to_string(), now);
    }

    /// Time left before `domain` may be requested again
    ///
    /// `None` means a request may be sent right away.
    pub fn time_until_next_request(&self, domain: &str, now: Instant) -> Option<Duration> {
        let last = self.last_request.get(domain)?;
        let delay = self.policy.delay_for(domain);
        let elapsed = now.saturating_duration_since(*last);

        (elapsed < delay).then(|| delay - elapsed)
    }

    /// Waits until `url`'s domain may be requested, then records the request
    pub async fn wait_turn(&mut self, url: &str) {
        let domain = domain_of(url).unwrap_or_default();

        if let Some(wait) = self.time_until_next_request(&domain, Instant::now()) {
            tracing::debug!("Waiting {:?} before requesting {}", wait, domain);
            tokio::time::sleep(wait).await;
        }

        self.record_request(&domain, Instant::now());
    }
}
