//! Pipeline pacing and retry configuration.

use std::time::Duration;

/// Tunables for the resolution pipeline.
///
/// # Example
///
/// ```
/// use apkmd_download::PipelineConfig;
/// use std::time::Duration;
///
/// let config = PipelineConfig::new()
///     .with_challenge_backoff(Duration::from_secs(60))
///     .with_max_listing_attempts(5);
/// ```
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Attempts per listing fetch before giving up on that page.
    pub(crate) max_listing_attempts: u32,
    /// Delay between attempts after a challenge or network failure.
    pub(crate) challenge_backoff: Duration,
    /// Delay after every written artifact.
    pub(crate) post_download_delay: Duration,
    /// Pages followed from a variant page to the artifact link.
    pub(crate) max_interstitial_hops: u8,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_listing_attempts: 10,
            challenge_backoff: Duration::from_secs(30),
            post_download_delay: Duration::from_secs(5),
            max_interstitial_hops: 2,
        }
    }
}

impl PipelineConfig {
    /// Create a new configuration with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Configuration without any delays, for tests and dry runs.
    #[must_use]
    pub fn without_delays() -> Self {
        Self::default()
            .with_challenge_backoff(Duration::ZERO)
            .with_post_download_delay(Duration::ZERO)
    }

    /// Set the number of attempts per listing fetch (at least one).
    ///
    /// Defaults to 10.
    #[must_use]
    pub fn with_max_listing_attempts(mut self, attempts: u32) -> Self {
        self.max_listing_attempts = attempts.max(1);
        self
    }

    /// Set the backoff after a challenge page.
    ///
    /// Defaults to 30 seconds.
    #[must_use]
    pub const fn with_challenge_backoff(mut self, delay: Duration) -> Self {
        self.challenge_backoff = delay;
        self
    }

    /// Set the throttling delay after each written artifact.
    ///
    /// Defaults to 5 seconds.
    #[must_use]
    pub const fn with_post_download_delay(mut self, delay: Duration) -> Self {
        self.post_download_delay = delay;
        self
    }

    /// Set how many interstitial pages may be followed (at least one).
    ///
    /// Defaults to 2.
    #[must_use]
    pub fn with_max_interstitial_hops(mut self, hops: u8) -> Self {
        self.max_interstitial_hops = hops.max(1);
        self
    }

    pub const fn max_listing_attempts(&self) -> u32 {
        self.max_listing_attempts
    }

    pub const fn challenge_backoff(&self) -> Duration {
        self.challenge_backoff
    }

    pub const fn post_download_delay(&self) -> Duration {
        self.post_download_delay
    }

    pub const fn max_interstitial_hops(&self) -> u8 {
        self.max_interstitial_hops
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PipelineConfig::default();
        assert_eq!(config.max_listing_attempts, 10);
        assert_eq!(config.challenge_backoff, Duration::from_secs(30));
        assert_eq!(config.post_download_delay, Duration::from_secs(5));
        assert_eq!(config.max_interstitial_hops, 2);
    }

    #[test]
    fn test_builder_clamps_to_one() {
        let config = PipelineConfig::new()
            .with_max_listing_attempts(0)
            .with_max_interstitial_hops(0);
        assert_eq!(config.max_listing_attempts, 1);
        assert_eq!(config.max_interstitial_hops, 1);
    }

    #[test]
    fn test_without_delays() {
        let config = PipelineConfig::without_delays();
        assert!(config.challenge_backoff.is_zero());
        assert!(config.post_download_delay.is_zero());
        assert_eq!(config.max_listing_attempts, 10);
    }
}
