//! Pacing between consecutive passes.
//!
//! Passes run sequentially against the same provider, so a pause between them
//! is the only rate-limit protection a run has.

use async_trait::async_trait;
use std::time::Duration;

/// Decides how long to wait between two passes.
#[async_trait]
pub trait PacingPolicy: Send + Sync {
    /// Called after every pass except the last.
    async fn between_passes(&self);
}

/// Constant pause, the same after every pass.
#[derive(Debug, Clone, Copy)]
pub struct FixedPacing {
    delay: Duration,
}

impl FixedPacing {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    pub fn from_millis(ms: u64) -> Self {
        Self::new(Duration::from_millis(ms))
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }
}

impl Default for FixedPacing {
    fn default() -> Self {
        Self::new(Duration::from_secs(1))
    }
}

#[async_trait]
impl PacingPolicy for FixedPacing {
    async fn between_passes(&self) {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn test_default_is_one_second() {
        assert_eq!(FixedPacing::default().delay(), Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_fixed_pacing_waits() {
        let pacing = FixedPacing::from_millis(30);
        let start = Instant::now();
        pacing.between_passes().await;
        assert!(start.elapsed() >= Duration::from_millis(30));
    }

    #[tokio::test]
    async fn test_zero_delay_returns_immediately() {
        let start = Instant::now();
        FixedPacing::from_millis(0).between_passes().await;
        assert!(start.elapsed() < Duration::from_millis(50));
    }
}
