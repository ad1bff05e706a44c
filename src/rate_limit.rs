//! Pause between remote mutations
//!
//! The remote service publishes no throughput limits, so every create,
//! update and delete is followed by a fixed delay.

use std::time::Duration;

use crate::logging::*;

/// Default pause after each remote mutation
pub const DEFAULT_UPLOAD_DELAY: Duration = Duration::from_millis(500);

/// Enforces a fixed delay after each remote operation
#[derive(Debug, Clone, Copy)]
pub struct RateLimiter {
	delay: Duration,
}

impl RateLimiter {
	pub fn new(delay: Duration) -> Self {
		RateLimiter { delay }
	}

	/// A limiter that never sleeps
	pub fn disabled() -> Self {
		RateLimiter { delay: Duration::ZERO }
	}

	pub fn delay(&self) -> Duration {
		self.delay
	}

	pub fn is_enabled(&self) -> bool {
		!self.delay.is_zero()
	}

	/// Sleep for the configured delay; returns immediately when disabled
	pub async fn wait(&self) {
		if self.delay.is_zero() {
			return;
		}
		trace!("Rate limiting for {:?}", self.delay);
		tokio::time::sleep(self.delay).await;
	}
}

impl Default for RateLimiter {
	fn default() -> Self {
		RateLimiter::new(DEFAULT_UPLOAD_DELAY)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::time::Instant;

	#[test]
	fn test_default_delay() {
		let limiter = RateLimiter::default();
		assert_eq!(limiter.delay(), Duration::from_millis(500));
		assert!(limiter.is_enabled());
	}

	#[tokio::test]
	async fn test_disabled_does_not_sleep() {
		let limiter = RateLimiter::disabled();
		assert!(!limiter.is_enabled());
		let start = Instant::now();
		for _ in 0..100 {
			limiter.wait().await;
		}
		assert!(start.elapsed() < Duration::from_millis(50));
	}

	#[tokio::test]
	async fn test_wait_sleeps_for_delay() {
		let limiter = RateLimiter::new(Duration::from_millis(20));
		let start = Instant::now();
		limiter.wait().await;
		limiter.wait().await;
		assert!(start.elapsed() >= Duration::from_millis(40));
	}
}

// vim: ts=4
