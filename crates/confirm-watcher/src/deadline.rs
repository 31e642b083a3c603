//! Caller-supplied deadline for a confirmation attempt.

use std::future;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Expiry instant, external cancellation, or both.
///
/// Cloning is cheap and clones observe the same cancellation token, so one
/// deadline can be shared across several concurrent watches.
#[derive(Debug, Clone, Default)]
pub struct Deadline {
	expires_at: Option<Instant>,
	cancellation: Option<CancellationToken>,
}

impl Deadline {
	pub fn at(instant: Instant) -> Self {
		Self {
			expires_at: Some(instant),
			cancellation: None,
		}
	}

	pub fn after(timeout: Duration) -> Self {
		Self::at(Instant::now() + timeout)
	}

	pub fn cancelled_by(token: CancellationToken) -> Self {
		Self {
			expires_at: None,
			cancellation: Some(token),
		}
	}

	/// A deadline that only fires if a cancellation token is attached later.
	pub fn never() -> Self {
		Self::default()
	}

	pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
		self.cancellation = Some(token);
		self
	}

	pub fn expires_at(&self) -> Option<Instant> {
		self.expires_at
	}

	/// Non-blocking check.
	pub fn is_expired(&self) -> bool {
		let elapsed = self
			.expires_at
			.is_some_and(|instant| Instant::now() >= instant);
		let cancelled = self
			.cancellation
			.as_ref()
			.is_some_and(CancellationToken::is_cancelled);
		elapsed || cancelled
	}

	/// Resolves once the expiry instant passes or the token is cancelled.
	pub async fn fired(&self) {
		let timer = async {
			match self.expires_at {
				Some(instant) => tokio::time::sleep_until(instant).await,
				None => future::pending::<()>().await,
			}
		};
		let cancelled = async {
			match &self.cancellation {
				Some(token) => token.cancelled().await,
				None => future::pending::<()>().await,
			}
		};

		tokio::select! {
			_ = timer => {},
			_ = cancelled => {},
		}
	}
}
