//! Result of a confirmation attempt.

use crate::Receipt;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How the failure reason of a reverted transaction was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Diagnosis {
	/// Replaying the call errored; the reason is the error message.
	Reverted,
	/// Replaying the call succeeded even though the receipt reports failure.
	/// The reason is the serialized receipt.
	Inconclusive,
}

/// Outcome of waiting for a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ConfirmationOutcome {
	/// Mined with a success status.
	Confirmed(Receipt),
	/// Mined with a failure status.
	Failed {
		receipt: Receipt,
		reason: String,
		diagnosis: Diagnosis,
	},
	/// The deadline fired before any receipt was observed.
	TimedOut,
}

impl ConfirmationOutcome {
	pub fn is_confirmed(&self) -> bool {
		matches!(self, ConfirmationOutcome::Confirmed(_))
	}

	/// The receipt behind this outcome. `None` only for `TimedOut`.
	pub fn receipt(&self) -> Option<&Receipt> {
		match self {
			ConfirmationOutcome::Confirmed(receipt) => Some(receipt),
			ConfirmationOutcome::Failed { receipt, .. } => Some(receipt),
			ConfirmationOutcome::TimedOut => None,
		}
	}
}

impl fmt::Display for ConfirmationOutcome {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			ConfirmationOutcome::Confirmed(receipt) => write!(f, "confirmed: {}", receipt),
			ConfirmationOutcome::Failed { reason, .. } => write!(f, "failed: {}", reason),
			ConfirmationOutcome::TimedOut => write!(f, "timed out"),
		}
	}
}
