//! Transaction confirmation watcher.
//!
//! Polls a [`LedgerClient`] for the receipt of an already-broadcast
//! transaction until it is mined or the caller's [`Deadline`] fires, and
//! replays failed transactions to recover a readable revert reason.

pub mod deadline;
pub mod implementations;
pub mod watcher;

pub use confirm_types::{
	ConfirmationOutcome, Diagnosis, LedgerClient, LedgerError, Receipt, TransactionHandle,
	WatchError,
};
pub use deadline::Deadline;
pub use implementations::AlloyLedger;
pub use watcher::{ConfirmationWatcher, DEFAULT_POLL_INTERVAL};
