//! Shared types for transaction confirmation.
//!
//! Defines the transaction handle and receipt model, the outcome reported to
//! callers, the `LedgerClient` seam used to query a remote chain, and the
//! error taxonomy shared by the other crates in the workspace.

pub mod delivery;
pub mod errors;
pub mod ledger;
pub mod outcome;

pub use delivery::*;
pub use errors::*;
pub use ledger::*;
pub use outcome::*;
