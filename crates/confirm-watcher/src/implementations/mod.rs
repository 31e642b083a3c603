//! Ledger client implementations.
//!
//! Available implementations:
//! - `rpc`: JSON-RPC over HTTP using an Alloy provider

pub mod rpc;

pub use rpc::*;
