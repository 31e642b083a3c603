//! Configuration for the confirmation service.
//!
//! Loads a TOML file, substitutes `${VAR}` references from the environment,
//! applies `TX_CONFIRM_*` overrides and validates the result.

mod loader;
mod types;

pub use loader::{ConfigError, ConfigLoader};
pub use types::*;
