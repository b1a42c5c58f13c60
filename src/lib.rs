//! fuel-log - Fuel log client for a vehicle tracking backend
//!
//! This library provides the session store, the authenticated API client and
//! the fuel log entry workflow behind the `fuellog` CLI.

pub mod api;
pub mod cli;
pub mod core;
pub mod error;
pub mod workflow;

pub use error::{FuelLogError, Result};
