//! Fuel log entry workflow
//!
//! - Strict form parsing and ordered validation
//! - The fetch/validate/submit state machine

pub mod fuel_log;
pub mod validation;

pub use fuel_log::{FetchOutcome, FetchTicket, FuelLogWorkflow, OdometerSnapshot, Phase};
pub use validation::{FuelLogForm, ValidationError};
