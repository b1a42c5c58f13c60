//! Backend API integration module
//!
//! This module provides all backend-facing functionality:
//! - Authenticated HTTP client with bearer credential injection
//! - Login, registration and logout
//! - Vehicle list
//! - Fuel log lookup and submission
//! - Error classification

pub mod auth;
pub mod client;
pub mod error_handler;
pub mod fuel_logs;
pub mod vehicles;

pub use auth::{AuthApi, LoginOutcome, Registration};
pub use client::{ApiClient, ApiResponse};
pub use error_handler::{classify_transport_error, extract_backend_message};
pub use fuel_logs::{FuelLogApi, FuelLogEntry, PaymentMethod};
pub use vehicles::{Vehicle, VehicleApi, VehicleId};
