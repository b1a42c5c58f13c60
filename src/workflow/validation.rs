//! Fuel log form validation
//!
//! Raw form strings are parsed into typed values here. Parsing fails closed:
//! empty or malformed input is an error, never a zero.

use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use thiserror::Error;

use crate::api::fuel_logs::{FuelLogEntry, PaymentMethod};
use crate::api::vehicles::VehicleId;

/// Decimal places kept on the derived volume
pub const VOLUME_DECIMAL_PLACES: u32 = 2;

/// Local, user-correctable input problems
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please select a vehicle.")]
    MissingVehicle,

    #[error("Please enter a valid total cost.")]
    InvalidTotalCost,

    #[error("Please enter a valid price per unit.")]
    InvalidPricePerUnit,

    #[error("Please enter a valid odometer reading.")]
    InvalidOdometer,

    #[error("Odometer reading must be greater than the last recorded reading of {last}.")]
    OdometerNotIncreasing { last: u64 },

    #[error("Please enter a location.")]
    MissingLocation,

    #[error("The total cost and price per unit give a fuel volume of zero. Please check both values.")]
    VolumeTooSmall,

    #[error("Please enter your {0}.")]
    MissingField(&'static str),

    #[error("Please enter a valid email address.")]
    InvalidEmail,

    #[error("Please enter a valid date of birth (YYYY-MM-DD, not in the future).")]
    InvalidDateOfBirth,
}

/// Form state as the user typed it
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FuelLogForm {
    pub vehicle_id: Option<VehicleId>,
    pub total_cost: String,
    pub price_per_unit: String,
    pub odometer: String,
    pub location: String,
    pub payment_method: PaymentMethod,
}

/// Parse a strictly positive decimal
///
/// Accepts plain digits with an optional fractional part (`45`, `45.00`,
/// `.5`). Signs, exponents, separators and blank input are rejected.
pub fn parse_positive_decimal(input: &str) -> Option<Decimal> {
    let trimmed = input.trim();

    let mut seen_dot = false;
    let mut seen_digit = false;
    for c in trimmed.chars() {
        match c {
            '0'..='9' => seen_digit = true,
            '.' if !seen_dot => seen_dot = true,
            _ => return None,
        }
    }
    if !seen_digit {
        return None;
    }

    Decimal::from_str(trimmed)
        .ok()
        .filter(|value| *value > Decimal::ZERO)
}

/// Parse a strictly positive integer
pub fn parse_positive_integer(input: &str) -> Option<u64> {
    let trimmed = input.trim();
    if trimmed.is_empty() || !trimmed.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    trimmed.parse::<u64>().ok().filter(|value| *value > 0)
}

/// Fuel volume bought: `total_cost / price_per_unit`, rounded to 2 places
///
/// Returns `None` when the division is undefined or overflows. Callers only
/// reach this with a validated, positive price.
pub fn derive_volume(total_cost: Decimal, price_per_unit: Decimal) -> Option<Decimal> {
    if price_per_unit <= Decimal::ZERO {
        return None;
    }
    total_cost
        .checked_div(price_per_unit)
        .map(|volume| {
            volume.round_dp_with_strategy(
                VOLUME_DECIMAL_PLACES,
                RoundingStrategy::MidpointAwayFromZero,
            )
        })
}

/// Validate the form and build the entry to submit
///
/// Rules are checked in a fixed order and the first failure is returned:
/// vehicle, total cost, price per unit, odometer, odometer against the last
/// recorded reading, location.
pub fn validate(
    form: &FuelLogForm,
    last_odometer: Option<u64>,
) -> Result<FuelLogEntry, ValidationError> {
    let vehicle_id = form
        .vehicle_id
        .clone()
        .ok_or(ValidationError::MissingVehicle)?;

    let total_cost =
        parse_positive_decimal(&form.total_cost).ok_or(ValidationError::InvalidTotalCost)?;

    let price_per_unit = parse_positive_decimal(&form.price_per_unit)
        .ok_or(ValidationError::InvalidPricePerUnit)?;

    let odometer = parse_positive_integer(&form.odometer).ok_or(ValidationError::InvalidOdometer)?;

    if let Some(last) = last_odometer {
        if odometer <= last {
            return Err(ValidationError::OdometerNotIncreasing { last });
        }
    }

    let location = form.location.trim();
    if location.is_empty() {
        return Err(ValidationError::MissingLocation);
    }

    let fuel_amount = derive_volume(total_cost, price_per_unit)
        .filter(|volume| *volume > Decimal::ZERO)
        .ok_or(ValidationError::VolumeTooSmall)?;

    Ok(FuelLogEntry {
        vehicle_id,
        fuel_amount,
        fuel_cost: total_cost,
        location: location.to_string(),
        odometer,
        payment_method: form.payment_method,
        price_per_unit,
    })
}
