//! Fuel log endpoints
//!
//! Reads the last recorded odometer for a vehicle and submits new entries.
//! [`FuelLogApi`] is the seam the workflow talks to, so it can run against a
//! mock in tests.

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::api::client::ApiClient;
use crate::api::vehicles::VehicleId;
use crate::error::{FuelLogError, Result};

/// Fuel log collection endpoint
pub const FUEL_LOGS_PATH: &str = "/fuel-logs";

/// How the purchase was paid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum PaymentMethod {
    #[default]
    Cash,
    #[serde(rename = "Credit Card")]
    CreditCard,
    #[serde(rename = "Fuel Card")]
    FuelCard,
}

impl PaymentMethod {
    /// Label used on the wire and in output
    pub fn label(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "Cash",
            PaymentMethod::CreditCard => "Credit Card",
            PaymentMethod::FuelCard => "Fuel Card",
        }
    }
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// A validated fuel log, serialized as the `POST /fuel-logs` body
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FuelLogEntry {
    pub vehicle_id: VehicleId,
    /// Derived volume, rounded to 2 decimal places
    #[serde(with = "rust_decimal::serde::float")]
    pub fuel_amount: Decimal,
    /// Total cost of the purchase
    #[serde(with = "rust_decimal::serde::float")]
    pub fuel_cost: Decimal,
    pub location: String,
    pub odometer: u64,
    pub payment_method: PaymentMethod,
    /// Price per unit the volume was derived from (not sent)
    #[serde(skip)]
    pub price_per_unit: Decimal,
}

/// Body of `GET /fuel-logs/latest/{vehicleId}`
#[derive(Debug, Deserialize)]
struct LatestOdometerResponse {
    #[serde(default)]
    odometer: Option<serde_json::Number>,
}

/// Backend operations the fuel log workflow depends on
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FuelLogApi: Send + Sync {
    /// Last recorded odometer for a vehicle, `None` when there is no record
    async fn latest_odometer(&self, vehicle_id: &VehicleId) -> Result<Option<u64>>;

    /// Submit one entry
    async fn submit_fuel_log(&self, entry: &FuelLogEntry) -> Result<()>;
}

#[async_trait]
impl FuelLogApi for ApiClient {
    async fn latest_odometer(&self, vehicle_id: &VehicleId) -> Result<Option<u64>> {
        let url = self.endpoint_segments(latest_odometer_segments(vehicle_id))?;
        match self.get_optional_url(url).await? {
            Some(response) => {
                let parsed = response.json_opt::<LatestOdometerResponse>()?;
                parse_odometer(parsed.and_then(|r| r.odometer))
            }
            None => Ok(None),
        }
    }

    async fn submit_fuel_log(&self, entry: &FuelLogEntry) -> Result<()> {
        tracing::info!(
            vehicle = %entry.vehicle_id,
            odometer = entry.odometer,
            "submitting fuel log"
        );
        self.post(FUEL_LOGS_PATH, entry).await?;
        Ok(())
    }
}

/// Path segments of the latest-odometer lookup for a vehicle
///
/// The id is always the last single segment, whatever characters it holds.
pub fn latest_odometer_segments(vehicle_id: &VehicleId) -> [String; 3] {
    [
        FUEL_LOGS_PATH.trim_start_matches('/').to_string(),
        "latest".to_string(),
        vehicle_id.to_string(),
    ]
}

/// Convert the JSON odometer value to an integer reading
///
/// Whole-valued floats (`10000.0`) are accepted; fractions and negatives
/// are a decode error rather than being rounded.
fn parse_odometer(value: Option<serde_json::Number>) -> Result<Option<u64>> {
    let Some(number) = value else {
        return Ok(None);
    };

    if let Some(n) = number.as_u64() {
        return Ok(Some(n));
    }

    match number.as_f64() {
        Some(f) if f >= 0.0 && f.fract() == 0.0 && f <= u64::MAX as f64 => Ok(Some(f as u64)),
        _ => Err(FuelLogError::Decode(format!(
            "odometer value {} is not a whole non-negative number",
            number
        ))),
    }
}
