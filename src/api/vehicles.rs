//! Vehicle reference data

use serde::{Deserialize, Serialize};

use crate::api::client::ApiClient;
use crate::error::Result;

/// Vehicle list endpoint
pub const VEHICLES_PATH: &str = "/vehicles";

/// Backend identifier of a vehicle
///
/// The backend may use numeric or string identifiers; the value is sent
/// back in the same JSON form it arrived in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VehicleId {
    Number(u64),
    Text(String),
}

impl VehicleId {
    /// Parse user input
    ///
    /// Canonical digits (`42`) become a numeric id. Anything else is text,
    /// including digits with a leading zero (`007`), which would not survive
    /// a round trip through a number. Wrap the input in double quotes
    /// (`"42"`) to force a text id. Empty input, `.` and `..` are refused.
    pub fn parse(input: &str) -> Option<Self> {
        let trimmed = input.trim();

        let id = match trimmed
            .strip_prefix('"')
            .and_then(|rest| rest.strip_suffix('"'))
        {
            Some(quoted) => VehicleId::Text(quoted.to_string()),
            None => match trimmed.parse::<u64>() {
                Ok(n) if n.to_string() == trimmed => VehicleId::Number(n),
                _ => VehicleId::Text(trimmed.to_string()),
            },
        };

        match &id {
            VehicleId::Text(text) if matches!(text.as_str(), "" | "." | "..") => None,
            _ => Some(id),
        }
    }
}

impl std::fmt::Display for VehicleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VehicleId::Number(n) => write!(f, "{}", n),
            VehicleId::Text(s) => write!(f, "{}", s),
        }
    }
}

/// A vehicle owned by the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vehicle {
    pub vehicle_id: VehicleId,
    #[serde(default)]
    pub make: String,
    #[serde(default)]
    pub plate_number: String,
}

impl Vehicle {
    /// Selection list label, e.g. `Toyota (ABC-123)`
    pub fn label(&self) -> String {
        format!("{} ({})", self.make, self.plate_number)
    }
}

/// Handler for vehicle operations
pub struct VehicleApi<'a> {
    client: &'a ApiClient,
}

impl<'a> VehicleApi<'a> {
    /// Create a new vehicle handler
    pub fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// List the vehicles available to the current user
    ///
    /// A `null` or empty body is an empty list.
    pub async fn list(&self) -> Result<Vec<Vehicle>> {
        let response = self.client.get(VEHICLES_PATH).await?;
        Ok(response.json_opt::<Vec<Vehicle>>()?.unwrap_or_default())
    }
}
