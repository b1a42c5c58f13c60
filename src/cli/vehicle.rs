//! Vehicle CLI command handlers

use crate::api::vehicles::VehicleApi;
use crate::cli::commands::VehicleCommand;
use crate::cli::connect_authenticated;
use crate::error::Result;

/// Shown when the vehicle list cannot be loaded
const LIST_FALLBACK: &str = "Failed to load vehicles. Please try again.";

/// Handle vehicle commands
pub async fn handle_vehicle(command: VehicleCommand) -> Result<()> {
    match command {
        VehicleCommand::List => handle_list().await,
    }
}

async fn handle_list() -> Result<()> {
    let client = connect_authenticated()?;

    let vehicles = VehicleApi::new(&client)
        .list()
        .await
        .map_err(|e| e.into_user_facing(LIST_FALLBACK))?;

    if vehicles.is_empty() {
        println!("No vehicles found.");
        return Ok(());
    }

    println!("Vehicles:\n");
    for vehicle in vehicles {
        println!("● {}  {}", vehicle.vehicle_id, vehicle.label());
    }

    Ok(())
}
