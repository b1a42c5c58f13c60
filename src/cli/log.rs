//! Fuel log CLI command handlers

use std::sync::Arc;

use crate::api::fuel_logs::{FuelLogApi, PaymentMethod};
use crate::api::vehicles::VehicleId;
use crate::cli::commands::LogCommand;
use crate::cli::connect_authenticated;
use crate::error::{FuelLogError, Result};
use crate::workflow::fuel_log::{FetchOutcome, FuelLogWorkflow, SUBMIT_FALLBACK, SUCCESS_MESSAGE};

/// Shown when the last odometer cannot be loaded
const LAST_FALLBACK: &str = "Failed to load the last odometer reading. Please try again.";

/// Handle fuel log commands
pub async fn handle_log(command: LogCommand) -> Result<()> {
    match command {
        LogCommand::Last { vehicle } => handle_last(vehicle).await,
        LogCommand::Add {
            vehicle,
            total_cost,
            price_per_unit,
            odometer,
            location,
            payment,
        } => {
            let form = AddForm {
                vehicle,
                total_cost,
                price_per_unit,
                odometer,
                location,
                payment_method: payment.into(),
            };
            handle_add(form).await
        }
    }
}

/// Raw `log add` arguments
struct AddForm {
    vehicle: String,
    total_cost: String,
    price_per_unit: String,
    odometer: String,
    location: String,
    payment_method: PaymentMethod,
}

/// Parse `--vehicle`; blank input is no selection, `.` and `..` are refused
fn parse_vehicle(input: &str) -> Result<Option<VehicleId>> {
    if input.trim().is_empty() {
        return Ok(None);
    }
    VehicleId::parse(input).map(Some).ok_or_else(|| {
        FuelLogError::InvalidInput(format!("Invalid vehicle id '{}'.", input.trim()))
    })
}

async fn handle_last(vehicle: String) -> Result<()> {
    let vehicle_id = parse_vehicle(&vehicle)?
        .ok_or_else(|| FuelLogError::InvalidInput("Please select a vehicle.".to_string()))?;

    let client = connect_authenticated()?;
    let last = client
        .latest_odometer(&vehicle_id)
        .await
        .map_err(|e| e.into_user_facing(LAST_FALLBACK))?;

    match last {
        Some(odometer) => println!("Last odometer for vehicle {}: {}", vehicle_id, odometer),
        None => println!("No prior record for vehicle {}.", vehicle_id),
    }
    Ok(())
}

async fn handle_add(form: AddForm) -> Result<()> {
    let vehicle_id = parse_vehicle(&form.vehicle)?;
    let client = connect_authenticated()?;
    let mut workflow = FuelLogWorkflow::new(Arc::new(client));

    // No vehicle selected; validation reports it
    if let Some(vehicle_id) = vehicle_id {
        match workflow.select_vehicle(vehicle_id).await {
            Some(FetchOutcome::Ready(snapshot)) => match snapshot.last_odometer {
                Some(last) => println!("Last recorded odometer: {}", last),
                None => println!("No prior record for this vehicle."),
            },
            Some(FetchOutcome::Failed) => {
                eprintln!("Warning: could not load the last odometer reading; it will not be checked.");
            }
            Some(FetchOutcome::Discarded) | None => {}
        }
    }

    workflow.set_total_cost(form.total_cost);
    workflow.set_price_per_unit(form.price_per_unit);
    workflow.set_odometer(form.odometer);
    workflow.set_location(form.location);
    workflow.set_payment_method(form.payment_method);

    let entry = workflow
        .submit()
        .await
        .map_err(|e| e.into_user_facing(SUBMIT_FALLBACK))?;

    println!("✓ {}", SUCCESS_MESSAGE);
    println!();
    println!("  Vehicle:  {}", entry.vehicle_id);
    println!(
        "  Fuel:     {} at {} per unit",
        entry.fuel_amount, entry.price_per_unit
    );
    println!("  Cost:     {} ({})", entry.fuel_cost, entry.payment_method);
    println!("  Odometer: {}", entry.odometer);
    println!("  Location: {}", entry.location);
    Ok(())
}
