//! Fuel log submission workflow
//!
//! Drives one entry from vehicle selection to submission:
//!
//! ```text
//! Idle ─select─▶ FetchingOdometer ─▶ Ready | FetchError
//!                                        │
//!                                  begin_submit
//!                                        ▼
//!                                   Submitting ─▶ Success | SubmitError
//! ```
//!
//! Each async step is split into a synchronous `begin_*` half that hands out
//! a token and an `apply_*`/`finish_*` half that consumes the result, so a
//! caller can interleave other events while a request is in flight.

use std::sync::Arc;

use crate::api::fuel_logs::{FuelLogApi, FuelLogEntry, PaymentMethod};
use crate::api::vehicles::VehicleId;
use crate::error::{FuelLogError, Result};
use crate::workflow::validation::{self, FuelLogForm};

/// Shown when a submission fails without a backend message
pub const SUBMIT_FALLBACK: &str = "Failed to add fuel log. Please try again.";

/// Shown after a successful submission
pub const SUCCESS_MESSAGE: &str = "Fuel log added successfully!";

/// Where the workflow currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    FetchingOdometer,
    Ready,
    FetchError,
    Submitting,
    Success,
    SubmitError,
}

impl Phase {
    pub fn name(&self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::FetchingOdometer => "fetching-odometer",
            Phase::Ready => "ready",
            Phase::FetchError => "fetch-error",
            Phase::Submitting => "submitting",
            Phase::Success => "success",
            Phase::SubmitError => "submit-error",
        }
    }
}

/// Identifies one odometer lookup
///
/// Only the most recently issued ticket may update the workflow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    pub vehicle_id: VehicleId,
    pub generation: u64,
}

/// Last recorded odometer of the selected vehicle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OdometerSnapshot {
    pub vehicle_id: VehicleId,
    /// `None` when the vehicle has no prior record
    pub last_odometer: Option<u64>,
}

/// What happened to a fetch result
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Snapshot stored; the workflow is Ready
    Ready(OdometerSnapshot),
    /// Lookup failed; the form stays usable without the odometer check
    Failed,
    /// A newer selection superseded this lookup
    Discarded,
}

/// An entry captured by [`FuelLogWorkflow::begin_submit`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingSubmission {
    pub entry: FuelLogEntry,
}

/// Stateful coordinator for adding a fuel log
pub struct FuelLogWorkflow<A: FuelLogApi> {
    api: Arc<A>,
    phase: Phase,
    form: FuelLogForm,
    snapshot: Option<OdometerSnapshot>,
    generation: u64,
    in_flight: Option<FetchTicket>,
    queued_vehicle: Option<VehicleId>,
    last_message: Option<String>,
}

impl<A: FuelLogApi> FuelLogWorkflow<A> {
    pub fn new(api: Arc<A>) -> Self {
        Self {
            api,
            phase: Phase::Idle,
            form: FuelLogForm::default(),
            snapshot: None,
            generation: 0,
            in_flight: None,
            queued_vehicle: None,
            last_message: None,
        }
    }

    // ─── Accessors ───────────────────────────────────────────────────────

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_submitting(&self) -> bool {
        self.phase == Phase::Submitting
    }

    /// Snapshot for the selected vehicle, if one was fetched
    pub fn snapshot(&self) -> Option<&OdometerSnapshot> {
        self.snapshot.as_ref()
    }

    pub fn form(&self) -> &FuelLogForm {
        &self.form
    }

    /// Ticket of the lookup the workflow is waiting for
    pub fn pending_fetch(&self) -> Option<&FetchTicket> {
        self.in_flight.as_ref()
    }

    /// Vehicle selected during a submission, applied once it finishes
    pub fn queued_vehicle(&self) -> Option<&VehicleId> {
        self.queued_vehicle.as_ref()
    }

    /// Most recent user-facing message (validation, success or failure)
    pub fn last_message(&self) -> Option<&str> {
        self.last_message.as_deref()
    }

    // ─── Form fields ─────────────────────────────────────────────────────

    pub fn set_total_cost(&mut self, value: impl Into<String>) {
        self.form.total_cost = value.into();
    }

    pub fn set_price_per_unit(&mut self, value: impl Into<String>) {
        self.form.price_per_unit = value.into();
    }

    pub fn set_odometer(&mut self, value: impl Into<String>) {
        self.form.odometer = value.into();
    }

    pub fn set_location(&mut self, value: impl Into<String>) {
        self.form.location = value.into();
    }

    pub fn set_payment_method(&mut self, method: PaymentMethod) {
        self.form.payment_method = method;
    }

    // ─── Odometer lookup ─────────────────────────────────────────────────

    /// Select a vehicle and start its odometer lookup
    ///
    /// The previous snapshot is dropped and any earlier ticket becomes stale.
    /// While a submission is in flight the selection is queued instead and
    /// `None` is returned.
    pub fn begin_fetch(&mut self, vehicle_id: VehicleId) -> Option<FetchTicket> {
        if self.is_submitting() {
            tracing::debug!(vehicle = %vehicle_id, "submission in flight, queueing vehicle change");
            self.queued_vehicle = Some(vehicle_id);
            return None;
        }

        self.generation += 1;
        let ticket = FetchTicket {
            vehicle_id: vehicle_id.clone(),
            generation: self.generation,
        };

        self.form.vehicle_id = Some(vehicle_id);
        self.snapshot = None;
        self.in_flight = Some(ticket.clone());
        self.phase = Phase::FetchingOdometer;

        Some(ticket)
    }

    /// Apply the result of a lookup started by [`begin_fetch`](Self::begin_fetch)
    pub fn apply_fetch(&mut self, ticket: &FetchTicket, result: Result<Option<u64>>) -> FetchOutcome {
        if self.in_flight.as_ref() != Some(ticket) {
            tracing::debug!(
                vehicle = %ticket.vehicle_id,
                generation = ticket.generation,
                "discarding stale odometer lookup"
            );
            return FetchOutcome::Discarded;
        }
        self.in_flight = None;

        match result {
            Ok(last_odometer) => {
                let snapshot = OdometerSnapshot {
                    vehicle_id: ticket.vehicle_id.clone(),
                    last_odometer,
                };
                self.snapshot = Some(snapshot.clone());
                self.phase = Phase::Ready;
                FetchOutcome::Ready(snapshot)
            }
            Err(e) => {
                tracing::warn!(
                    vehicle = %ticket.vehicle_id,
                    error = %e,
                    "could not fetch last odometer; reading will not be checked"
                );
                self.snapshot = None;
                self.phase = Phase::FetchError;
                FetchOutcome::Failed
            }
        }
    }

    /// Run the lookup for a ticket and apply its result
    pub async fn run_fetch(&mut self, ticket: FetchTicket) -> FetchOutcome {
        let api = Arc::clone(&self.api);
        let result = api.latest_odometer(&ticket.vehicle_id).await;
        self.apply_fetch(&ticket, result)
    }

    /// Select a vehicle and wait for its odometer lookup
    ///
    /// Returns `None` when the selection was queued behind a submission.
    pub async fn select_vehicle(&mut self, vehicle_id: VehicleId) -> Option<FetchOutcome> {
        let ticket = self.begin_fetch(vehicle_id)?;
        Some(self.run_fetch(ticket).await)
    }

    // ─── Submission ──────────────────────────────────────────────────────

    /// Validate the form and enter Submitting
    ///
    /// Refused with [`FuelLogError::Busy`] while a lookup or a submission is
    /// in flight. A validation failure leaves the phase unchanged.
    pub fn begin_submit(&mut self) -> Result<PendingSubmission> {
        if matches!(self.phase, Phase::Submitting | Phase::FetchingOdometer) {
            return Err(FuelLogError::Busy);
        }

        let last_odometer = match (&self.snapshot, &self.form.vehicle_id) {
            (Some(snapshot), Some(vehicle)) if &snapshot.vehicle_id == vehicle => {
                snapshot.last_odometer
            }
            _ => None,
        };

        let entry = match validation::validate(&self.form, last_odometer) {
            Ok(entry) => entry,
            Err(e) => {
                self.last_message = Some(e.to_string());
                return Err(e.into());
            }
        };

        self.phase = Phase::Submitting;
        self.last_message = None;
        Ok(PendingSubmission { entry })
    }

    /// Apply the outcome of a submission
    ///
    /// On success the form and snapshot are cleared. On failure the form is
    /// kept for a retry. A vehicle queued during the submission is selected
    /// afterwards; its ticket is returned so the caller can run the lookup.
    pub fn finish_submit(
        &mut self,
        pending: &PendingSubmission,
        result: Result<()>,
    ) -> (Result<()>, Option<FetchTicket>) {
        let outcome = match result {
            Ok(()) => {
                tracing::info!(
                    vehicle = %pending.entry.vehicle_id,
                    odometer = pending.entry.odometer,
                    "fuel log added"
                );
                self.form = FuelLogForm::default();
                self.snapshot = None;
                self.phase = Phase::Success;
                self.last_message = Some(SUCCESS_MESSAGE.to_string());
                Ok(())
            }
            Err(e) => {
                tracing::warn!(error = %e, "fuel log submission failed");
                self.phase = Phase::SubmitError;
                self.last_message = Some(e.user_message(SUBMIT_FALLBACK));
                Err(e)
            }
        };

        let ticket = self
            .queued_vehicle
            .take()
            .and_then(|vehicle| self.begin_fetch(vehicle));

        (outcome, ticket)
    }

    /// Validate, submit and apply the outcome
    ///
    /// Returns the entry that was sent. A lookup for a vehicle queued during
    /// the submission is run before returning.
    pub async fn submit(&mut self) -> Result<FuelLogEntry> {
        let pending = self.begin_submit()?;

        let api = Arc::clone(&self.api);
        let result = api.submit_fuel_log(&pending.entry).await;

        let (outcome, ticket) = self.finish_submit(&pending, result);
        if let Some(ticket) = ticket {
            self.run_fetch(ticket).await;
        }
        outcome.map(|()| pending.entry)
    }
}

impl<A: FuelLogApi> std::fmt::Debug for FuelLogWorkflow<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FuelLogWorkflow")
            .field("phase", &self.phase)
            .field("form", &self.form)
            .field("snapshot", &self.snapshot)
            .field("in_flight", &self.in_flight)
            .field("queued_vehicle", &self.queued_vehicle)
            .finish()
    }
}
