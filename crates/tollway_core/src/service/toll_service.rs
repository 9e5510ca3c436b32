//! Toll-management use-case service.
//!
//! # Responsibility
//! - Provide stable entry points for CLI and embedding callers.
//! - Delegate persistence to repository implementations.
//! - Log one `key=value` event per registration or status write with
//!   duration and outcome.
//!
//! # Invariants
//! - Service APIs never bypass repository validation/persistence contracts.
//! - Logged fields are ids and counts only, never plates or VINs.

use crate::model::on_board_unit::{OnBoardUnit, UnitId, UnitStatus};
use crate::model::toll::{ChargeId, TollSegment};
use crate::model::vehicle::{NewVehicle, Vehicle, VehicleId};
use crate::model::UserId;
use crate::repo::toll_repo::{RepoError, RepoResult, TollRepository};
use log::{error, info, warn};
use std::time::Instant;

/// Use-case service wrapper for toll repository operations.
pub struct TollService<R: TollRepository> {
    repo: R,
}

impl<R: TollRepository> TollService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Registers one vehicle and returns the stored record.
    ///
    /// # Contract
    /// - Validation and constraint errors are returned unchanged.
    /// - The returned `registered_at` is the database insert time.
    pub fn register_vehicle(&self, vehicle: &NewVehicle) -> RepoResult<Vehicle> {
        let started_at = Instant::now();
        let result = self.repo.register_vehicle(vehicle).and_then(|()| {
            self.repo
                .get_vehicle(vehicle.vehicle_id)?
                .ok_or_else(|| {
                    RepoError::InvalidData(format!(
                        "registered vehicle {} not found in read-back",
                        vehicle.vehicle_id
                    ))
                })
        });
        log_write(
            "vehicle_register",
            "vehicle_id",
            vehicle.vehicle_id,
            started_at,
            &result,
        );
        result
    }

    /// Sets the status of one on-board unit.
    pub fn update_unit_status(&self, unit_id: UnitId, status: UnitStatus) -> RepoResult<()> {
        let started_at = Instant::now();
        let result = self.repo.update_unit_status(unit_id, status);
        log_write("unit_status_update", "unit_id", unit_id, started_at, &result);
        result
    }

    /// Deletes one vehicle with its on-board units and their charges.
    ///
    /// The repository logs the `vehicle_delete` event with removed row counts.
    pub fn delete_vehicle(&self, vehicle_id: VehicleId) -> RepoResult<()> {
        self.repo.delete_vehicle(vehicle_id)
    }

    /// Gets the status of one on-board unit.
    pub fn unit_status(&self, unit_id: UnitId) -> RepoResult<Option<UnitStatus>> {
        self.repo.unit_status(unit_id)
    }

    /// Gets the user who owns the vehicle behind one toll charge.
    pub fn user_for_charge(&self, charge_id: ChargeId) -> RepoResult<Option<UserId>> {
        self.repo.user_for_charge(charge_id)
    }

    /// Lists segments of one road class.
    pub fn segments_by_type(&self, segment_type: &str) -> RepoResult<Vec<TollSegment>> {
        self.repo.segments_by_type(segment_type.trim())
    }

    /// Gets one vehicle by id.
    pub fn get_vehicle(&self, vehicle_id: VehicleId) -> RepoResult<Option<Vehicle>> {
        self.repo.get_vehicle(vehicle_id)
    }

    /// Lists on-board units installed in one vehicle.
    pub fn list_units_for_vehicle(&self, vehicle_id: VehicleId) -> RepoResult<Vec<OnBoardUnit>> {
        self.repo.list_units_for_vehicle(vehicle_id)
    }
}

fn log_write<T>(
    event: &str,
    id_key: &str,
    id: i64,
    started_at: Instant,
    result: &RepoResult<T>,
) {
    let duration_ms = started_at.elapsed().as_millis();
    match result {
        Ok(_) => info!(
            "event={event} module=service status=ok {id_key}={id} duration_ms={duration_ms}"
        ),
        Err(err) => {
            let code = error_code(err);
            if is_caller_error(err) {
                warn!(
                    "event={event} module=service status=rejected {id_key}={id} duration_ms={duration_ms} error_code={code} error={err}"
                );
            } else {
                error!(
                    "event={event} module=service status=error {id_key}={id} duration_ms={duration_ms} error_code={code} error={err}"
                );
            }
        }
    }
}

fn is_caller_error(err: &RepoError) -> bool {
    matches!(
        err,
        RepoError::Validation(_)
            | RepoError::VehicleNotFound(_)
            | RepoError::UnitNotFound(_)
            | RepoError::Constraint(_)
    )
}

fn error_code(err: &RepoError) -> &'static str {
    match err {
        RepoError::Validation(_) => "validation_failed",
        RepoError::Db(_) => "db_error",
        RepoError::VehicleNotFound(_) => "vehicle_not_found",
        RepoError::UnitNotFound(_) => "unit_not_found",
        RepoError::Constraint(_) => "constraint_violation",
        RepoError::UnexpectedRowCount { .. } => "unexpected_row_count",
        RepoError::UninitializedConnection { .. }
        | RepoError::MissingRequiredTable(_)
        | RepoError::MissingRequiredColumn { .. } => "connection_not_ready",
        RepoError::InvalidData(_) => "invalid_data",
    }
}

#[cfg(test)]
mod tests {
    use super::{error_code, is_caller_error};
    use crate::model::vehicle::VehicleValidationError;
    use crate::repo::toll_repo::RepoError;

    #[test]
    fn caller_errors_are_separated_from_storage_errors() {
        assert!(is_caller_error(&RepoError::VehicleNotFound(7)));
        assert!(is_caller_error(&RepoError::Validation(
            VehicleValidationError::EmptyLicensePlate
        )));
        assert!(!is_caller_error(&RepoError::InvalidData("x".to_string())));
    }

    #[test]
    fn readiness_failures_share_one_error_code() {
        assert_eq!(
            error_code(&RepoError::MissingRequiredTable("vehicles")),
            "connection_not_ready"
        );
        assert_eq!(
            error_code(&RepoError::UninitializedConnection {
                expected_version: 2,
                actual_version: 0
            }),
            "connection_not_ready"
        );
    }
}
