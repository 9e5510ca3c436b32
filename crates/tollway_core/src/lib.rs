//! Core data access for Tollway toll management.
//! Owns the toll schema and every SQL statement that touches it.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::on_board_unit::{OnBoardUnit, UnitId, UnitStatus};
pub use model::toll::{ChargeId, SegmentId, TollSegment};
pub use model::vehicle::{EmissionClassId, NewVehicle, Vehicle, VehicleId, VehicleValidationError};
pub use model::UserId;
pub use repo::toll_repo::{RepoError, RepoResult, SqliteTollRepository, TollRepository};
pub use service::toll_service::TollService;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
