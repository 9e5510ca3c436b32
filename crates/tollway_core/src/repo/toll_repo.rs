//! Toll repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide the lookup/insert/update/delete operations of toll management
//!   over one shared connection.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Vehicle writes call `NewVehicle::validate()` before SQL mutations.
//! - `delete_vehicle` removes charges, units and the vehicle in one
//!   transaction; on any failure none of the three tables change.
//! - Read paths reject invalid persisted state instead of masking it.

use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::model::on_board_unit::{OnBoardUnit, UnitId, UnitStatus};
use crate::model::toll::{ChargeId, TollSegment};
use crate::model::vehicle::{NewVehicle, Vehicle, VehicleId, VehicleValidationError};
use crate::model::UserId;
use log::{error, info};
use rusqlite::{
    params, Connection, ErrorCode, OptionalExtension, Row, Transaction, TransactionBehavior,
};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

const VEHICLE_SELECT_SQL: &str = "SELECT
    vehicle_id,
    emission_class_id,
    user_id,
    license_plate,
    vin,
    axles,
    weight_kg,
    registration_country,
    registered_at,
    deregistered_at
FROM vehicles";

const REQUIRED_COLUMNS: &[(&str, &[&str])] = &[
    (
        "vehicles",
        &[
            "vehicle_id",
            "emission_class_id",
            "user_id",
            "license_plate",
            "vin",
            "axles",
            "weight_kg",
            "registration_country",
            "registered_at",
            "deregistered_at",
        ],
    ),
    (
        "on_board_units",
        &["unit_id", "vehicle_id", "status", "installed_at", "removed_at"],
    ),
    (
        "toll_charges",
        &[
            "charge_id",
            "segment_id",
            "unit_id",
            "category_id",
            "driven_at",
            "cost_cents",
        ],
    ),
    (
        "toll_segments",
        &[
            "segment_id",
            "length_m",
            "start_coordinate",
            "end_coordinate",
            "name",
            "segment_type",
        ],
    ),
];

pub type RepoResult<T> = Result<T, RepoError>;

/// Errors from toll repository operations.
#[derive(Debug)]
pub enum RepoError {
    /// Vehicle input rejected before reaching SQL.
    Validation(VehicleValidationError),
    /// Underlying SQLite/bootstrap error.
    Db(DbError),
    VehicleNotFound(VehicleId),
    UnitNotFound(UnitId),
    /// Write rejected by a primary key, unique, foreign key or check constraint.
    Constraint(String),
    /// A single-row write touched a different number of rows.
    UnexpectedRowCount {
        operation: &'static str,
        expected: usize,
        actual: usize,
    },
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
    /// Persisted data cannot be converted to a valid read model.
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::VehicleNotFound(id) => write!(f, "vehicle not found: {id}"),
            Self::UnitNotFound(id) => write!(f, "on-board unit not found: {id}"),
            Self::Constraint(message) => write!(f, "constraint violation: {message}"),
            Self::UnexpectedRowCount {
                operation,
                expected,
                actual,
            } => write!(
                f,
                "{operation} affected {actual} rows (expected {expected})"
            ),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "toll repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "toll repository requires table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => write!(
                f,
                "toll repository requires column `{column}` in table `{table}`"
            ),
            Self::InvalidData(message) => write!(f, "invalid persisted toll data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<VehicleValidationError> for RepoError {
    fn from(value: VehicleValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for toll management.
pub trait TollRepository {
    /// Loads the status of one on-board unit, `None` when the unit is unknown.
    fn unit_status(&self, unit_id: UnitId) -> RepoResult<Option<UnitStatus>>;
    /// Resolves the user owning the vehicle that incurred one toll charge.
    fn user_for_charge(&self, charge_id: ChargeId) -> RepoResult<Option<UserId>>;
    /// Inserts one vehicle with the current time as registration date.
    fn register_vehicle(&self, vehicle: &NewVehicle) -> RepoResult<()>;
    /// Sets the status of one on-board unit.
    fn update_unit_status(&self, unit_id: UnitId, status: UnitStatus) -> RepoResult<()>;
    /// Deletes one vehicle together with its units and their charges.
    fn delete_vehicle(&self, vehicle_id: VehicleId) -> RepoResult<()>;
    /// Lists segments of one road class ordered by segment id.
    fn segments_by_type(&self, segment_type: &str) -> RepoResult<Vec<TollSegment>>;
    /// Loads one vehicle by id.
    fn get_vehicle(&self, vehicle_id: VehicleId) -> RepoResult<Option<Vehicle>>;
    /// Lists on-board units installed in one vehicle ordered by unit id.
    fn list_units_for_vehicle(&self, vehicle_id: VehicleId) -> RepoResult<Vec<OnBoardUnit>>;
}

/// SQLite-backed toll repository bound to one connection.
pub struct SqliteTollRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTollRepository<'conn> {
    /// Binds the repository to a migrated connection.
    ///
    /// # Errors
    /// - `UninitializedConnection` when migrations were not applied.
    /// - `MissingRequiredTable` / `MissingRequiredColumn` when the schema
    ///   does not match the toll layout.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_toll_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl TollRepository for SqliteTollRepository<'_> {
    fn unit_status(&self, unit_id: UnitId) -> RepoResult<Option<UnitStatus>> {
        let status: Option<String> = self
            .conn
            .query_row(
                "SELECT status
                 FROM on_board_units
                 WHERE unit_id = ?1;",
                [unit_id],
                |row| row.get(0),
            )
            .optional()?;

        status
            .map(|value| parse_unit_status(&value))
            .transpose()
    }

    fn user_for_charge(&self, charge_id: ChargeId) -> RepoResult<Option<UserId>> {
        let user_id = self
            .conn
            .query_row(
                "SELECT v.user_id
                 FROM toll_charges c
                 INNER JOIN on_board_units u ON c.unit_id = u.unit_id
                 INNER JOIN vehicles v ON u.vehicle_id = v.vehicle_id
                 WHERE c.charge_id = ?1;",
                [charge_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(user_id)
    }

    fn register_vehicle(&self, vehicle: &NewVehicle) -> RepoResult<()> {
        vehicle.validate()?;

        let affected = self
            .conn
            .execute(
                "INSERT INTO vehicles (
                    vehicle_id,
                    emission_class_id,
                    user_id,
                    license_plate,
                    vin,
                    axles,
                    weight_kg,
                    registration_country,
                    registered_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, (strftime('%s', 'now') * 1000));",
                params![
                    vehicle.vehicle_id,
                    vehicle.emission_class_id,
                    vehicle.user_id,
                    vehicle.license_plate.trim(),
                    vehicle.vin.as_str(),
                    vehicle.axles,
                    vehicle.weight_kg,
                    vehicle.registration_country.as_str(),
                ],
            )
            .map_err(map_write_error)?;

        if affected != 1 {
            return Err(RepoError::UnexpectedRowCount {
                operation: "register_vehicle",
                expected: 1,
                actual: affected,
            });
        }

        Ok(())
    }

    fn update_unit_status(&self, unit_id: UnitId, status: UnitStatus) -> RepoResult<()> {
        let changed = self
            .conn
            .execute(
                "UPDATE on_board_units
                 SET status = ?2
                 WHERE unit_id = ?1;",
                params![unit_id, status.as_str()],
            )
            .map_err(map_write_error)?;

        if changed == 0 {
            return Err(RepoError::UnitNotFound(unit_id));
        }

        Ok(())
    }

    fn delete_vehicle(&self, vehicle_id: VehicleId) -> RepoResult<()> {
        let started_at = Instant::now();

        match delete_vehicle_in_transaction(self.conn, vehicle_id) {
            Ok(removed) => {
                info!(
                    "event=vehicle_delete module=repo status=ok vehicle_id={vehicle_id} charges_removed={} units_removed={} duration_ms={}",
                    removed.charges,
                    removed.units,
                    started_at.elapsed().as_millis()
                );
                Ok(())
            }
            Err(err) => {
                error!(
                    "event=vehicle_delete module=repo status=error vehicle_id={vehicle_id} duration_ms={} error_code=rolled_back error={}",
                    started_at.elapsed().as_millis(),
                    err
                );
                Err(err)
            }
        }
    }

    fn segments_by_type(&self, segment_type: &str) -> RepoResult<Vec<TollSegment>> {
        let mut stmt = self.conn.prepare(
            "SELECT
                segment_id,
                length_m,
                start_coordinate,
                end_coordinate,
                name,
                segment_type
             FROM toll_segments
             WHERE segment_type = ?1
             ORDER BY segment_id ASC;",
        )?;

        let mut rows = stmt.query([segment_type])?;
        let mut segments = Vec::new();
        while let Some(row) = rows.next()? {
            segments.push(TollSegment {
                segment_id: row.get("segment_id")?,
                length_m: row.get("length_m")?,
                start_coordinate: row.get("start_coordinate")?,
                end_coordinate: row.get("end_coordinate")?,
                name: row.get("name")?,
                segment_type: row.get("segment_type")?,
            });
        }
        Ok(segments)
    }

    fn get_vehicle(&self, vehicle_id: VehicleId) -> RepoResult<Option<Vehicle>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{VEHICLE_SELECT_SQL} WHERE vehicle_id = ?1;"))?;

        let mut rows = stmt.query([vehicle_id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_vehicle_row(row)?));
        }

        Ok(None)
    }

    fn list_units_for_vehicle(&self, vehicle_id: VehicleId) -> RepoResult<Vec<OnBoardUnit>> {
        let mut stmt = self.conn.prepare(
            "SELECT
                unit_id,
                vehicle_id,
                status,
                installed_at,
                removed_at
             FROM on_board_units
             WHERE vehicle_id = ?1
             ORDER BY unit_id ASC;",
        )?;

        let mut rows = stmt.query([vehicle_id])?;
        let mut units = Vec::new();
        while let Some(row) = rows.next()? {
            let status_text: String = row.get("status")?;
            units.push(OnBoardUnit {
                unit_id: row.get("unit_id")?,
                vehicle_id: row.get("vehicle_id")?,
                status: parse_unit_status(&status_text)?,
                installed_at: row.get("installed_at")?,
                removed_at: row.get("removed_at")?,
            });
        }
        Ok(units)
    }
}

struct RemovedRows {
    charges: usize,
    units: usize,
}

// Dropping `tx` without commit rolls back; the connection is back in
// autocommit mode on every return path.
fn delete_vehicle_in_transaction(
    conn: &Connection,
    vehicle_id: VehicleId,
) -> RepoResult<RemovedRows> {
    let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate)?;
    let removed = delete_vehicle_cascade(&tx, vehicle_id)?;
    tx.commit()?;
    Ok(removed)
}

fn delete_vehicle_cascade(conn: &Connection, vehicle_id: VehicleId) -> RepoResult<RemovedRows> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM vehicles WHERE vehicle_id = ?1);",
        [vehicle_id],
        |row| row.get(0),
    )?;
    if exists == 0 {
        return Err(RepoError::VehicleNotFound(vehicle_id));
    }

    let charges = conn.execute(
        "DELETE FROM toll_charges
         WHERE unit_id IN (
            SELECT unit_id
            FROM on_board_units
            WHERE vehicle_id = ?1
         );",
        [vehicle_id],
    )?;

    let units = conn.execute(
        "DELETE FROM on_board_units
         WHERE vehicle_id = ?1;",
        [vehicle_id],
    )?;

    let vehicles = conn
        .execute("DELETE FROM vehicles WHERE vehicle_id = ?1;", [vehicle_id])
        .map_err(map_write_error)?;
    if vehicles != 1 {
        return Err(RepoError::UnexpectedRowCount {
            operation: "delete_vehicle",
            expected: 1,
            actual: vehicles,
        });
    }

    Ok(RemovedRows { charges, units })
}

fn parse_vehicle_row(row: &Row<'_>) -> RepoResult<Vehicle> {
    Ok(Vehicle {
        vehicle_id: row.get("vehicle_id")?,
        emission_class_id: row.get("emission_class_id")?,
        user_id: row.get("user_id")?,
        license_plate: row.get("license_plate")?,
        vin: row.get("vin")?,
        axles: row.get("axles")?,
        weight_kg: row.get("weight_kg")?,
        registration_country: row.get("registration_country")?,
        registered_at: row.get("registered_at")?,
        deregistered_at: row.get("deregistered_at")?,
    })
}

fn parse_unit_status(value: &str) -> RepoResult<UnitStatus> {
    match value {
        "active" => Ok(UnitStatus::Active),
        "inactive" => Ok(UnitStatus::Inactive),
        other => Err(RepoError::InvalidData(format!(
            "invalid unit status `{other}` in on_board_units.status"
        ))),
    }
}

fn map_write_error(err: rusqlite::Error) -> RepoError {
    match err {
        rusqlite::Error::SqliteFailure(failure, message)
            if failure.code == ErrorCode::ConstraintViolation =>
        {
            RepoError::Constraint(message.unwrap_or_else(|| failure.to_string()))
        }
        other => other.into(),
    }
}

fn ensure_toll_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    for &(table, columns) in REQUIRED_COLUMNS {
        if !table_exists(conn, table)? {
            return Err(RepoError::MissingRequiredTable(table));
        }
        for &column in columns {
            if !table_has_column(conn, table, column)? {
                return Err(RepoError::MissingRequiredColumn { table, column });
            }
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}
