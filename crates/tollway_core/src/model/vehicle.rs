//! Vehicle domain model.
//!
//! # Responsibility
//! - Define the registration input (`NewVehicle`) and stored read model
//!   (`Vehicle`).
//! - Validate registration input before it reaches SQL.
//!
//! # Invariants
//! - `vin` is a 17 character vehicle identification number without `I`, `O`
//!   or `Q`.
//! - A vehicle has at least two axles and a positive weight.
//! - `registration_country` is an international vehicle registration code.

use crate::model::UserId;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Stable identifier of one vehicle.
pub type VehicleId = i64;

/// Emission class key (`emission_classes.emission_class_id`).
pub type EmissionClassId = i64;

const MAX_LICENSE_PLATE_CHARS: usize = 10;
const MIN_AXLES: u32 = 2;

static VIN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-HJ-NPR-Z0-9]{17}$").expect("valid vin regex"));
static COUNTRY_CODE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z]{1,3}$").expect("valid country code regex"));

/// Validation failures for vehicle registration input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VehicleValidationError {
    EmptyLicensePlate,
    LicensePlateTooLong { max_chars: usize },
    InvalidVin(String),
    TooFewAxles { axles: u32, min: u32 },
    NonPositiveWeight(i64),
    InvalidCountryCode(String),
}

impl Display for VehicleValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyLicensePlate => write!(f, "license plate cannot be empty"),
            Self::LicensePlateTooLong { max_chars } => {
                write!(f, "license plate exceeds {max_chars} characters")
            }
            Self::InvalidVin(vin) => write!(f, "invalid vehicle identification number `{vin}`"),
            Self::TooFewAxles { axles, min } => {
                write!(f, "vehicle needs at least {min} axles, got {axles}")
            }
            Self::NonPositiveWeight(weight) => {
                write!(f, "vehicle weight must be positive, got {weight}")
            }
            Self::InvalidCountryCode(code) => {
                write!(f, "invalid registration country code `{code}`")
            }
        }
    }
}

impl Error for VehicleValidationError {}

/// Registration input for one vehicle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewVehicle {
    pub vehicle_id: VehicleId,
    pub emission_class_id: EmissionClassId,
    /// Owning user.
    pub user_id: UserId,
    pub license_plate: String,
    pub vin: String,
    pub axles: u32,
    pub weight_kg: i64,
    pub registration_country: String,
}

impl NewVehicle {
    /// Validates registration input.
    ///
    /// Checks run in field order and the first failure is returned.
    pub fn validate(&self) -> Result<(), VehicleValidationError> {
        let plate = self.license_plate.trim();
        if plate.is_empty() {
            return Err(VehicleValidationError::EmptyLicensePlate);
        }
        if plate.chars().count() > MAX_LICENSE_PLATE_CHARS {
            return Err(VehicleValidationError::LicensePlateTooLong {
                max_chars: MAX_LICENSE_PLATE_CHARS,
            });
        }
        if !VIN_RE.is_match(&self.vin) {
            return Err(VehicleValidationError::InvalidVin(self.vin.clone()));
        }
        if self.axles < MIN_AXLES {
            return Err(VehicleValidationError::TooFewAxles {
                axles: self.axles,
                min: MIN_AXLES,
            });
        }
        if self.weight_kg <= 0 {
            return Err(VehicleValidationError::NonPositiveWeight(self.weight_kg));
        }
        if !COUNTRY_CODE_RE.is_match(&self.registration_country) {
            return Err(VehicleValidationError::InvalidCountryCode(
                self.registration_country.clone(),
            ));
        }
        Ok(())
    }
}

/// Stored vehicle read model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vehicle {
    pub vehicle_id: VehicleId,
    pub emission_class_id: EmissionClassId,
    pub user_id: UserId,
    pub license_plate: String,
    pub vin: String,
    pub axles: u32,
    pub weight_kg: i64,
    pub registration_country: String,
    /// Epoch ms, set by the database on insert.
    pub registered_at: i64,
    /// Epoch ms, `None` while the vehicle is registered.
    pub deregistered_at: Option<i64>,
}

impl Vehicle {
    /// Returns whether the vehicle is still registered for tolling.
    pub fn is_registered(&self) -> bool {
        self.deregistered_at.is_none()
    }
}
