//! On-board unit model.

use crate::model::vehicle::VehicleId;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Stable identifier of one on-board unit.
pub type UnitId = i64;

/// Collection state of an on-board unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitStatus {
    /// Unit reports journeys and is charged for them.
    Active,
    /// Unit is switched off or withdrawn from collection.
    Inactive,
}

impl UnitStatus {
    /// Persisted text form used in `on_board_units.status`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
        }
    }
}

impl Display for UnitStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UnitStatus {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "active" => Ok(Self::Active),
            "inactive" => Ok(Self::Inactive),
            other => Err(format!(
                "unsupported unit status `{other}`; expected active|inactive"
            )),
        }
    }
}

/// On-board unit read model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnBoardUnit {
    pub unit_id: UnitId,
    /// Vehicle the unit is installed in.
    pub vehicle_id: VehicleId,
    pub status: UnitStatus,
    /// Epoch ms installation timestamp.
    pub installed_at: i64,
    /// Epoch ms removal timestamp, `None` while still installed.
    pub removed_at: Option<i64>,
}
