//! Toll segment and charge identifiers.

use serde::{Deserialize, Serialize};

pub type SegmentId = i64;
pub type ChargeId = i64;

/// Classified stretch of road subject to tolling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TollSegment {
    pub segment_id: SegmentId,
    /// Segment length in meters.
    pub length_m: i64,
    pub start_coordinate: String,
    pub end_coordinate: String,
    pub name: String,
    /// Free-form road class, e.g. `motorway` or `federal_road`.
    pub segment_type: String,
}
