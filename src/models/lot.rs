//! Parking lot metadata as seen by the layout editor.
//!
//! The lot itself is owned by the backend; the editor only reads its
//! registered capacities, floor count and status, and flips the status once
//! a layout has been saved.

use serde::{Deserialize, Deserializer, Serialize};

use super::VehicleType;

/// Lifecycle status of a parking lot.
///
/// Only [`LotStatus::Preparing`] and [`LotStatus::MapDenied`] allow the map
/// to be drawn, reset, or have floors removed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LotStatus {
    #[default]
    Preparing,
    MapDenied,
    PartnerConfiguration,
    Pending,
    Active,
    Inactive,
    #[serde(other)]
    Unknown,
}

impl LotStatus {
    pub fn allows_map_editing(&self) -> bool {
        matches!(self, LotStatus::Preparing | LotStatus::MapDenied)
    }

    pub fn as_token(&self) -> &'static str {
        match self {
            LotStatus::Preparing => "PREPARING",
            LotStatus::MapDenied => "MAP_DENIED",
            LotStatus::PartnerConfiguration => "PARTNER_CONFIGURATION",
            LotStatus::Pending => "PENDING",
            LotStatus::Active => "ACTIVE",
            LotStatus::Inactive => "INACTIVE",
            LotStatus::Unknown => "UNKNOWN",
        }
    }
}

/// One externally-registered capacity entry of a lot.
///
/// The backend has been seen to send `capacity` as a number, a numeric
/// string, or `null`; anything that is not a non-negative integer counts as 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LotCapacity {
    pub vehicle_type: VehicleType,
    #[serde(default, deserialize_with = "lenient_count")]
    pub capacity: u32,
}

impl LotCapacity {
    pub fn new(vehicle_type: VehicleType, capacity: u32) -> Self {
        Self {
            vehicle_type,
            capacity,
        }
    }
}

fn lenient_count<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    let count = match value {
        serde_json::Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64))
            .unwrap_or(0),
        serde_json::Value::String(s) => s.trim().parse::<u64>().unwrap_or(0),
        _ => 0,
    };
    Ok(u32::try_from(count).unwrap_or(u32::MAX))
}

/// The parking lot a layout document belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParkingLot {
    pub id: String,
    #[serde(default)]
    pub name: String,
    /// Highest floor number the lot is registered with.
    pub total_floors: u32,
    #[serde(default)]
    pub status: LotStatus,
    #[serde(default)]
    pub capacities: Vec<LotCapacity>,
}
