//! Vehicle and access-policy enums shared by floors, areas and the lot.
//!
//! Both enums travel over the wire as upper-snake-case tokens
//! (e.g. `"CAR_UP_TO_9_SEATS"`, `"WALK_IN_ONLY"`).

use std::fmt;

use serde::{Deserialize, Serialize};

/// The kind of vehicle an area (or a floor permission) is dedicated to.
///
/// Ordering follows declaration order so that sets of vehicle types iterate
/// deterministically (cars first).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VehicleType {
    #[serde(rename = "CAR_UP_TO_9_SEATS", alias = "CAR")]
    CarUpTo9Seats,
    Motorbike,
    Bike,
    Other,
}

impl VehicleType {
    pub const ALL: [VehicleType; 4] = [
        VehicleType::CarUpTo9Seats,
        VehicleType::Motorbike,
        VehicleType::Bike,
        VehicleType::Other,
    ];

    /// Cars are tracked spot by spot; every other type only as a total.
    pub fn tracks_individual_spots(self) -> bool {
        matches!(self, VehicleType::CarUpTo9Seats)
    }

    /// Upper-snake-case wire token.
    pub fn as_token(self) -> &'static str {
        match self {
            VehicleType::CarUpTo9Seats => "CAR_UP_TO_9_SEATS",
            VehicleType::Motorbike => "MOTORBIKE",
            VehicleType::Bike => "BIKE",
            VehicleType::Other => "OTHER",
        }
    }
}

impl fmt::Display for VehicleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_token())
    }
}

/// Access policy of an area.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AreaType {
    #[default]
    WalkInOnly,
    SubscriptionOnly,
    EmergencyOnly,
}
