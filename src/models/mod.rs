//! Serializable domain types shared by the layout, editor and persistence
//! layers.

pub mod floor;
pub mod geometry;
pub mod lot;
pub mod vehicle;

pub use floor::{Area, AreaCapacity, Floor, Hit, Spot, Stroke};
pub use geometry::{Point, Rect};
pub use lot::{LotCapacity, LotStatus, ParkingLot};
pub use vehicle::{AreaType, VehicleType};
