//! Wire types for the floor, area, spot and parking-lot endpoints.
//!
//! Request bodies carry integer pixel coordinates (rounded from the editor's
//! `f64` values). Response types are lenient: ids may arrive as strings or
//! numbers, and payloads may or may not be wrapped in `{ "data": ... }`.

use serde::{Deserialize, Deserializer, Serialize};

use crate::models::{
    Area, AreaCapacity, AreaType, Floor, LotStatus, Rect, Spot, VehicleType,
};

/// Round a canvas coordinate for transmission.
pub fn px(value: f64) -> i64 {
    value.round() as i64
}

/// Per-vehicle-type capacity sent with a floor create call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapacityRequest {
    pub vehicle_type: VehicleType,
    pub capacity: u32,
}

/// Body of `POST /floors/{lotId}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FloorCreateRequest {
    pub floor_number: u32,
    pub floor_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_left_x: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_left_y: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<i64>,
    pub capacity_requests: Vec<CapacityRequest>,
}

impl FloorCreateRequest {
    pub fn new(floor: &Floor, capacity_requests: Vec<CapacityRequest>) -> Self {
        let bounds = floor.bounds.as_ref();
        Self {
            floor_number: floor.floor_number,
            floor_name: floor.floor_name.clone(),
            top_left_x: bounds.map(|b| px(b.x)),
            top_left_y: bounds.map(|b| px(b.y)),
            width: bounds.map(|b| px(b.width)),
            height: bounds.map(|b| px(b.height)),
            capacity_requests,
        }
    }
}

/// Body of `PUT /floors/{id}`: the same fields a create sends.
pub type FloorUpdateRequest = FloorCreateRequest;

/// One spot embedded in an area create call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpotRequest {
    pub name: String,
    pub spot_top_left_x: i64,
    pub spot_top_left_y: i64,
    pub spot_width: i64,
    pub spot_height: i64,
}

impl From<&Spot> for SpotRequest {
    fn from(spot: &Spot) -> Self {
        Self {
            name: spot.name.clone(),
            spot_top_left_x: px(spot.rect.x),
            spot_top_left_y: px(spot.rect.y),
            spot_width: px(spot.rect.width),
            spot_height: px(spot.rect.height),
        }
    }
}

/// Body of `POST /areas/{floorId}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AreaCreateRequest {
    pub name: String,
    pub vehicle_type: VehicleType,
    pub area_type: AreaType,
    pub area_top_left_x: i64,
    pub area_top_left_y: i64,
    pub area_width: i64,
    pub area_height: i64,
    pub support_electric_vehicle: bool,
    pub total_spots: u32,
    pub spot_requests: Vec<SpotRequest>,
}

impl From<&Area> for AreaCreateRequest {
    fn from(area: &Area) -> Self {
        Self {
            name: area.name.clone(),
            vehicle_type: area.vehicle_type,
            area_type: area.area_type,
            area_top_left_x: px(area.rect.x),
            area_top_left_y: px(area.rect.y),
            area_width: px(area.rect.width),
            area_height: px(area.rect.height),
            support_electric_vehicle: area.support_electric_vehicle,
            total_spots: area.occupied_spots(),
            spot_requests: area.spots().iter().map(SpotRequest::from).collect(),
        }
    }
}

/// Body of `PUT /areas/{id}`. Spots are not part of an update; removed
/// spots are deleted one by one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AreaUpdateRequest {
    pub name: String,
    pub vehicle_type: VehicleType,
    pub area_type: AreaType,
    pub area_top_left_x: i64,
    pub area_top_left_y: i64,
    pub area_width: i64,
    pub area_height: i64,
    pub support_electric_vehicle: bool,
    pub total_spots: u32,
}

impl From<&Area> for AreaUpdateRequest {
    fn from(area: &Area) -> Self {
        Self {
            name: area.name.clone(),
            vehicle_type: area.vehicle_type,
            area_type: area.area_type,
            area_top_left_x: px(area.rect.x),
            area_top_left_y: px(area.rect.y),
            area_width: px(area.rect.width),
            area_height: px(area.rect.height),
            support_electric_vehicle: area.support_electric_vehicle,
            total_spots: area.occupied_spots(),
        }
    }
}

/// Body of `PUT /parking-lots/{id}` when flipping the status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LotStatusUpdate {
    pub status: LotStatus,
}

/// Accept an id sent as either a JSON string or number.
pub(crate) fn opaque_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number id, got {other}"
        ))),
    }
}

/// Id returned by a create call, plus ids of any nested spots it created.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Created {
    #[serde(deserialize_with = "opaque_id")]
    pub id: String,
    #[serde(default)]
    pub spots: Vec<Created>,
}

/// A floor as listed by `GET /floors?parkingLotId=`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FloorRecord {
    #[serde(deserialize_with = "opaque_id")]
    pub id: String,
    pub floor_number: u32,
    #[serde(default)]
    pub floor_name: String,
    #[serde(default)]
    pub top_left_x: Option<f64>,
    #[serde(default)]
    pub top_left_y: Option<f64>,
    #[serde(default)]
    pub width: Option<f64>,
    #[serde(default)]
    pub height: Option<f64>,
    #[serde(default, alias = "capacityRequests")]
    pub capacities: Vec<CapacityRequest>,
}

impl FloorRecord {
    /// Bounds, only when all four fields are present.
    pub fn bounds(&self) -> Option<Rect> {
        match (self.top_left_x, self.top_left_y, self.width, self.height) {
            (Some(x), Some(y), Some(w), Some(h)) => Some(Rect::new(x, y, w, h)),
            _ => None,
        }
    }
}

/// A spot as listed by `GET /spots?areaId=`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpotRecord {
    #[serde(deserialize_with = "opaque_id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub spot_top_left_x: f64,
    pub spot_top_left_y: f64,
    pub spot_width: f64,
    pub spot_height: f64,
}

impl SpotRecord {
    pub fn into_spot(self) -> Spot {
        let mut spot = Spot::new(
            self.name,
            Rect::new(
                self.spot_top_left_x,
                self.spot_top_left_y,
                self.spot_width,
                self.spot_height,
            ),
        );
        spot.persisted = true;
        spot.backend_id = Some(self.id);
        spot
    }
}

/// An area as listed by `GET /areas?floorId=`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AreaRecord {
    #[serde(deserialize_with = "opaque_id")]
    pub id: String,
    pub name: String,
    pub vehicle_type: VehicleType,
    #[serde(default)]
    pub area_type: AreaType,
    pub area_top_left_x: f64,
    pub area_top_left_y: f64,
    pub area_width: f64,
    pub area_height: f64,
    #[serde(default)]
    pub support_electric_vehicle: bool,
    #[serde(default)]
    pub total_spots: u32,
}

impl AreaRecord {
    /// Build a persisted [`Area`]; `spots` only matter for car areas.
    pub fn into_area(self, spots: Vec<SpotRecord>) -> Area {
        let rect = Rect::new(
            self.area_top_left_x,
            self.area_top_left_y,
            self.area_width,
            self.area_height,
        );
        let mut area = Area::new(
            self.name,
            rect,
            self.vehicle_type,
            self.area_type,
            self.total_spots,
        );
        if let AreaCapacity::Spots { spots: list } = &mut area.capacity {
            list.extend(spots.into_iter().map(SpotRecord::into_spot));
        }
        area.support_electric_vehicle = self.support_electric_vehicle;
        area.backend_id = Some(self.id);
        area
    }
}

/// Payloads arrive either bare or wrapped as `{ "data": ... }`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum Envelope<T> {
    Wrapped { data: T },
    Bare(T),
}

impl<T> Envelope<T> {
    pub(crate) fn into_inner(self) -> T {
        match self {
            Envelope::Wrapped { data } => data,
            Envelope::Bare(inner) => inner,
        }
    }
}
