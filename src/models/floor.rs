//! Floor, area and spot data model.
//!
//! A [`Floor`] owns its [`Area`]s in drawing order; an area's capacity is
//! either an explicit list of [`Spot`]s (cars) or a bare total (every other
//! vehicle type). The split is encoded in [`AreaCapacity`] so a non-car area
//! can never hold spots.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{AreaType, Point, Rect, VehicleType};

/// A single car parking space. `rect` is relative to the parent area origin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Spot {
    pub id: Uuid,
    pub name: String,
    pub rect: Rect,
    /// `true` once the backend is known to hold this spot.
    #[serde(default)]
    pub persisted: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backend_id: Option<String>,
}

impl Spot {
    pub fn new(name: impl Into<String>, rect: Rect) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            rect,
            persisted: false,
            backend_id: None,
        }
    }
}

/// How an area accounts for its capacity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "capacityMode", rename_all = "snake_case")]
pub enum AreaCapacity {
    /// Individually placed spots (car areas).
    Spots { spots: Vec<Spot> },
    /// An aggregate count (motorbike, bike and other areas).
    Total {
        #[serde(rename = "totalSpots")]
        total_spots: u32,
    },
}

/// A rectangular region of a floor dedicated to one vehicle type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Area {
    pub id: Uuid,
    pub name: String,
    pub rect: Rect,
    pub vehicle_type: VehicleType,
    pub area_type: AreaType,
    #[serde(default)]
    pub support_electric_vehicle: bool,
    #[serde(flatten)]
    pub capacity: AreaCapacity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backend_id: Option<String>,
    /// Saved area whose fields changed locally since the last save.
    #[serde(default)]
    pub modified: bool,
}

impl Area {
    /// Create a new, unsaved area. Car areas start with no spots; other
    /// vehicle types start with `total_spots`.
    pub fn new(
        name: impl Into<String>,
        rect: Rect,
        vehicle_type: VehicleType,
        area_type: AreaType,
        total_spots: u32,
    ) -> Self {
        let capacity = if vehicle_type.tracks_individual_spots() {
            AreaCapacity::Spots { spots: Vec::new() }
        } else {
            AreaCapacity::Total { total_spots }
        };
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            rect,
            vehicle_type,
            area_type,
            support_electric_vehicle: false,
            capacity,
            backend_id: None,
            modified: false,
        }
    }

    /// Effective occupied-spot count: the spot list length for car areas,
    /// the declared total otherwise.
    pub fn occupied_spots(&self) -> u32 {
        match &self.capacity {
            AreaCapacity::Spots { spots } => u32::try_from(spots.len()).unwrap_or(u32::MAX),
            AreaCapacity::Total { total_spots } => *total_spots,
        }
    }

    /// Placed spots; always empty for areas that only keep a total.
    pub fn spots(&self) -> &[Spot] {
        match &self.capacity {
            AreaCapacity::Spots { spots } => spots,
            AreaCapacity::Total { .. } => &[],
        }
    }

    /// Mutable spot list; `None` for areas that do not track spots.
    pub fn spots_mut(&mut self) -> Option<&mut Vec<Spot>> {
        match &mut self.capacity {
            AreaCapacity::Spots { spots } => Some(spots),
            AreaCapacity::Total { .. } => None,
        }
    }

    /// `true` once the backend holds this area.
    pub fn is_persisted(&self) -> bool {
        self.backend_id.is_some()
    }

    /// Flag a saved area as needing an update on the next save. Unsaved
    /// areas are sent whole anyway.
    pub fn mark_modified(&mut self) {
        if self.is_persisted() {
            self.modified = true;
        }
    }

    /// Absolute canvas rectangle of one of this area's spots.
    pub fn absolute_spot_rect(&self, spot: &Spot) -> Rect {
        Rect::new(
            self.rect.x + spot.rect.x,
            self.rect.y + spot.rect.y,
            spot.rect.width,
            spot.rect.height,
        )
    }
}

/// A free-hand annotation stroke. Purely visual; never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stroke {
    pub id: Uuid,
    pub points: Vec<Point>,
}

impl Stroke {
    pub fn starting_at(p: Point) -> Self {
        Self {
            id: Uuid::new_v4(),
            points: vec![p],
        }
    }

    /// `true` when any point of the stroke lies within `radius` of `p`.
    pub fn passes_near(&self, p: Point, radius: f64) -> bool {
        self.points.iter().any(|q| q.distance_to(p) <= radius)
    }
}

/// What a pointer position landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hit {
    Area(Uuid),
    Spot { area_id: Uuid, spot_id: Uuid },
}

/// One level of the parking lot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Floor {
    pub floor_number: u32,
    pub floor_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounds: Option<Rect>,
    pub allowed_vehicle_types: BTreeSet<VehicleType>,
    #[serde(default)]
    pub areas: Vec<Area>,
    #[serde(default)]
    pub strokes: Vec<Stroke>,
    #[serde(default)]
    pub exists_in_backend: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backend_id: Option<String>,
    /// Saved floor whose name, bounds or vehicle types changed locally.
    #[serde(default)]
    pub modified: bool,
}

impl Floor {
    pub fn new(floor_number: u32, allowed_vehicle_types: BTreeSet<VehicleType>) -> Self {
        Self {
            floor_number,
            floor_name: format!("Floor {floor_number}"),
            bounds: None,
            allowed_vehicle_types,
            areas: Vec::new(),
            strokes: Vec::new(),
            exists_in_backend: false,
            backend_id: None,
            modified: false,
        }
    }

    /// Look up an area of this floor by its local id.
    pub fn area(&self, id: Uuid) -> Option<&Area> {
        self.areas.iter().find(|a| a.id == id)
    }

    pub fn area_mut(&mut self, id: Uuid) -> Option<&mut Area> {
        self.areas.iter_mut().find(|a| a.id == id)
    }

    /// Remove and return the area with `id`, if present.
    pub fn remove_area(&mut self, id: Uuid) -> Option<Area> {
        let pos = self.areas.iter().position(|a| a.id == id)?;
        Some(self.areas.remove(pos))
    }

    /// Occupied spots across every area of this floor.
    pub fn occupied_spots(&self) -> u32 {
        self.areas.iter().map(Area::occupied_spots).sum()
    }

    /// Flag a saved floor as needing an update on the next save.
    pub fn mark_modified(&mut self) {
        if self.exists_in_backend {
            self.modified = true;
        }
    }

    /// Drop every link to the backend so the floor and its contents count as
    /// unsaved again.
    pub fn forget_backend(&mut self) {
        self.exists_in_backend = false;
        self.backend_id = None;
        self.modified = false;
        for area in &mut self.areas {
            area.backend_id = None;
            area.modified = false;
            if let Some(spots) = area.spots_mut() {
                for spot in spots {
                    spot.persisted = false;
                    spot.backend_id = None;
                }
            }
        }
    }

    /// Topmost shape under `p`. Spots win over their area; later areas win
    /// over earlier ones (they are drawn on top).
    pub fn hit_test(&self, p: Point) -> Option<Hit> {
        for area in self.areas.iter().rev() {
            if !area.rect.contains(p) {
                continue;
            }
            for spot in area.spots().iter().rev() {
                if area.absolute_spot_rect(spot).contains(p) {
                    return Some(Hit::Spot {
                        area_id: area.id,
                        spot_id: spot.id,
                    });
                }
            }
            return Some(Hit::Area(area.id));
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn car_area() -> Area {
        Area::new(
            "A",
            Rect::new(100.0, 100.0, 200.0, 200.0),
            VehicleType::CarUpTo9Seats,
            AreaType::WalkInOnly,
            0,
        )
    }

    #[test]
    fn car_area_counts_spots_and_ignores_total() {
        let mut area = car_area();
        let spots = area.spots_mut().expect("car area has spots");
        spots.push(Spot::new("S1", Rect::new(5.0, 5.0, 40.0, 60.0)));
        spots.push(Spot::new("S2", Rect::new(55.0, 5.0, 40.0, 60.0)));
        assert_eq!(area.occupied_spots(), 2);
    }

    #[test]
    fn non_car_area_uses_total_and_has_no_spot_list() {
        let mut area = Area::new(
            "M",
            Rect::new(0.0, 0.0, 100.0, 100.0),
            VehicleType::Motorbike,
            AreaType::SubscriptionOnly,
            7,
        );
        assert_eq!(area.occupied_spots(), 7);
        assert!(area.spots().is_empty());
        assert!(area.spots_mut().is_none());
    }

    #[test]
    fn area_serializes_capacity_mode_inline() {
        let area = Area::new(
            "B",
            Rect::new(0.0, 0.0, 100.0, 100.0),
            VehicleType::Bike,
            AreaType::WalkInOnly,
            4,
        );
        let value = serde_json::to_value(&area).expect("to_value");
        assert_eq!(value["capacityMode"], "total");
        assert_eq!(value["totalSpots"], 4);
        assert_eq!(value["vehicleType"], "BIKE");
        assert!(value.get("backendId").is_none());
    }

    #[test]
    fn hit_test_prefers_spot_over_area() {
        let mut floor = Floor::new(1, BTreeSet::from([VehicleType::CarUpTo9Seats]));
        let mut area = car_area();
        let spot = Spot::new("S1", Rect::new(5.0, 5.0, 40.0, 60.0));
        let spot_id = spot.id;
        area.spots_mut().expect("spots").push(spot);
        let area_id = area.id;
        floor.areas.push(area);

        assert_eq!(
            floor.hit_test(Point::new(110.0, 110.0)),
            Some(Hit::Spot { area_id, spot_id })
        );
        assert_eq!(floor.hit_test(Point::new(250.0, 250.0)), Some(Hit::Area(area_id)));
        assert_eq!(floor.hit_test(Point::new(10.0, 10.0)), None);
    }

    #[test]
    fn stroke_passes_near_uses_radius() {
        let mut stroke = Stroke::starting_at(Point::new(0.0, 0.0));
        stroke.points.push(Point::new(50.0, 0.0));
        assert!(stroke.passes_near(Point::new(53.0, 4.0), 10.0));
        assert!(!stroke.passes_near(Point::new(25.0, 20.0), 10.0));
    }

    #[test]
    fn floor_total_sums_every_vehicle_type() {
        let mut floor = Floor::new(
            1,
            BTreeSet::from([VehicleType::CarUpTo9Seats, VehicleType::Motorbike]),
        );
        let mut car = car_area();
        car.spots_mut()
            .expect("car area")
            .push(Spot::new("S1", Rect::new(5.0, 5.0, 40.0, 60.0)));
        floor.areas.push(car);
        floor.areas.push(Area::new(
            "M1",
            Rect::new(300.0, 0.0, 200.0, 200.0),
            VehicleType::Motorbike,
            AreaType::WalkInOnly,
            5,
        ));
        assert_eq!(floor.occupied_spots(), 6);
    }

    #[test]
    fn only_saved_entities_are_marked_modified() {
        let mut floor = Floor::new(1, BTreeSet::from([VehicleType::CarUpTo9Seats]));
        floor.mark_modified();
        assert!(!floor.modified);
        floor.exists_in_backend = true;
        floor.mark_modified();
        assert!(floor.modified);

        let mut area = car_area();
        area.mark_modified();
        assert!(!area.modified);
        area.backend_id = Some("a-1".to_string());
        area.mark_modified();
        assert!(area.modified);

        floor.areas.push(area);
        floor.forget_backend();
        assert!(!floor.modified);
        assert!(!floor.areas[0].modified);
    }
}
