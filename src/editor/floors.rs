//! Floor management: add, edit, copy, delete and whole-map reset.

use std::collections::BTreeSet;

use super::{Editor, Gesture, LayoutError, Selection};
use crate::layout::capacity;
use crate::models::{Area, AreaCapacity, Floor, Rect, Spot, VehicleType};

impl Editor {
    /// Make `number` the floor all drawing operations act on.
    pub fn select_floor(&mut self, number: u32) -> Result<(), LayoutError> {
        if !self.document.contains(number) {
            return Err(LayoutError::FloorNotFound(number));
        }
        self.current_floor = number;
        self.gesture = Gesture::Idle;
        self.selection = Selection::default();
        Ok(())
    }

    fn check_vehicle_types(&self, types: &BTreeSet<VehicleType>) -> Result<(), LayoutError> {
        if types.is_empty() {
            return Err(LayoutError::NoVehicleTypeSelected);
        }
        let allowed = capacity::allowed_vehicle_types(&self.lot.capacities);
        if let Some(vt) = types.iter().find(|vt| !allowed.contains(vt)) {
            return Err(LayoutError::VehicleTypeNotAllowed(*vt));
        }
        Ok(())
    }

    /// Add a floor under the lowest number in `1..=total_floors` not yet
    /// taken and switch to it. Returns the new floor number.
    pub fn add_floor(&mut self, vehicle_types: BTreeSet<VehicleType>) -> Result<u32, LayoutError> {
        self.check_vehicle_types(&vehicle_types)?;
        let number = (1..=self.lot.total_floors)
            .find(|n| !self.document.contains(*n))
            .ok_or(LayoutError::FloorLimitReached {
                total_floors: self.lot.total_floors,
            })?;
        self.document.insert(Floor::new(number, vehicle_types));
        tracing::info!(floor = number, "floor added");
        self.select_floor(number)?;
        Ok(number)
    }

    /// Replace the vehicle types permitted on floor `number`.
    ///
    /// Types still used by an area on the floor cannot be removed.
    pub fn edit_floor_vehicle_types(
        &mut self,
        number: u32,
        vehicle_types: BTreeSet<VehicleType>,
    ) -> Result<(), LayoutError> {
        self.check_vehicle_types(&vehicle_types)?;
        let floor = self
            .document
            .floor_mut(number)
            .ok_or(LayoutError::FloorNotFound(number))?;
        if let Some(area) = floor
            .areas
            .iter()
            .find(|a| !vehicle_types.contains(&a.vehicle_type))
        {
            return Err(LayoutError::InvalidInput(format!(
                "area '{}' on floor {number} still uses {}",
                area.name, area.vehicle_type
            )));
        }
        floor.allowed_vehicle_types = vehicle_types;
        floor.mark_modified();
        Ok(())
    }

    pub fn rename_floor(&mut self, number: u32, name: &str) -> Result<(), LayoutError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(LayoutError::InvalidInput(
                "floor name cannot be empty".to_string(),
            ));
        }
        let floor = self
            .document
            .floor_mut(number)
            .ok_or(LayoutError::FloorNotFound(number))?;
        floor.floor_name = name.to_string();
        floor.mark_modified();
        Ok(())
    }

    /// Set floor bounds directly (outside the drag gesture).
    pub fn set_floor_bounds(&mut self, number: u32, bounds: Rect) -> Result<(), LayoutError> {
        let min = self.settings.min_floor_side;
        if !bounds.exceeds(min) {
            return Err(LayoutError::GeometryTooSmall {
                width: bounds.width,
                height: bounds.height,
                min,
            });
        }
        let floor = self
            .document
            .floor_mut(number)
            .ok_or(LayoutError::FloorNotFound(number))?;
        floor.bounds = Some(bounds);
        floor.mark_modified();
        Ok(())
    }

    /// Delete floor `number`.
    ///
    /// Refused while the lot status locks the map, for the last remaining
    /// floor, and for floors that already exist in the backend.
    pub fn delete_floor(&mut self, number: u32) -> Result<Floor, LayoutError> {
        self.ensure_editable()?;
        let floor = self
            .document
            .floor(number)
            .ok_or(LayoutError::FloorNotFound(number))?;
        if self.document.len() <= 1 {
            return Err(LayoutError::LastFloor);
        }
        if floor.exists_in_backend {
            return Err(LayoutError::FloorPersisted(number));
        }
        let removed = self
            .document
            .remove(number)
            .ok_or(LayoutError::FloorNotFound(number))?;
        if self.current_floor == number {
            let first = self.document.floor_numbers().next().unwrap_or(1);
            self.select_floor(first)?;
        }
        tracing::info!(floor = number, "floor deleted");
        Ok(removed)
    }

    /// Copy every area of floor `source` onto floor `target`.
    ///
    /// Cloned areas and spots get fresh ids and are unsaved; strokes are not
    /// copied. The target's unsaved areas are replaced, its saved areas are
    /// kept. Returns the number of areas copied.
    pub fn copy_floor(&mut self, source: u32, target: u32) -> Result<usize, LayoutError> {
        if source == target {
            return Err(LayoutError::InvalidInput(
                "source and target floor must differ".to_string(),
            ));
        }
        let src = self
            .document
            .floor(source)
            .ok_or(LayoutError::FloorNotFound(source))?;
        let dst = self
            .document
            .floor(target)
            .ok_or(LayoutError::FloorNotFound(target))?;
        if src.areas.is_empty() {
            return Err(LayoutError::EmptySourceFloor(source));
        }
        if let Some(area) = src
            .areas
            .iter()
            .find(|a| !dst.allowed_vehicle_types.contains(&a.vehicle_type))
        {
            return Err(LayoutError::VehicleTypeNotAllowed(area.vehicle_type));
        }

        let cloned: Vec<Area> = src.areas.iter().map(clone_area).collect();
        let added: u32 = cloned.iter().map(Area::occupied_spots).sum();
        let replaced: u32 = dst
            .areas
            .iter()
            .filter(|a| !a.is_persisted())
            .map(Area::occupied_spots)
            .sum();
        let ledger = self.ledger();
        if ledger.drawn - replaced + added > ledger.registered {
            return Err(self.capacity_exceeded());
        }

        let count = cloned.len();
        let dst = self
            .document
            .floor_mut(target)
            .ok_or(LayoutError::FloorNotFound(target))?;
        dst.areas.retain(Area::is_persisted);
        dst.areas.extend(cloned);
        tracing::info!(source, target, areas = count, "floor copied");
        if self.current_floor == target {
            self.selection = Selection::default();
        }
        Ok(count)
    }

    /// Discard the local layout, leaving a single empty floor 1.
    ///
    /// Backend floors are removed separately by the caller before this runs.
    pub fn reset_document(&mut self) -> Result<(), LayoutError> {
        self.ensure_editable()?;
        let allowed = capacity::allowed_vehicle_types(&self.lot.capacities);
        self.document = crate::layout::LayoutDocument::from_floors([Floor::new(1, allowed)]);
        self.current_floor = 1;
        self.gesture = Gesture::Idle;
        self.selection = Selection::default();
        tracing::info!(lot_id = %self.lot.id, "layout reset");
        Ok(())
    }
}

fn clone_area(area: &Area) -> Area {
    let capacity = match &area.capacity {
        AreaCapacity::Spots { spots } => AreaCapacity::Spots {
            spots: spots
                .iter()
                .map(|s| Spot::new(s.name.clone(), s.rect))
                .collect(),
        },
        AreaCapacity::Total { total_spots } => AreaCapacity::Total {
            total_spots: *total_spots,
        },
    };
    Area {
        id: uuid::Uuid::new_v4(),
        capacity,
        backend_id: None,
        modified: false,
        ..area.clone()
    }
}
