//! Area configuration and spot placement on the current floor.

use serde::Deserialize;
use uuid::Uuid;

use super::{Editor, Gesture, LayoutError, Selection};
use crate::layout::autolayout::{self, Placement};
use crate::layout::RemoteDeletion;
use crate::models::{Area, AreaType, VehicleType};

/// Choices made in the configuration step that follows an area drag.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AreaConfig {
    pub vehicle_type: VehicleType,
    #[serde(default)]
    pub area_type: AreaType,
    /// Capacity of a non-car area. Ignored for car areas.
    #[serde(default)]
    pub total_spots: Option<u32>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub support_electric_vehicle: bool,
}

impl AreaConfig {
    pub fn new(vehicle_type: VehicleType) -> Self {
        Self {
            vehicle_type,
            area_type: AreaType::default(),
            total_spots: None,
            name: None,
            support_electric_vehicle: false,
        }
    }

    pub fn with_total_spots(mut self, total_spots: u32) -> Self {
        self.total_spots = Some(total_spots);
        self
    }

    pub fn with_area_type(mut self, area_type: AreaType) -> Self {
        self.area_type = area_type;
        self
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

impl Editor {
    /// Commit the pending area with `config`, replacing the preview.
    ///
    /// On any validation failure the pending area is discarded and the
    /// editor returns to idle.
    pub fn commit_area(&mut self, config: AreaConfig) -> Result<Area, LayoutError> {
        let Gesture::ConfiguringArea(pending) =
            std::mem::replace(&mut self.gesture, Gesture::Idle)
        else {
            return Err(LayoutError::InvalidSelection(
                "no drawn area is waiting for configuration".to_string(),
            ));
        };

        let floor = self.current_floor()?;
        if !floor.allowed_vehicle_types.contains(&config.vehicle_type) {
            return Err(LayoutError::VehicleTypeNotAllowed(config.vehicle_type));
        }

        let total_spots = if config.vehicle_type.tracks_individual_spots() {
            0
        } else {
            let requested = config.total_spots.unwrap_or(0);
            if requested == 0 {
                return Err(LayoutError::InvalidInput(
                    "enter a capacity of at least 1".to_string(),
                ));
            }
            if requested > self.remaining_capacity() {
                return Err(self.capacity_exceeded());
            }
            if requested > pending.max_spots {
                return Err(LayoutError::AreaTooSmall {
                    requested,
                    max: pending.max_spots,
                });
            }
            requested
        };

        let name = config
            .name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| format!("Area {}", floor.areas.len() + 1));
        let mut area = Area::new(
            name,
            pending.rect,
            config.vehicle_type,
            config.area_type,
            total_spots,
        );
        area.support_electric_vehicle = config.support_electric_vehicle;

        let floor = self.current_floor_mut()?;
        floor.areas.push(area.clone());
        tracing::info!(
            floor = floor.floor_number,
            area = %area.name,
            vehicle_type = %area.vehicle_type,
            spots = area.occupied_spots(),
            "area created"
        );
        self.selection = Selection {
            area_id: Some(area.id),
            spot_id: None,
        };
        Ok(area)
    }

    /// Drop the pending area without creating anything.
    pub fn cancel_area_config(&mut self) {
        if matches!(self.gesture, Gesture::ConfiguringArea(_)) {
            self.gesture = Gesture::Idle;
        }
    }

    pub fn select_area(&mut self, area_id: Uuid) -> Result<(), LayoutError> {
        self.current_floor()?
            .area(area_id)
            .ok_or(LayoutError::AreaNotFound(area_id))?;
        self.selection = Selection {
            area_id: Some(area_id),
            spot_id: None,
        };
        Ok(())
    }

    pub fn select_spot(&mut self, area_id: Uuid, spot_id: Uuid) -> Result<(), LayoutError> {
        let area = self
            .current_floor()?
            .area(area_id)
            .ok_or(LayoutError::AreaNotFound(area_id))?;
        if !area.spots().iter().any(|s| s.id == spot_id) {
            return Err(LayoutError::SpotNotFound(spot_id));
        }
        self.selection = Selection {
            area_id: Some(area_id),
            spot_id: Some(spot_id),
        };
        Ok(())
    }

    pub fn clear_selection(&mut self) {
        self.selection = Selection::default();
    }

    /// Resolve the area a spot operation targets and check it may take
    /// more spots.
    fn spot_target(&self, area_id: Option<Uuid>) -> Result<Uuid, LayoutError> {
        let area_id = area_id
            .or(self.selection.area_id)
            .ok_or_else(|| LayoutError::InvalidSelection("select an area first".to_string()))?;
        let area = self
            .current_floor()?
            .area(area_id)
            .ok_or(LayoutError::AreaNotFound(area_id))?;
        if !area.vehicle_type.tracks_individual_spots() {
            return Err(LayoutError::InvalidSelection(format!(
                "spots can only be placed in car areas; '{}' is {}",
                area.name, area.vehicle_type
            )));
        }
        if !self.can_place_more_spots() {
            return Err(self.capacity_exceeded());
        }
        Ok(area_id)
    }

    /// Place one spot in the next free grid cell of the area (the selected
    /// area when `area_id` is `None`).
    pub fn add_single_spot(&mut self, area_id: Option<Uuid>) -> Result<Uuid, LayoutError> {
        let area_id = self.spot_target(area_id)?;
        let grid = self.settings.grid;
        let area = self
            .current_floor_mut()?
            .area_mut(area_id)
            .ok_or(LayoutError::AreaNotFound(area_id))?;
        let placement = autolayout::fill(area, 1, &grid);
        if placement.placed == 0 {
            tracing::warn!(area = %area.name, "area full, spot not added");
            return Err(LayoutError::AreaFull(area.name.clone()));
        }
        let spot_id = area.spots().last().map(|s| s.id).unwrap_or_default();
        tracing::info!(area = %area.name, spots = area.occupied_spots(), "spot added");
        Ok(spot_id)
    }

    /// Place up to `requested` spots, clamped to the remaining capacity.
    ///
    /// Stops at the first cell that does not fit; the returned
    /// [`Placement`] tells how many of the clamped request were placed.
    pub fn bulk_add_spots(
        &mut self,
        area_id: Option<Uuid>,
        requested: u32,
    ) -> Result<Placement, LayoutError> {
        if requested == 0 {
            return Err(LayoutError::InvalidInput(
                "enter a number of spots of at least 1".to_string(),
            ));
        }
        let area_id = self.spot_target(area_id)?;
        let clamped = requested.min(self.remaining_capacity());
        let grid = self.settings.grid;
        let area = self
            .current_floor_mut()?
            .area_mut(area_id)
            .ok_or(LayoutError::AreaNotFound(area_id))?;
        let placement = autolayout::fill(area, clamped, &grid);
        if placement.placed == 0 {
            return Err(LayoutError::AreaFull(area.name.clone()));
        }
        tracing::info!(
            area = %area.name,
            requested,
            clamped,
            placed = placement.placed,
            "spots added"
        );
        Ok(placement)
    }

    /// Remove an area (and its spots) from the current floor. A saved area
    /// is queued for remote deletion on the next save.
    pub fn delete_area(&mut self, area_id: Uuid) -> Result<Area, LayoutError> {
        let floor_number = self.current_floor;
        let area = self
            .current_floor_mut()?
            .remove_area(area_id)
            .ok_or(LayoutError::AreaNotFound(area_id))?;
        if let Some(backend_id) = &area.backend_id {
            self.document.record_deletion(RemoteDeletion::Area {
                floor_number,
                name: area.name.clone(),
                backend_id: backend_id.clone(),
            });
        }
        tracing::info!(floor = floor_number, area = %area.name, "area deleted");
        self.selection = Selection::default();
        Ok(area)
    }

    /// Remove one spot from an area on the current floor. A saved spot is
    /// queued for remote deletion and its area flagged for an update.
    pub fn delete_spot(&mut self, area_id: Uuid, spot_id: Uuid) -> Result<(), LayoutError> {
        let floor_number = self.current_floor;
        let area = self
            .current_floor_mut()?
            .area_mut(area_id)
            .ok_or(LayoutError::AreaNotFound(area_id))?;
        let spots = area
            .spots_mut()
            .ok_or(LayoutError::SpotNotFound(spot_id))?;
        let pos = spots
            .iter()
            .position(|s| s.id == spot_id)
            .ok_or(LayoutError::SpotNotFound(spot_id))?;
        let spot = spots.remove(pos);

        let deletion = match (&area.backend_id, spot.backend_id) {
            (Some(area_backend_id), Some(backend_id)) => Some(RemoteDeletion::Spot {
                floor_number,
                area_name: area.name.clone(),
                area_backend_id: area_backend_id.clone(),
                backend_id,
            }),
            _ => {
                if spot.persisted {
                    tracing::warn!(area = %area.name, "saved spot has no backend id; remote copy kept");
                }
                None
            }
        };
        area.mark_modified();
        if let Some(deletion) = deletion {
            self.document.record_deletion(deletion);
        }
        self.selection = Selection::default();
        Ok(())
    }

    pub fn rename_area(&mut self, area_id: Uuid, name: &str) -> Result<(), LayoutError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(LayoutError::InvalidInput(
                "area name cannot be empty".to_string(),
            ));
        }
        let area = self
            .current_floor_mut()?
            .area_mut(area_id)
            .ok_or(LayoutError::AreaNotFound(area_id))?;
        area.name = name.to_string();
        area.mark_modified();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::super::{Gesture, PointerUp};
    use super::*;
    use crate::models::LotCapacity;

    fn car_editor(capacity: u32) -> Editor {
        editor(vec![LotCapacity::new(VehicleType::CarUpTo9Seats, capacity)])
    }

    fn car_area(editor: &mut Editor, to: (f64, f64)) -> Area {
        drag_area(editor, (0.0, 0.0), to);
        editor
            .commit_area(AreaConfig::new(VehicleType::CarUpTo9Seats))
            .expect("commit car area")
    }

    #[test]
    fn commit_without_pending_area_is_invalid_selection() {
        let mut editor = car_editor(10);
        let err = editor
            .commit_area(AreaConfig::new(VehicleType::CarUpTo9Seats))
            .unwrap_err();
        assert!(matches!(err, LayoutError::InvalidSelection(_)));
    }

    #[test]
    fn commit_selects_new_area_with_default_name() {
        let mut editor = car_editor(10);
        let area = car_area(&mut editor, (200.0, 200.0));
        assert_eq!(area.name, "Area 1");
        assert_eq!(editor.selection().area_id, Some(area.id));
        assert_eq!(editor.gesture(), &Gesture::Idle);
    }

    #[test]
    fn commit_rejects_vehicle_type_not_allowed_on_floor() {
        let mut editor = car_editor(10);
        drag_area(&mut editor, (0.0, 0.0), (200.0, 200.0));
        let err = editor
            .commit_area(AreaConfig::new(VehicleType::Motorbike).with_total_spots(2))
            .unwrap_err();
        assert_eq!(err, LayoutError::VehicleTypeNotAllowed(VehicleType::Motorbike));
        assert_eq!(editor.gesture(), &Gesture::Idle);
    }

    #[test]
    fn non_car_capacity_is_bounded_by_fit() {
        let mut editor = editor(vec![LotCapacity::new(VehicleType::Motorbike, 100)]);
        drag_area(&mut editor, (0.0, 0.0), (200.0, 200.0));
        let err = editor
            .commit_area(AreaConfig::new(VehicleType::Motorbike).with_total_spots(9))
            .unwrap_err();
        assert_eq!(err, LayoutError::AreaTooSmall { requested: 9, max: 8 });
    }

    #[test]
    fn non_car_capacity_is_bounded_by_remaining() {
        let mut editor = editor(vec![LotCapacity::new(VehicleType::Motorbike, 3)]);
        drag_area(&mut editor, (0.0, 0.0), (200.0, 200.0));
        let err = editor
            .commit_area(AreaConfig::new(VehicleType::Motorbike).with_total_spots(4))
            .unwrap_err();
        assert!(matches!(err, LayoutError::CapacityExceeded { .. }));
        assert_eq!(editor.ledger().drawn, 0);
    }

    #[test]
    fn non_car_capacity_of_zero_is_rejected() {
        let mut editor = editor(vec![LotCapacity::new(VehicleType::Bike, 3)]);
        drag_area(&mut editor, (0.0, 0.0), (200.0, 200.0));
        let err = editor
            .commit_area(AreaConfig::new(VehicleType::Bike))
            .unwrap_err();
        assert!(matches!(err, LayoutError::InvalidInput(_)));
    }

    #[test]
    fn cancel_discards_pending_area() {
        let mut editor = car_editor(10);
        let up = drag_area(&mut editor, (0.0, 0.0), (200.0, 200.0));
        assert!(matches!(up, PointerUp::AreaPending { .. }));
        editor.cancel_area_config();
        assert_eq!(editor.gesture(), &Gesture::Idle);
        assert!(editor.current_floor().expect("floor").areas.is_empty());
    }

    #[test]
    fn add_single_spot_requires_selection() {
        let mut editor = car_editor(10);
        car_area(&mut editor, (200.0, 200.0));
        editor.clear_selection();
        let err = editor.add_single_spot(None).unwrap_err();
        assert!(matches!(err, LayoutError::InvalidSelection(_)));
    }

    #[test]
    fn add_single_spot_uses_selected_area() {
        let mut editor = car_editor(10);
        let area = car_area(&mut editor, (200.0, 200.0));
        editor.add_single_spot(None).expect("spot");
        let floor = editor.current_floor().expect("floor");
        assert_eq!(floor.area(area.id).expect("area").occupied_spots(), 1);
    }

    #[test]
    fn add_single_spot_rejects_non_car_area() {
        let mut editor = editor(vec![LotCapacity::new(VehicleType::Bike, 10)]);
        drag_area(&mut editor, (0.0, 0.0), (200.0, 200.0));
        let area = editor
            .commit_area(AreaConfig::new(VehicleType::Bike).with_total_spots(2))
            .expect("commit");
        let err = editor.add_single_spot(Some(area.id)).unwrap_err();
        assert!(matches!(err, LayoutError::InvalidSelection(_)));
    }

    #[test]
    fn add_single_spot_stops_when_area_is_full() {
        let mut editor = car_editor(10);
        let area = car_area(&mut editor, (100.0, 100.0));
        editor.add_single_spot(Some(area.id)).expect("first");
        editor.add_single_spot(Some(area.id)).expect("second");
        let err = editor.add_single_spot(Some(area.id)).unwrap_err();
        assert_eq!(err, LayoutError::AreaFull("Area 1".to_string()));
        assert_eq!(editor.ledger().drawn, 2);
    }

    #[test]
    fn bulk_add_clamps_to_remaining_capacity() {
        let mut editor = car_editor(5);
        let area = car_area(&mut editor, (400.0, 400.0));
        let placement = editor.bulk_add_spots(Some(area.id), 20).expect("bulk");
        assert_eq!(placement, Placement { requested: 5, placed: 5 });
        assert_eq!(editor.ledger().drawn, 5);
    }

    #[test]
    fn bulk_add_reports_partial_placement() {
        let mut editor = car_editor(50);
        let area = car_area(&mut editor, (200.0, 200.0));
        let placement = editor.bulk_add_spots(Some(area.id), 12).expect("bulk");
        assert_eq!(placement, Placement { requested: 12, placed: 8 });
        assert!(placement.is_partial());
    }

    #[test]
    fn bulk_add_of_zero_is_invalid() {
        let mut editor = car_editor(5);
        let area = car_area(&mut editor, (200.0, 200.0));
        let err = editor.bulk_add_spots(Some(area.id), 0).unwrap_err();
        assert!(matches!(err, LayoutError::InvalidInput(_)));
    }

    #[test]
    fn delete_spot_and_area_clear_selection() {
        let mut editor = car_editor(10);
        let area = car_area(&mut editor, (200.0, 200.0));
        let spot_id = editor.add_single_spot(Some(area.id)).expect("spot");
        editor.select_spot(area.id, spot_id).expect("select");
        editor.delete_spot(area.id, spot_id).expect("delete spot");
        assert_eq!(editor.selection(), Selection::default());

        editor.select_area(area.id).expect("select");
        editor.delete_area(area.id).expect("delete area");
        assert_eq!(editor.selection(), Selection::default());
        assert!(matches!(
            editor.delete_area(area.id),
            Err(LayoutError::AreaNotFound(_))
        ));
    }

    #[test]
    fn rename_area_trims_and_rejects_empty() {
        let mut editor = car_editor(10);
        let area = car_area(&mut editor, (200.0, 200.0));
        editor.rename_area(area.id, "  North Wing ").expect("rename");
        let floor = editor.current_floor().expect("floor");
        assert_eq!(floor.area(area.id).expect("area").name, "North Wing");
        assert!(matches!(
            editor.rename_area(area.id, "   "),
            Err(LayoutError::InvalidInput(_))
        ));
    }

    /// Tag an area and its spots as held by the backend.
    fn save_area(editor: &mut Editor, area_id: Uuid) {
        let area = editor
            .document_mut()
            .floor_mut(1)
            .and_then(|f| f.area_mut(area_id))
            .expect("area");
        area.backend_id = Some("area-9".to_string());
        for (i, spot) in area.spots_mut().expect("car area").iter_mut().enumerate() {
            spot.persisted = true;
            spot.backend_id = Some(format!("spot-{i}"));
        }
    }

    #[test]
    fn editing_saved_area_marks_it_modified() {
        let mut editor = car_editor(10);
        let area = car_area(&mut editor, (200.0, 200.0));
        editor.rename_area(area.id, "Draft").expect("rename unsaved");
        assert!(!editor.current_floor().expect("floor").areas[0].modified);

        save_area(&mut editor, area.id);
        editor.rename_area(area.id, "North").expect("rename saved");
        assert!(editor.current_floor().expect("floor").areas[0].modified);
    }

    #[test]
    fn deleting_saved_spot_then_area_queues_one_area_deletion() {
        let mut editor = car_editor(10);
        let area = car_area(&mut editor, (200.0, 200.0));
        let spot_id = editor.add_single_spot(Some(area.id)).expect("spot");
        save_area(&mut editor, area.id);

        editor.delete_spot(area.id, spot_id).expect("delete spot");
        assert_eq!(
            editor.document().pending_deletions(),
            &[RemoteDeletion::Spot {
                floor_number: 1,
                area_name: "Area 1".to_string(),
                area_backend_id: "area-9".to_string(),
                backend_id: "spot-0".to_string(),
            }]
        );
        assert!(editor.current_floor().expect("floor").areas[0].modified);

        editor.delete_area(area.id).expect("delete area");
        assert_eq!(
            editor.document().pending_deletions(),
            &[RemoteDeletion::Area {
                floor_number: 1,
                name: "Area 1".to_string(),
                backend_id: "area-9".to_string(),
            }]
        );
    }

    #[test]
    fn deleting_unsaved_area_queues_nothing() {
        let mut editor = car_editor(10);
        let area = car_area(&mut editor, (200.0, 200.0));
        editor.delete_area(area.id).expect("delete");
        assert!(editor.document().pending_deletions().is_empty());
    }
}
