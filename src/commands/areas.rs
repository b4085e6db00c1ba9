//! Area and spot command handlers.
//!
//! Ids arrive as text and are parsed with [`parse_entity_id`]; an unparsable
//! id is [`AppError::InvalidInput`], an unknown one [`AppError::NotFound`].

use std::sync::RwLock;

use uuid::Uuid;

use crate::editor::{AreaConfig, Editor};
use crate::error::AppError;
use crate::layout::autolayout::Placement;
use crate::models::Area;

use super::{parse_entity_id, with_editor_mut};

fn optional_area_id(area_id: Option<&str>) -> Result<Option<Uuid>, AppError> {
    area_id.map(|id| parse_entity_id(id, "area")).transpose()
}

// ── Configuration ─────────────────────────────────────────────────────────────

/// Commit the area drawn by the last drag with the chosen configuration.
pub fn commit_area(lock: &RwLock<Option<Editor>>, config: AreaConfig) -> Result<Area, AppError> {
    with_editor_mut(lock, |editor| Ok(editor.commit_area(config)?))
}

pub fn cancel_area_config(lock: &RwLock<Option<Editor>>) -> Result<(), AppError> {
    with_editor_mut(lock, |editor| {
        editor.cancel_area_config();
        Ok(())
    })
}

pub fn rename_area(
    lock: &RwLock<Option<Editor>>,
    area_id: &str,
    name: &str,
) -> Result<(), AppError> {
    let area_id = parse_entity_id(area_id, "area")?;
    with_editor_mut(lock, |editor| Ok(editor.rename_area(area_id, name)?))
}

// ── Selection ─────────────────────────────────────────────────────────────────

pub fn select_area(lock: &RwLock<Option<Editor>>, area_id: &str) -> Result<(), AppError> {
    let area_id = parse_entity_id(area_id, "area")?;
    with_editor_mut(lock, |editor| Ok(editor.select_area(area_id)?))
}

pub fn select_spot(
    lock: &RwLock<Option<Editor>>,
    area_id: &str,
    spot_id: &str,
) -> Result<(), AppError> {
    let area_id = parse_entity_id(area_id, "area")?;
    let spot_id = parse_entity_id(spot_id, "spot")?;
    with_editor_mut(lock, |editor| Ok(editor.select_spot(area_id, spot_id)?))
}

pub fn clear_selection(lock: &RwLock<Option<Editor>>) -> Result<(), AppError> {
    with_editor_mut(lock, |editor| {
        editor.clear_selection();
        Ok(())
    })
}

// ── Spots ─────────────────────────────────────────────────────────────────────

/// Add one spot to `area_id`, or to the selected area when `None`.
pub fn add_single_spot(
    lock: &RwLock<Option<Editor>>,
    area_id: Option<&str>,
) -> Result<Uuid, AppError> {
    let area_id = optional_area_id(area_id)?;
    with_editor_mut(lock, |editor| Ok(editor.add_single_spot(area_id)?))
}

pub fn bulk_add_spots(
    lock: &RwLock<Option<Editor>>,
    area_id: Option<&str>,
    count: u32,
) -> Result<Placement, AppError> {
    let area_id = optional_area_id(area_id)?;
    with_editor_mut(lock, |editor| Ok(editor.bulk_add_spots(area_id, count)?))
}

// ── Deletion ──────────────────────────────────────────────────────────────────

pub fn delete_area(lock: &RwLock<Option<Editor>>, area_id: &str) -> Result<Area, AppError> {
    let area_id = parse_entity_id(area_id, "area")?;
    with_editor_mut(lock, |editor| Ok(editor.delete_area(area_id)?))
}

pub fn delete_spot(
    lock: &RwLock<Option<Editor>>,
    area_id: &str,
    spot_id: &str,
) -> Result<(), AppError> {
    let area_id = parse_entity_id(area_id, "area")?;
    let spot_id = parse_entity_id(spot_id, "spot")?;
    with_editor_mut(lock, |editor| Ok(editor.delete_spot(area_id, spot_id)?))
}

#[cfg(test)]
mod tests {
    use super::super::canvas;
    use super::super::test_support::open_lock;
    use super::*;
    use crate::editor::{Mode, PointerUp};
    use crate::models::VehicleType;

    fn drawn_area(lock: &RwLock<Option<Editor>>, from: f64, to: f64) {
        canvas::set_mode(lock, Mode::Area).expect("mode");
        canvas::pointer_down(lock, from, from).expect("down");
        let up = canvas::pointer_up(lock, to, to).expect("up");
        assert!(matches!(up, PointerUp::AreaPending { .. }));
    }

    #[test]
    fn committed_car_area_takes_bulk_spots_up_to_capacity() {
        let lock = open_lock(5, 0);
        drawn_area(&lock, 100.0, 300.0);
        let area = commit_area(&lock, AreaConfig::new(VehicleType::CarUpTo9Seats)).expect("commit");

        let placement =
            bulk_add_spots(&lock, Some(&area.id.to_string()), 8).expect("bulk");
        assert_eq!(placement.requested, 5);
        assert_eq!(placement.placed, 5);

        let err = add_single_spot(&lock, None).unwrap_err();
        assert!(matches!(err, AppError::CapacityExceeded(_)));
    }

    #[test]
    fn unparsable_ids_are_invalid_input() {
        let lock = open_lock(5, 0);
        assert!(matches!(
            select_area(&lock, "area-1").unwrap_err(),
            AppError::InvalidInput(_)
        ));
        assert!(matches!(
            delete_spot(&lock, &Uuid::new_v4().to_string(), "x").unwrap_err(),
            AppError::InvalidInput(_)
        ));
    }

    #[test]
    fn unknown_area_is_not_found() {
        let lock = open_lock(5, 0);
        let err = delete_area(&lock, &Uuid::new_v4().to_string()).unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[test]
    fn spot_without_selection_is_invalid_selection() {
        let lock = open_lock(5, 0);
        let err = add_single_spot(&lock, None).unwrap_err();
        assert!(matches!(err, AppError::InvalidSelection(_)));
    }

    #[test]
    fn select_then_delete_spot() {
        let lock = open_lock(5, 0);
        drawn_area(&lock, 100.0, 300.0);
        let area = commit_area(&lock, AreaConfig::new(VehicleType::CarUpTo9Seats)).expect("commit");
        let area_id = area.id.to_string();
        let spot_id = add_single_spot(&lock, Some(&area_id)).expect("spot").to_string();

        select_spot(&lock, &area_id, &spot_id).expect("select");
        delete_spot(&lock, &area_id, &spot_id).expect("delete");
        assert!(matches!(
            select_spot(&lock, &area_id, &spot_id).unwrap_err(),
            AppError::NotFound(_)
        ));
    }
}
