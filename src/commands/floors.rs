//! Floor command handlers.

use std::collections::BTreeSet;
use std::sync::RwLock;

use crate::editor::Editor;
use crate::error::AppError;
use crate::models::{Rect, VehicleType};

use super::with_editor_mut;

pub fn select_floor(lock: &RwLock<Option<Editor>>, floor_number: u32) -> Result<(), AppError> {
    with_editor_mut(lock, |editor| Ok(editor.select_floor(floor_number)?))
}

/// Add a floor above the highest one; returns its number.
pub fn add_floor(
    lock: &RwLock<Option<Editor>>,
    vehicle_types: Vec<VehicleType>,
) -> Result<u32, AppError> {
    let types: BTreeSet<VehicleType> = vehicle_types.into_iter().collect();
    with_editor_mut(lock, |editor| Ok(editor.add_floor(types)?))
}

pub fn edit_floor_vehicle_types(
    lock: &RwLock<Option<Editor>>,
    floor_number: u32,
    vehicle_types: Vec<VehicleType>,
) -> Result<(), AppError> {
    let types: BTreeSet<VehicleType> = vehicle_types.into_iter().collect();
    with_editor_mut(lock, |editor| {
        Ok(editor.edit_floor_vehicle_types(floor_number, types)?)
    })
}

pub fn rename_floor(
    lock: &RwLock<Option<Editor>>,
    floor_number: u32,
    name: &str,
) -> Result<(), AppError> {
    with_editor_mut(lock, |editor| Ok(editor.rename_floor(floor_number, name)?))
}

pub fn set_floor_bounds(
    lock: &RwLock<Option<Editor>>,
    floor_number: u32,
    bounds: Rect,
) -> Result<(), AppError> {
    with_editor_mut(lock, |editor| Ok(editor.set_floor_bounds(floor_number, bounds)?))
}

/// Delete an unsaved floor; returns the floor that is current afterwards.
pub fn delete_floor(lock: &RwLock<Option<Editor>>, floor_number: u32) -> Result<u32, AppError> {
    with_editor_mut(lock, |editor| {
        editor.delete_floor(floor_number)?;
        Ok(editor.current_floor_number())
    })
}

/// Copy the areas of `source` onto `target`; returns how many were copied.
pub fn copy_floor(
    lock: &RwLock<Option<Editor>>,
    source: u32,
    target: u32,
) -> Result<usize, AppError> {
    with_editor_mut(lock, |editor| Ok(editor.copy_floor(source, target)?))
}

#[cfg(test)]
mod tests {
    use super::super::test_support::open_lock;
    use super::*;
    use crate::commands::with_editor;

    #[test]
    fn add_then_delete_floor_falls_back_to_floor_one() {
        let lock = open_lock(10, 10);
        let number = add_floor(&lock, vec![VehicleType::Motorbike]).expect("add");
        assert_eq!(number, 2);
        assert_eq!(delete_floor(&lock, 2).expect("delete"), 1);
    }

    #[test]
    fn unregistered_vehicle_type_is_invalid_input() {
        let lock = open_lock(10, 10);
        let err = add_floor(&lock, vec![VehicleType::Bike]).unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
        let err = add_floor(&lock, Vec::new()).unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
    }

    #[test]
    fn last_floor_cannot_be_deleted() {
        let lock = open_lock(10, 10);
        let err = delete_floor(&lock, 1).unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
    }

    #[test]
    fn missing_floor_is_not_found() {
        let lock = open_lock(10, 10);
        assert!(matches!(
            select_floor(&lock, 9).unwrap_err(),
            AppError::NotFound(_)
        ));
    }

    #[test]
    fn small_bounds_are_rejected() {
        let lock = open_lock(10, 10);
        let err = set_floor_bounds(&lock, 1, Rect::new(0.0, 0.0, 20.0, 400.0)).unwrap_err();
        assert!(matches!(err, AppError::GeometryTooSmall(_)));
        set_floor_bounds(&lock, 1, Rect::new(0.0, 0.0, 600.0, 400.0)).expect("bounds");
        let bounds = with_editor(&lock, |e| Ok(e.current_floor()?.bounds)).expect("read");
        assert_eq!(bounds, Some(Rect::new(0.0, 0.0, 600.0, 400.0)));
    }
}
