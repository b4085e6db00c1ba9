//! Command handlers over the shared editor state.
//!
//! Sub-modules are grouped by concern:
//! - [`session`] : open/close the editor, snapshot, save, map reset
//! - [`canvas`]  : mode switch, pointer and keyboard input
//! - [`areas`]   : area configuration, selection and spots
//! - [`floors`]  : floor add/edit/copy/delete
//! - [`dispatch`]: the serializable [`EditorCommand`] and its router
//!
//! Synchronous handlers take `&RwLock<Option<Editor>>` and return
//! `Result<_, AppError>`. Handlers that reach the backend are `async` and
//! never hold the lock across an `.await`.

pub mod areas;
pub mod canvas;
pub mod dispatch;
pub mod floors;
pub mod session;

pub use dispatch::{dispatch, EditorCommand};

use std::sync::RwLock;

use uuid::Uuid;

use crate::editor::Editor;
use crate::error::AppError;

/// Run `f` against the open editor under a read lock.
pub(crate) fn with_editor<T>(
    lock: &RwLock<Option<Editor>>,
    f: impl FnOnce(&Editor) -> Result<T, AppError>,
) -> Result<T, AppError> {
    let guard = lock
        .read()
        .map_err(|_| lock_poisoned())?;
    let editor = guard.as_ref().ok_or(AppError::EditorClosed)?;
    f(editor)
}

/// Run `f` against the open editor under a write lock.
pub(crate) fn with_editor_mut<T>(
    lock: &RwLock<Option<Editor>>,
    f: impl FnOnce(&mut Editor) -> Result<T, AppError>,
) -> Result<T, AppError> {
    let mut guard = lock
        .write()
        .map_err(|_| lock_poisoned())?;
    let editor = guard.as_mut().ok_or(AppError::EditorClosed)?;
    f(editor)
}

pub(crate) fn lock_poisoned() -> AppError {
    AppError::Internal("editor lock poisoned".to_string())
}

/// Parse an area or spot id received as text.
pub(crate) fn parse_entity_id(id: &str, kind: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(id).map_err(|_| AppError::InvalidInput(format!("invalid {kind} id: {id}")))
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::RwLock;

    use crate::editor::{Editor, EditorSettings};
    use crate::layout::LayoutDocument;
    use crate::models::{LotCapacity, LotStatus, ParkingLot, VehicleType};

    pub fn lot(car_capacity: u32, motorbike_capacity: u32) -> ParkingLot {
        ParkingLot {
            id: "lot-1".to_string(),
            name: "Central".to_string(),
            total_floors: 3,
            status: LotStatus::Preparing,
            capacities: vec![
                LotCapacity::new(VehicleType::CarUpTo9Seats, car_capacity),
                LotCapacity::new(VehicleType::Motorbike, motorbike_capacity),
            ],
        }
    }

    pub fn open_lock(car_capacity: u32, motorbike_capacity: u32) -> RwLock<Option<Editor>> {
        let editor = Editor::open(
            lot(car_capacity, motorbike_capacity),
            LayoutDocument::default(),
            EditorSettings::default(),
        )
        .expect("open editor");
        RwLock::new(Some(editor))
    }
}
