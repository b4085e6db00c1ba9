//! Interactive parking-map editor.
//!
//! ```text
//! editor/
//! ├── pointer.rs   pointer/keyboard state machine (draw, erase, bounds, area)
//! ├── areas.rs     area configuration and spot placement
//! └── floors.rs    floor add/edit/copy/delete and map reset
//! ```
//!
//! The [`Editor`] owns one [`LayoutDocument`] and works on one current floor
//! at a time. Every mutation consults [`crate::layout::capacity`] first and
//! is rejected with a [`LayoutError`] before anything changes. After any
//! error the gesture state is [`Gesture::Idle`].

mod areas;
mod floors;
mod pointer;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::AppConfig;
use crate::layout::{capacity, LayoutDocument, SpotGrid};
use crate::models::{Floor, LotStatus, ParkingLot, Point, Rect, VehicleType};

pub use areas::AreaConfig;
pub use pointer::{Key, KeyOutcome, PointerDown, PointerUp};

/// Fixed id of the synthetic preview area shown while an area is dragged.
pub const PREVIEW_AREA_ID: Uuid = Uuid::nil();

/// Domain errors raised by the editor. Converted to
/// [`crate::error::AppError`] at the command boundary.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LayoutError {
    #[error("spot limit reached: {drawn} of {registered} registered spots are drawn")]
    CapacityExceeded { drawn: u32, registered: u32 },

    #[error("{width}x{height} is too small; both sides must exceed {min}px")]
    GeometryTooSmall { width: f64, height: f64, min: f64 },

    #[error("area fits at most {max} spots, {requested} requested")]
    AreaTooSmall { requested: u32, max: u32 },

    #[error("area '{0}' has no room for another spot")]
    AreaFull(String),

    #[error("{0}")]
    InvalidSelection(String),

    #[error("vehicle type {0} is not registered for this parking lot")]
    VehicleTypeNotAllowed(VehicleType),

    #[error("select at least one vehicle type")]
    NoVehicleTypeSelected,

    #[error("parking lot is registered with {total_floors} floors")]
    FloorLimitReached { total_floors: u32 },

    #[error("the last remaining floor cannot be deleted")]
    LastFloor,

    #[error("floor {0} is already saved and cannot be changed here")]
    FloorPersisted(u32),

    #[error("floor {0} has no areas to copy")]
    EmptySourceFloor(u32),

    #[error("map is locked while the parking lot is {status}")]
    StateLocked { status: String },

    #[error("floor {0} not found")]
    FloorNotFound(u32),

    #[error("area {0} not found")]
    AreaNotFound(Uuid),

    #[error("spot {0} not found")]
    SpotNotFound(Uuid),

    #[error("{0}")]
    InvalidInput(String),
}

/// Interaction mode selected in the toolbar.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    #[default]
    Draw,
    Erase,
    Area,
    FloorBounds,
}

/// Live rectangle shown while an area is being dragged.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewArea {
    pub id: Uuid,
    pub rect: Rect,
    /// Spots the rectangle could hold at the configured grid.
    pub max_spots: u32,
}

/// A drawn rectangle waiting for its vehicle type and capacity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingArea {
    pub rect: Rect,
    pub max_spots: u32,
    /// Upper bound for a non-car area's capacity:
    /// `min(max_spots, remaining capacity)` at the time the drag ended.
    pub capacity_limit: u32,
}

/// Pointer gesture in progress. Exactly one is active at any time.
#[derive(Debug, Clone, PartialEq)]
pub enum Gesture {
    Idle,
    Drawing { stroke_id: Uuid },
    Erasing,
    SettingBounds { anchor: Point, preview: Rect },
    DrawingArea { anchor: Point, preview: PreviewArea },
    ConfiguringArea(PendingArea),
}

/// Currently selected area and, optionally, one of its spots.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Selection {
    pub area_id: Option<Uuid>,
    pub spot_id: Option<Uuid>,
}

/// Thresholds and grid the editor enforces.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EditorSettings {
    pub grid: SpotGrid,
    pub erase_size: f64,
    pub min_area_side: f64,
    pub min_floor_side: f64,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

impl From<&AppConfig> for EditorSettings {
    fn from(cfg: &AppConfig) -> Self {
        Self {
            grid: cfg.spot_grid(),
            erase_size: cfg.editor.erase_size,
            min_area_side: cfg.editor.min_area_side,
            min_floor_side: cfg.editor.min_floor_side,
        }
    }
}

/// Registered vs. drawn spot totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CapacityLedger {
    pub registered: u32,
    pub drawn: u32,
    pub remaining: u32,
}

/// Serializable view of the whole editor for a host UI.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorSnapshot {
    pub lot_id: String,
    pub lot_status: LotStatus,
    pub mode: Mode,
    pub current_floor: u32,
    pub floors: Vec<Floor>,
    pub ledger: CapacityLedger,
    pub selection: Selection,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview_area: Option<PreviewArea>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview_bounds: Option<Rect>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pending_area: Option<PendingArea>,
}

/// The layout editor for one parking lot.
#[derive(Debug, Clone)]
pub struct Editor {
    lot: ParkingLot,
    document: LayoutDocument,
    current_floor: u32,
    mode: Mode,
    gesture: Gesture,
    selection: Selection,
    settings: EditorSettings,
}

impl Editor {
    /// Open the editor on `document`.
    ///
    /// Refused with [`LayoutError::StateLocked`] unless the lot is in a
    /// map-editable status. An empty document gets a fresh floor 1.
    pub fn open(
        lot: ParkingLot,
        mut document: LayoutDocument,
        settings: EditorSettings,
    ) -> Result<Self, LayoutError> {
        ensure_editable(&lot.status)?;
        if document.is_empty() {
            document.insert(Floor::new(
                1,
                capacity::allowed_vehicle_types(&lot.capacities),
            ));
        }
        let current_floor = document.floor_numbers().next().unwrap_or(1);
        tracing::info!(
            lot_id = %lot.id,
            floors = document.len(),
            "layout editor opened"
        );
        Ok(Self {
            lot,
            document,
            current_floor,
            mode: Mode::default(),
            gesture: Gesture::Idle,
            selection: Selection::default(),
            settings,
        })
    }

    /// The lot this editor was opened for, as fetched at open time.
    pub fn lot(&self) -> &ParkingLot {
        &self.lot
    }

    /// The layout being edited, including unsaved changes.
    pub fn document(&self) -> &LayoutDocument {
        &self.document
    }

    pub(crate) fn document_mut(&mut self) -> &mut LayoutDocument {
        &mut self.document
    }

    pub fn settings(&self) -> &EditorSettings {
        &self.settings
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Gesture in progress, or [`Gesture::Idle`].
    pub fn gesture(&self) -> &Gesture {
        &self.gesture
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    /// Number of the floor the canvas shows. The floor itself may not
    /// exist yet; see [`Editor::current_floor`].
    pub fn current_floor_number(&self) -> u32 {
        self.current_floor
    }

    pub fn current_floor(&self) -> Result<&Floor, LayoutError> {
        self.document
            .floor(self.current_floor)
            .ok_or(LayoutError::FloorNotFound(self.current_floor))
    }

    pub(crate) fn current_floor_mut(&mut self) -> Result<&mut Floor, LayoutError> {
        let number = self.current_floor;
        self.document
            .floor_mut(number)
            .ok_or(LayoutError::FloorNotFound(number))
    }

    /// Record a new lot status (after a successful save flips it).
    pub fn set_lot_status(&mut self, status: LotStatus) {
        self.lot.status = status;
    }

    /// Switch interaction mode. Any gesture in progress, preview included,
    /// is discarded.
    pub fn set_mode(&mut self, mode: Mode) {
        if self.mode != mode {
            tracing::debug!(from = ?self.mode, to = ?mode, "editor mode changed");
        }
        self.mode = mode;
        self.gesture = Gesture::Idle;
        self.selection = Selection::default();
    }

    pub fn ledger(&self) -> CapacityLedger {
        let registered = capacity::total_registered_capacity(&self.lot.capacities);
        let drawn = self.document.total_drawn_spots();
        CapacityLedger {
            registered,
            drawn,
            remaining: registered.saturating_sub(drawn),
        }
    }

    pub fn can_place_more_spots(&self) -> bool {
        capacity::can_place_more_spots(self.document.floors(), &self.lot.capacities)
    }

    pub fn remaining_capacity(&self) -> u32 {
        capacity::remaining_capacity(self.document.floors(), &self.lot.capacities)
    }

    pub(crate) fn capacity_exceeded(&self) -> LayoutError {
        let ledger = self.ledger();
        LayoutError::CapacityExceeded {
            drawn: ledger.drawn,
            registered: ledger.registered,
        }
    }

    pub(crate) fn ensure_editable(&self) -> Result<(), LayoutError> {
        ensure_editable(&self.lot.status)
    }

    pub fn snapshot(&self) -> EditorSnapshot {
        let (preview_area, preview_bounds, pending_area) = match &self.gesture {
            Gesture::DrawingArea { preview, .. } => (Some(*preview), None, None),
            Gesture::SettingBounds { preview, .. } => (None, Some(*preview), None),
            Gesture::ConfiguringArea(pending) => (None, None, Some(*pending)),
            _ => (None, None, None),
        };
        EditorSnapshot {
            lot_id: self.lot.id.clone(),
            lot_status: self.lot.status,
            mode: self.mode,
            current_floor: self.current_floor,
            floors: self.document.floors().cloned().collect(),
            ledger: self.ledger(),
            selection: self.selection,
            preview_area,
            preview_bounds,
            pending_area,
        }
    }
}

fn ensure_editable(status: &LotStatus) -> Result<(), LayoutError> {
    if status.allows_map_editing() {
        Ok(())
    } else {
        Err(LayoutError::StateLocked {
            status: status.as_token().to_string(),
        })
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::models::LotCapacity;

    pub fn lot(capacities: Vec<LotCapacity>, total_floors: u32) -> ParkingLot {
        ParkingLot {
            id: "lot-1".to_string(),
            name: "Test Lot".to_string(),
            total_floors,
            status: LotStatus::Preparing,
            capacities,
        }
    }

    pub fn editor(capacities: Vec<LotCapacity>) -> Editor {
        Editor::open(
            lot(capacities, 3),
            LayoutDocument::default(),
            EditorSettings::default(),
        )
        .expect("open editor")
    }

    /// Drag an area rectangle in area mode and leave it pending.
    pub fn drag_area(editor: &mut Editor, from: (f64, f64), to: (f64, f64)) -> PointerUp {
        editor.set_mode(Mode::Area);
        editor
            .pointer_down(Point::new(from.0, from.1))
            .expect("pointer down");
        editor.pointer_move(Point::new(to.0, to.1));
        editor.pointer_up(Point::new(to.0, to.1))
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use crate::models::LotCapacity;

    #[test]
    fn open_creates_first_floor_for_empty_document() {
        let editor = editor(vec![LotCapacity::new(VehicleType::CarUpTo9Seats, 10)]);
        assert_eq!(editor.document().len(), 1);
        assert_eq!(editor.current_floor_number(), 1);
        let floor = editor.current_floor().expect("floor 1");
        assert!(floor
            .allowed_vehicle_types
            .contains(&VehicleType::CarUpTo9Seats));
        assert_eq!(floor.allowed_vehicle_types.len(), 1);
    }

    #[test]
    fn open_is_refused_outside_editable_statuses() {
        let mut lot = lot(vec![], 1);
        lot.status = LotStatus::Active;
        let err = Editor::open(lot, LayoutDocument::default(), EditorSettings::default())
            .unwrap_err();
        assert_eq!(
            err,
            LayoutError::StateLocked {
                status: "ACTIVE".to_string()
            }
        );
        assert!(err.to_string().contains("ACTIVE"));
    }

    #[test]
    fn ledger_reports_registered_and_remaining() {
        let editor = editor(vec![
            LotCapacity::new(VehicleType::CarUpTo9Seats, 10),
            LotCapacity::new(VehicleType::Bike, 5),
        ]);
        assert_eq!(
            editor.ledger(),
            CapacityLedger {
                registered: 15,
                drawn: 0,
                remaining: 15
            }
        );
    }

    #[test]
    fn set_mode_discards_preview() {
        let mut editor = editor(vec![LotCapacity::new(VehicleType::CarUpTo9Seats, 10)]);
        editor.set_mode(Mode::Area);
        editor
            .pointer_down(Point::new(10.0, 10.0))
            .expect("pointer down");
        editor.pointer_move(Point::new(100.0, 100.0));
        assert!(editor.snapshot().preview_area.is_some());

        editor.set_mode(Mode::Draw);
        assert_eq!(editor.gesture(), &Gesture::Idle);
        assert!(editor.snapshot().preview_area.is_none());
    }

    #[test]
    fn snapshot_serializes_camel_case() {
        let editor = editor(vec![]);
        let value = serde_json::to_value(editor.snapshot()).expect("to_value");
        assert_eq!(value["lotId"], "lot-1");
        assert_eq!(value["currentFloor"], 1);
        assert_eq!(value["mode"], "draw");
        assert_eq!(value["ledger"]["registered"], 0);
        assert!(value.get("previewArea").is_none());
    }
}
