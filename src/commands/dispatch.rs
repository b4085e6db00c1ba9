//! Serializable editor commands and their router.
//!
//! A host (or a replay script) sends commands as JSON objects tagged by
//! `command`, e.g. `{"command": "pointer_down", "x": 10, "y": 20}`. Every
//! result is returned as a JSON value; unit results become `null`.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::editor::{AreaConfig, Key, Mode};
use crate::error::AppError;
use crate::models::{Rect, VehicleType};
use crate::persistence::LayoutBackend;
use crate::state::AppState;

use super::{areas, canvas, floors, session};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum EditorCommand {
    #[serde(rename_all = "camelCase")]
    Open {
        lot_id: String,
    },
    Close,
    Snapshot,
    SetMode {
        mode: Mode,
    },
    PointerDown {
        x: f64,
        y: f64,
    },
    PointerMove {
        x: f64,
        y: f64,
    },
    PointerUp {
        x: f64,
        y: f64,
    },
    KeyDown {
        key: Key,
    },
    CommitArea(AreaConfig),
    CancelAreaConfig,
    #[serde(rename_all = "camelCase")]
    RenameArea {
        area_id: String,
        name: String,
    },
    #[serde(rename_all = "camelCase")]
    SelectArea {
        area_id: String,
    },
    #[serde(rename_all = "camelCase")]
    SelectSpot {
        area_id: String,
        spot_id: String,
    },
    ClearSelection,
    #[serde(rename_all = "camelCase")]
    AddSpot {
        #[serde(default)]
        area_id: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    BulkAddSpots {
        #[serde(default)]
        area_id: Option<String>,
        count: u32,
    },
    #[serde(rename_all = "camelCase")]
    DeleteArea {
        area_id: String,
    },
    #[serde(rename_all = "camelCase")]
    DeleteSpot {
        area_id: String,
        spot_id: String,
    },
    #[serde(rename_all = "camelCase")]
    SelectFloor {
        floor_number: u32,
    },
    #[serde(rename_all = "camelCase")]
    AddFloor {
        vehicle_types: Vec<VehicleType>,
    },
    #[serde(rename_all = "camelCase")]
    EditFloorVehicleTypes {
        floor_number: u32,
        vehicle_types: Vec<VehicleType>,
    },
    #[serde(rename_all = "camelCase")]
    RenameFloor {
        floor_number: u32,
        name: String,
    },
    #[serde(rename_all = "camelCase")]
    SetFloorBounds {
        floor_number: u32,
        bounds: Rect,
    },
    #[serde(rename_all = "camelCase")]
    DeleteFloor {
        floor_number: u32,
    },
    CopyFloor {
        source: u32,
        target: u32,
    },
    Save,
    ResetMap,
}

fn to_json<T: Serialize>(value: T) -> Result<Value, AppError> {
    serde_json::to_value(value)
        .map_err(|e| AppError::Internal(format!("cannot serialize result: {e}")))
}

/// Run one command against `state`, reaching `backend` for open, save and
/// reset.
pub async fn dispatch<B>(
    state: &AppState,
    backend: &B,
    command: EditorCommand,
) -> Result<Value, AppError>
where
    B: LayoutBackend + Clone + Send + Sync + 'static,
{
    debug!(?command, "dispatch");
    let lock = &state.editor;
    match command {
        EditorCommand::Open { lot_id } => {
            to_json(session::open_editor(state, backend, &lot_id).await?)
        }
        EditorCommand::Close => to_json(session::close_editor(lock)?),
        EditorCommand::Snapshot => to_json(session::get_snapshot(lock)?),
        EditorCommand::SetMode { mode } => to_json(canvas::set_mode(lock, mode)?),
        EditorCommand::PointerDown { x, y } => to_json(canvas::pointer_down(lock, x, y)?),
        EditorCommand::PointerMove { x, y } => to_json(canvas::pointer_move(lock, x, y)?),
        EditorCommand::PointerUp { x, y } => to_json(canvas::pointer_up(lock, x, y)?),
        EditorCommand::KeyDown { key } => to_json(canvas::key_down(lock, key)?),
        EditorCommand::CommitArea(config) => to_json(areas::commit_area(lock, config)?),
        EditorCommand::CancelAreaConfig => to_json(areas::cancel_area_config(lock)?),
        EditorCommand::RenameArea { area_id, name } => {
            to_json(areas::rename_area(lock, &area_id, &name)?)
        }
        EditorCommand::SelectArea { area_id } => to_json(areas::select_area(lock, &area_id)?),
        EditorCommand::SelectSpot { area_id, spot_id } => {
            to_json(areas::select_spot(lock, &area_id, &spot_id)?)
        }
        EditorCommand::ClearSelection => to_json(areas::clear_selection(lock)?),
        EditorCommand::AddSpot { area_id } => {
            to_json(areas::add_single_spot(lock, area_id.as_deref())?)
        }
        EditorCommand::BulkAddSpots { area_id, count } => {
            to_json(areas::bulk_add_spots(lock, area_id.as_deref(), count)?)
        }
        EditorCommand::DeleteArea { area_id } => to_json(areas::delete_area(lock, &area_id)?),
        EditorCommand::DeleteSpot { area_id, spot_id } => {
            to_json(areas::delete_spot(lock, &area_id, &spot_id)?)
        }
        EditorCommand::SelectFloor { floor_number } => {
            to_json(floors::select_floor(lock, floor_number)?)
        }
        EditorCommand::AddFloor { vehicle_types } => {
            to_json(floors::add_floor(lock, vehicle_types)?)
        }
        EditorCommand::EditFloorVehicleTypes {
            floor_number,
            vehicle_types,
        } => to_json(floors::edit_floor_vehicle_types(
            lock,
            floor_number,
            vehicle_types,
        )?),
        EditorCommand::RenameFloor { floor_number, name } => {
            to_json(floors::rename_floor(lock, floor_number, &name)?)
        }
        EditorCommand::SetFloorBounds {
            floor_number,
            bounds,
        } => to_json(floors::set_floor_bounds(lock, floor_number, bounds)?),
        EditorCommand::DeleteFloor { floor_number } => {
            to_json(floors::delete_floor(lock, floor_number)?)
        }
        EditorCommand::CopyFloor { source, target } => {
            to_json(floors::copy_floor(lock, source, target)?)
        }
        EditorCommand::Save => to_json(session::save_layout(lock, backend).await?),
        EditorCommand::ResetMap => to_json(session::reset_map(lock, backend).await?),
    }
}
