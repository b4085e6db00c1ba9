//! Editor lifecycle and the handlers that reach the backend.

use std::sync::RwLock;

use tracing::{info, warn};

use crate::editor::{Editor, EditorSettings, EditorSnapshot};
use crate::error::AppError;
use crate::models::LotStatus;
use crate::persistence::{
    build_plan, delete_backend_floors, execute, load_layout, LayoutBackend, SaveReport,
};
use crate::state::AppState;

use super::{lock_poisoned, with_editor, with_editor_mut};

// ── open / close ──────────────────────────────────────────────────────────────

/// Fetch the lot's layout and open the editor on it, replacing any editor
/// already open.
pub async fn open_editor<B>(
    state: &AppState,
    backend: &B,
    lot_id: &str,
) -> Result<EditorSnapshot, AppError>
where
    B: LayoutBackend + Clone + Send + Sync + 'static,
{
    let (lot, document) = load_layout(backend, lot_id).await?;
    let editor = Editor::open(lot, document, EditorSettings::from(&state.config))?;
    let snapshot = editor.snapshot();
    let mut guard = state
        .editor
        .write()
        .map_err(|_| lock_poisoned())?;
    *guard = Some(editor);
    Ok(snapshot)
}

pub fn close_editor(lock: &RwLock<Option<Editor>>) -> Result<(), AppError> {
    let mut guard = lock
        .write()
        .map_err(|_| lock_poisoned())?;
    if guard.take().is_some() {
        info!("layout editor closed");
    }
    Ok(())
}

pub fn get_snapshot(lock: &RwLock<Option<Editor>>) -> Result<EditorSnapshot, AppError> {
    with_editor(lock, |editor| Ok(editor.snapshot()))
}

// ── save ──────────────────────────────────────────────────────────────────────

/// Send every local change to the backend: queued deletions, edits to saved
/// floors and areas, and new floors and areas.
///
/// Whatever went through is recorded in the document even when a later call
/// fails; the failure is then returned as
/// [`AppError::BackendCreateFailure`] naming the entity and carrying the
/// report of what did succeed.
pub async fn save_layout<B: LayoutBackend>(
    lock: &RwLock<Option<Editor>>,
    backend: &B,
) -> Result<SaveReport, AppError> {
    let plan = with_editor(lock, |editor| {
        Ok(build_plan(&editor.lot().id, editor.document())?)
    })?;
    info!(
        lot_id = %plan.lot_id,
        deletions = plan.deletions.len(),
        updates = plan.updates(),
        floors = plan.floor_creates(),
        areas = plan.area_creates(),
        "saving layout"
    );

    let report = execute(backend, plan).await;

    with_editor_mut(lock, |editor| {
        report.apply_to(editor.document_mut());
        if report.status_updated {
            editor.set_lot_status(LotStatus::PartnerConfiguration);
        }
        Ok(())
    })?;

    match &report.failure {
        Some(failure) => Err(AppError::BackendCreateFailure {
            message: failure.to_string(),
            report: Box::new(report),
        }),
        None => Ok(report),
    }
}

// ── reset ─────────────────────────────────────────────────────────────────────

/// Delete the lot's floors from the backend and start over with one empty
/// floor. Only allowed while the map is editable.
pub async fn reset_map<B: LayoutBackend>(
    lock: &RwLock<Option<Editor>>,
    backend: &B,
) -> Result<EditorSnapshot, AppError> {
    let mut document = with_editor(lock, |editor| {
        editor.ensure_editable()?;
        Ok(editor.document().clone())
    })?;

    let deleted = delete_backend_floors(backend, &mut document).await;

    with_editor_mut(lock, |editor| match deleted {
        Ok(count) => {
            editor.reset_document()?;
            info!(deleted = count, "map reset");
            Ok(editor.snapshot())
        }
        Err(e) => {
            warn!(error = %e, "map reset stopped");
            *editor.document_mut() = document;
            Err(e.into())
        }
    })
}
