//! Mode switch, pointer and keyboard handlers.

use std::sync::RwLock;

use crate::editor::{Editor, Key, KeyOutcome, Mode, PointerDown, PointerUp};
use crate::error::AppError;
use crate::models::Point;

use super::{with_editor, with_editor_mut};

pub fn set_mode(lock: &RwLock<Option<Editor>>, mode: Mode) -> Result<(), AppError> {
    with_editor_mut(lock, |editor| {
        editor.set_mode(mode);
        Ok(())
    })
}

pub fn get_mode(lock: &RwLock<Option<Editor>>) -> Result<Mode, AppError> {
    with_editor(lock, |editor| Ok(editor.mode()))
}

pub fn pointer_down(
    lock: &RwLock<Option<Editor>>,
    x: f64,
    y: f64,
) -> Result<PointerDown, AppError> {
    with_editor_mut(lock, |editor| Ok(editor.pointer_down(Point::new(x, y))?))
}

pub fn pointer_move(lock: &RwLock<Option<Editor>>, x: f64, y: f64) -> Result<(), AppError> {
    with_editor_mut(lock, |editor| {
        editor.pointer_move(Point::new(x, y));
        Ok(())
    })
}

pub fn pointer_up(lock: &RwLock<Option<Editor>>, x: f64, y: f64) -> Result<PointerUp, AppError> {
    with_editor_mut(lock, |editor| Ok(editor.pointer_up(Point::new(x, y))))
}

pub fn key_down(lock: &RwLock<Option<Editor>>, key: Key) -> Result<KeyOutcome, AppError> {
    with_editor_mut(lock, |editor| Ok(editor.key_down(key)?))
}
