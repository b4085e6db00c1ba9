//! Pointer and keyboard handling.
//!
//! Each handler dispatches on the current [`Mode`] and [`Gesture`]. A
//! pointer-down that lands on an existing area or spot selects it and starts
//! no gesture.

use serde::Serialize;
use uuid::Uuid;

use super::{Editor, Gesture, LayoutError, Mode, PendingArea, PreviewArea, PREVIEW_AREA_ID};
use crate::layout::capacity;
use crate::models::{Hit, Point, Rect, Stroke};

/// What a pointer-down did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum PointerDown {
    /// An existing shape was hit and is now selected.
    Selected {
        area_id: Uuid,
        spot_id: Option<Uuid>,
    },
    /// A gesture started.
    Started,
    /// Nothing happened (e.g. an area is awaiting configuration).
    Ignored,
}

/// What a pointer-up did.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum PointerUp {
    Idle,
    StrokeFinished { stroke_id: Uuid },
    EraseFinished,
    BoundsSet { bounds: Rect },
    BoundsDiscarded,
    /// The drag qualifies as an area; configuration is required to commit it.
    AreaPending { pending: PendingArea },
    AreaDiscarded,
}

/// Keys the editor reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Key {
    Delete,
    Backspace,
    Escape,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum KeyOutcome {
    SpotDeleted { spot_id: Uuid },
    AreaDeleted { area_id: Uuid },
    Cancelled,
    Ignored,
}

impl Editor {
    /// Handle a pointer press at `p`.
    ///
    /// In area mode the press is refused with
    /// [`LayoutError::CapacityExceeded`] when no capacity is left.
    pub fn pointer_down(&mut self, p: Point) -> Result<PointerDown, LayoutError> {
        if !matches!(self.gesture, Gesture::Idle) {
            return Ok(PointerDown::Ignored);
        }

        if let Some(hit) = self.current_floor()?.hit_test(p) {
            let (area_id, spot_id) = match hit {
                Hit::Area(area_id) => (area_id, None),
                Hit::Spot { area_id, spot_id } => (area_id, Some(spot_id)),
            };
            self.selection.area_id = Some(area_id);
            self.selection.spot_id = spot_id;
            return Ok(PointerDown::Selected { area_id, spot_id });
        }

        self.selection = Default::default();
        match self.mode {
            Mode::Draw => {
                let stroke = Stroke::starting_at(p);
                let stroke_id = stroke.id;
                self.current_floor_mut()?.strokes.push(stroke);
                self.gesture = Gesture::Drawing { stroke_id };
            }
            Mode::Erase => {
                self.gesture = Gesture::Erasing;
            }
            Mode::FloorBounds => {
                self.gesture = Gesture::SettingBounds {
                    anchor: p,
                    preview: Rect::from_drag(p, p),
                };
            }
            Mode::Area => {
                if !self.can_place_more_spots() {
                    let err = self.capacity_exceeded();
                    tracing::warn!(%err, "area drawing refused");
                    return Err(err);
                }
                self.gesture = Gesture::DrawingArea {
                    anchor: p,
                    preview: PreviewArea {
                        id: PREVIEW_AREA_ID,
                        rect: Rect::from_drag(p, p),
                        max_spots: 0,
                    },
                };
            }
        }
        tracing::debug!(mode = ?self.mode, x = p.x, y = p.y, "gesture started");
        Ok(PointerDown::Started)
    }

    /// Handle pointer motion to `p`.
    pub fn pointer_move(&mut self, p: Point) {
        let grid = self.settings.grid;
        let erase_size = self.settings.erase_size;
        match self.gesture {
            Gesture::Drawing { stroke_id } => {
                if let Ok(floor) = self.current_floor_mut() {
                    if let Some(stroke) = floor.strokes.iter_mut().find(|s| s.id == stroke_id) {
                        stroke.points.push(p);
                    }
                }
            }
            Gesture::Erasing => {
                if let Ok(floor) = self.current_floor_mut() {
                    floor.strokes.retain(|s| !s.passes_near(p, erase_size));
                }
            }
            Gesture::SettingBounds {
                anchor,
                ref mut preview,
            } => {
                *preview = Rect::from_drag(anchor, p);
            }
            Gesture::DrawingArea {
                anchor,
                ref mut preview,
            } => {
                preview.rect = Rect::from_drag(anchor, p);
                preview.max_spots = capacity::max_spots_for_rect(&preview.rect, &grid);
            }
            Gesture::Idle | Gesture::ConfiguringArea(_) => {}
        }
    }

    /// Handle pointer release at `p`. Never fails; undersized rectangles are
    /// discarded silently.
    pub fn pointer_up(&mut self, p: Point) -> PointerUp {
        let gesture = std::mem::replace(&mut self.gesture, Gesture::Idle);
        match gesture {
            Gesture::Idle => PointerUp::Idle,
            Gesture::ConfiguringArea(pending) => {
                self.gesture = Gesture::ConfiguringArea(pending);
                PointerUp::Idle
            }
            Gesture::Drawing { stroke_id } => PointerUp::StrokeFinished { stroke_id },
            Gesture::Erasing => PointerUp::EraseFinished,
            Gesture::SettingBounds { anchor, .. } => {
                let rect = Rect::from_drag(anchor, p);
                if !rect.exceeds(self.settings.min_floor_side) {
                    return PointerUp::BoundsDiscarded;
                }
                match self.current_floor_mut() {
                    Ok(floor) => {
                        floor.bounds = Some(rect);
                        floor.mark_modified();
                        tracing::info!(
                            floor = floor.floor_number,
                            width = rect.width,
                            height = rect.height,
                            "floor bounds set"
                        );
                        PointerUp::BoundsSet { bounds: rect }
                    }
                    Err(_) => PointerUp::BoundsDiscarded,
                }
            }
            Gesture::DrawingArea { anchor, .. } => {
                let rect = Rect::from_drag(anchor, p);
                let remaining = self.remaining_capacity();
                if !rect.exceeds(self.settings.min_area_side) || remaining == 0 {
                    return PointerUp::AreaDiscarded;
                }
                let max_spots = capacity::max_spots_for_rect(&rect, &self.settings.grid);
                let pending = PendingArea {
                    rect,
                    max_spots,
                    capacity_limit: max_spots.min(remaining),
                };
                self.gesture = Gesture::ConfiguringArea(pending);
                PointerUp::AreaPending { pending }
            }
        }
    }

    /// Handle a key press. Delete/Backspace remove the selected spot, else
    /// the selected area (area mode only); Escape cancels a pending area.
    pub fn key_down(&mut self, key: Key) -> Result<KeyOutcome, LayoutError> {
        match key {
            Key::Escape => {
                if matches!(self.gesture, Gesture::Idle) {
                    return Ok(KeyOutcome::Ignored);
                }
                self.gesture = Gesture::Idle;
                Ok(KeyOutcome::Cancelled)
            }
            Key::Delete | Key::Backspace => {
                if self.mode != Mode::Area {
                    return Ok(KeyOutcome::Ignored);
                }
                match (self.selection.area_id, self.selection.spot_id) {
                    (Some(area_id), Some(spot_id)) => {
                        self.delete_spot(area_id, spot_id)?;
                        Ok(KeyOutcome::SpotDeleted { spot_id })
                    }
                    (Some(area_id), None) => {
                        self.delete_area(area_id)?;
                        Ok(KeyOutcome::AreaDeleted { area_id })
                    }
                    _ => Ok(KeyOutcome::Ignored),
                }
            }
        }
    }
}
