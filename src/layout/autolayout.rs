//! Row-major spot packing inside a car area.
//!
//! Spot `i` (0-based, continuing from the area's current spot count) sits in
//! `row = i / spots_per_row`, `col = i % spots_per_row` at
//! `(col * pitch_x + inset, row * pitch_y + inset)`. Packing stops at the
//! first cell that would cross the area's edge; spots are never wrapped or
//! shrunk to fit.

use crate::models::{Area, Rect, Spot};

use super::capacity::max_spots_for_rect;
use super::SpotGrid;

/// Result of a bulk placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Placement {
    /// Count the caller asked for, after clamping to remaining capacity.
    pub requested: u32,
    /// Count actually appended to the area.
    pub placed: u32,
}

impl Placement {
    pub fn is_partial(&self) -> bool {
        self.placed < self.requested
    }
}

/// Number of spots that fit on one row of an area `area_width` wide.
pub fn spots_per_row(area_width: f64, grid: &SpotGrid) -> u32 {
    (area_width / grid.pitch_x()).floor().max(0.0) as u32
}

/// Grid cell for spot number `index` in `area_rect`, or `None` when the cell
/// would fall outside the area.
pub fn slot(index: u32, area_rect: &Rect, grid: &SpotGrid) -> Option<Rect> {
    let per_row = spots_per_row(area_rect.width, grid);
    if per_row == 0 || index >= max_spots_for_rect(area_rect, grid) {
        return None;
    }
    let row = index / per_row;
    let col = index % per_row;
    let cell = Rect::new(
        f64::from(col) * grid.pitch_x() + grid.inset(),
        f64::from(row) * grid.pitch_y() + grid.inset(),
        grid.width,
        grid.height,
    );
    area_rect.contains_relative(&cell).then_some(cell)
}

/// Cell the next spot of `area` would occupy.
pub fn next_slot(area: &Area, grid: &SpotGrid) -> Option<Rect> {
    let index = u32::try_from(area.spots().len()).ok()?;
    slot(index, &area.rect, grid)
}

/// Append up to `count` spots to `area`, stopping at the first cell that does
/// not fit. Names continue the `S<n>` sequence.
///
/// Areas that do not track individual spots are left untouched.
pub fn fill(area: &mut Area, count: u32, grid: &SpotGrid) -> Placement {
    let area_rect = area.rect;
    let mut placed = 0;
    if let Some(spots) = area.spots_mut() {
        while placed < count {
            let Ok(index) = u32::try_from(spots.len()) else {
                break;
            };
            let Some(cell) = slot(index, &area_rect, grid) else {
                break;
            };
            spots.push(Spot::new(format!("S{}", index + 1), cell));
            placed += 1;
        }
    }
    Placement {
        requested: count,
        placed,
    }
}
