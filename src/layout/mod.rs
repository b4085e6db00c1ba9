//! In-memory layout document and the pure rules that govern it.
//!
//! ```text
//! layout/
//! ├── capacity.rs     capacity ledger and vehicle-type permissions
//! └── autolayout.rs   row-major spot packing inside a car area
//! ```

pub mod autolayout;
pub mod capacity;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::Floor;

/// Fixed spot footprint and spacing used by the packing grid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpotGrid {
    pub width: f64,
    pub height: f64,
    pub padding: f64,
}

impl SpotGrid {
    pub fn pitch_x(&self) -> f64 {
        self.width + self.padding
    }

    pub fn pitch_y(&self) -> f64 {
        self.height + self.padding
    }

    /// Offset of the first cell from the area's top-left corner.
    pub fn inset(&self) -> f64 {
        self.padding / 2.0
    }
}

impl Default for SpotGrid {
    fn default() -> Self {
        Self {
            width: 40.0,
            height: 60.0,
            padding: 10.0,
        }
    }
}

/// A saved area or spot removed locally. The next save deletes it remotely.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "entity", rename_all = "snake_case")]
pub enum RemoteDeletion {
    Area {
        #[serde(rename = "floorNumber")]
        floor_number: u32,
        name: String,
        #[serde(rename = "backendId")]
        backend_id: String,
    },
    Spot {
        #[serde(rename = "floorNumber")]
        floor_number: u32,
        #[serde(rename = "areaName")]
        area_name: String,
        #[serde(rename = "areaBackendId")]
        area_backend_id: String,
        #[serde(rename = "backendId")]
        backend_id: String,
    },
}

/// All floors of one parking lot, keyed (and ordered) by floor number.
///
/// Created when the editor opens and discarded when it closes; it is never
/// persisted as a whole.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutDocument {
    floors: BTreeMap<u32, Floor>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pending_deletions: Vec<RemoteDeletion>,
}

impl LayoutDocument {
    /// Build a document from `floors`. A later floor with a duplicate number
    /// replaces the earlier one.
    pub fn from_floors(floors: impl IntoIterator<Item = Floor>) -> Self {
        Self {
            floors: floors.into_iter().map(|f| (f.floor_number, f)).collect(),
            pending_deletions: Vec::new(),
        }
    }

    pub fn floor(&self, number: u32) -> Option<&Floor> {
        self.floors.get(&number)
    }

    pub fn floor_mut(&mut self, number: u32) -> Option<&mut Floor> {
        self.floors.get_mut(&number)
    }

    /// Floors in ascending floor-number order.
    pub fn floors(&self) -> impl Iterator<Item = &Floor> {
        self.floors.values()
    }

    pub fn floors_mut(&mut self) -> impl Iterator<Item = &mut Floor> {
        self.floors.values_mut()
    }

    pub fn floor_numbers(&self) -> impl Iterator<Item = u32> + '_ {
        self.floors.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.floors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.floors.is_empty()
    }

    pub fn contains(&self, number: u32) -> bool {
        self.floors.contains_key(&number)
    }

    pub(crate) fn insert(&mut self, floor: Floor) {
        self.floors.insert(floor.floor_number, floor);
    }

    pub(crate) fn remove(&mut self, number: u32) -> Option<Floor> {
        self.floors.remove(&number)
    }

    pub fn total_drawn_spots(&self) -> u32 {
        capacity::total_drawn_spots(self.floors())
    }

    /// Saved entities deleted locally and not yet deleted remotely.
    pub fn pending_deletions(&self) -> &[RemoteDeletion] {
        &self.pending_deletions
    }

    /// Queue a remote delete. Deleting an area also covers any of its spots
    /// already queued.
    pub(crate) fn record_deletion(&mut self, deletion: RemoteDeletion) {
        if let RemoteDeletion::Area { backend_id, .. } = &deletion {
            self.pending_deletions.retain(|d| {
                !matches!(d, RemoteDeletion::Spot { area_backend_id, .. } if area_backend_id == backend_id)
            });
        }
        self.pending_deletions.push(deletion);
    }

    /// Drop queued deletes the backend has carried out.
    pub(crate) fn clear_deletions(&mut self, done: &[RemoteDeletion]) {
        self.pending_deletions.retain(|d| !done.contains(d));
    }
}
