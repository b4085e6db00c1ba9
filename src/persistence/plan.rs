//! Turning a [`LayoutDocument`] into the ordered list of backend calls a save
//! needs. Pure: nothing here touches the network.
//!
//! A plan runs queued remote deletions first, then walks the floors in
//! number order: create or update the floor, update its edited saved areas,
//! create its new areas.

use serde::Serialize;
use uuid::Uuid;

use super::types::{
    AreaCreateRequest, AreaUpdateRequest, CapacityRequest, FloorCreateRequest, FloorUpdateRequest,
};
use crate::editor::LayoutError;
use crate::layout::{LayoutDocument, RemoteDeletion};
use crate::models::{Floor, VehicleType};

/// Where a floor's new areas will be attached.
#[derive(Debug, Clone, PartialEq)]
pub enum FloorTarget {
    /// The floor already exists remotely under this id.
    Existing { backend_id: String },
    /// The floor must be created first.
    Create(FloorCreateRequest),
}

/// One area create call, remembering which local entities it covers.
#[derive(Debug, Clone, PartialEq)]
pub struct AreaStep {
    pub area_id: Uuid,
    pub spot_ids: Vec<Uuid>,
    pub request: AreaCreateRequest,
}

/// One update call for a saved area edited locally.
#[derive(Debug, Clone, PartialEq)]
pub struct AreaUpdateStep {
    pub area_id: Uuid,
    pub backend_id: String,
    pub request: AreaUpdateRequest,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FloorStep {
    pub floor_number: u32,
    pub target: FloorTarget,
    /// Set when a saved floor's own fields changed.
    pub update: Option<FloorUpdateRequest>,
    pub area_updates: Vec<AreaUpdateStep>,
    pub areas: Vec<AreaStep>,
}

/// Local edits a save cannot transmit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "warning", rename_all = "snake_case")]
pub enum PlanWarning {
    /// Spots added to an area that already exists remotely. The backend only
    /// accepts spots inside an area create call, so they stay local.
    UnsavedSpotsInSavedArea {
        #[serde(rename = "floorNumber")]
        floor_number: u32,
        #[serde(rename = "areaName")]
        area_name: String,
        count: usize,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct SavePlan {
    pub lot_id: String,
    /// Saved areas and spots removed locally, deleted before anything else.
    pub deletions: Vec<RemoteDeletion>,
    pub steps: Vec<FloorStep>,
    /// Saved floors that have areas but nothing new to send.
    pub skipped_floors: Vec<u32>,
    pub warnings: Vec<PlanWarning>,
}

impl SavePlan {
    /// `true` when the plan makes no floor, area or spot call.
    pub fn is_empty(&self) -> bool {
        self.deletions.is_empty() && self.steps.is_empty()
    }

    pub fn floor_creates(&self) -> usize {
        self.steps
            .iter()
            .filter(|s| matches!(s.target, FloorTarget::Create(_)))
            .count()
    }

    pub fn area_creates(&self) -> usize {
        self.steps.iter().map(|s| s.areas.len()).sum()
    }

    /// Floor and area update calls combined.
    pub fn updates(&self) -> usize {
        self.steps
            .iter()
            .map(|s| usize::from(s.update.is_some()) + s.area_updates.len())
            .sum()
    }
}

/// Capacity entries for a floor create: one per allowed vehicle type, each
/// carrying the floor's total drawn spots, or 1 when it has none.
pub fn capacity_requests(floor: &Floor) -> Vec<CapacityRequest> {
    let capacity = floor.occupied_spots().max(1);
    let requests: Vec<CapacityRequest> = floor
        .allowed_vehicle_types
        .iter()
        .map(|&vehicle_type| CapacityRequest {
            vehicle_type,
            capacity,
        })
        .collect();
    if requests.is_empty() {
        vec![CapacityRequest {
            vehicle_type: VehicleType::CarUpTo9Seats,
            capacity,
        }]
    } else {
        requests
    }
}

/// Build the save plan.
///
/// Unsaved floors are only sent once they hold an area. Saved floors get
/// their unsaved areas created, their edited areas updated and, when their
/// own fields changed, an update of their own.
pub fn build_plan(lot_id: &str, document: &LayoutDocument) -> Result<SavePlan, LayoutError> {
    let mut plan = SavePlan {
        lot_id: lot_id.to_string(),
        deletions: document.pending_deletions().to_vec(),
        steps: Vec::new(),
        skipped_floors: Vec::new(),
        warnings: Vec::new(),
    };

    let relevant = document
        .floors()
        .filter(|f| !f.areas.is_empty() || (f.exists_in_backend && f.modified));
    for floor in relevant {
        let mut area_updates = Vec::new();
        for area in floor.areas.iter().filter(|a| a.is_persisted()) {
            let count = area.spots().iter().filter(|s| !s.persisted).count();
            if count > 0 {
                plan.warnings.push(PlanWarning::UnsavedSpotsInSavedArea {
                    floor_number: floor.floor_number,
                    area_name: area.name.clone(),
                    count,
                });
            }
            if let (true, Some(backend_id)) = (area.modified, &area.backend_id) {
                area_updates.push(AreaUpdateStep {
                    area_id: area.id,
                    backend_id: backend_id.clone(),
                    request: AreaUpdateRequest::from(area),
                });
            }
        }

        let areas: Vec<AreaStep> = floor
            .areas
            .iter()
            .filter(|a| !a.is_persisted())
            .map(|area| AreaStep {
                area_id: area.id,
                spot_ids: area.spots().iter().map(|s| s.id).collect(),
                request: AreaCreateRequest::from(area),
            })
            .collect();

        let (target, update) = if floor.exists_in_backend {
            let backend_id = floor.backend_id.clone().ok_or_else(|| {
                LayoutError::InvalidInput(format!(
                    "floor {} is saved but has no backend id",
                    floor.floor_number
                ))
            })?;
            let update = floor
                .modified
                .then(|| FloorCreateRequest::new(floor, capacity_requests(floor)));
            if areas.is_empty() && area_updates.is_empty() && update.is_none() {
                plan.skipped_floors.push(floor.floor_number);
                continue;
            }
            (FloorTarget::Existing { backend_id }, update)
        } else {
            let request = FloorCreateRequest::new(floor, capacity_requests(floor));
            (FloorTarget::Create(request), None)
        };

        plan.steps.push(FloorStep {
            floor_number: floor.floor_number,
            target,
            update,
            area_updates,
            areas,
        });
    }

    Ok(plan)
}
