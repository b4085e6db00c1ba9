//! Runs a [`SavePlan`] against a backend, one call at a time.
//!
//! Queued deletions go first, then each floor is created or updated before
//! its areas. The first failure stops the run. Whatever succeeded before it
//! is reported so the caller can record it; a retry then only sends what is
//! still outstanding.

use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use super::plan::{FloorStep, FloorTarget, PlanWarning, SavePlan};
use super::{BackendError, LayoutBackend};
use crate::layout::{LayoutDocument, RemoteDeletion};
use crate::models::LotStatus;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedFloor {
    pub floor_number: u32,
    pub backend_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedArea {
    pub floor_number: u32,
    pub area_id: Uuid,
    pub backend_id: String,
    /// Local spot ids sent with the area, paired with the remote id when the
    /// response listed one.
    pub spots: Vec<(Uuid, Option<String>)>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatedArea {
    pub floor_number: u32,
    pub area_id: Uuid,
}

/// What the failed call was trying to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SaveAction {
    Create,
    Update,
    Delete,
}

impl std::fmt::Display for SaveAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            SaveAction::Create => "create",
            SaveAction::Update => "update",
            SaveAction::Delete => "delete",
        })
    }
}

/// The entity whose call failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "entity", rename_all = "snake_case")]
pub enum FailedEntity {
    Floor {
        #[serde(rename = "floorNumber")]
        floor_number: u32,
    },
    Area {
        #[serde(rename = "floorNumber")]
        floor_number: u32,
        name: String,
    },
    Spot {
        #[serde(rename = "floorNumber")]
        floor_number: u32,
        #[serde(rename = "areaName")]
        area_name: String,
    },
}

impl std::fmt::Display for FailedEntity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailedEntity::Floor { floor_number } => write!(f, "floor {floor_number}"),
            FailedEntity::Area { floor_number, name } => {
                write!(f, "area '{name}' on floor {floor_number}")
            }
            FailedEntity::Spot {
                floor_number,
                area_name,
            } => write!(f, "spot in area '{area_name}' on floor {floor_number}"),
        }
    }
}

impl From<&RemoteDeletion> for FailedEntity {
    fn from(deletion: &RemoteDeletion) -> Self {
        match deletion {
            RemoteDeletion::Area {
                floor_number, name, ..
            } => FailedEntity::Area {
                floor_number: *floor_number,
                name: name.clone(),
            },
            RemoteDeletion::Spot {
                floor_number,
                area_name,
                ..
            } => FailedEntity::Spot {
                floor_number: *floor_number,
                area_name: area_name.clone(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveFailure {
    pub action: SaveAction,
    #[serde(flatten)]
    pub entity: FailedEntity,
    pub message: String,
}

impl SaveFailure {
    fn new(action: SaveAction, entity: FailedEntity, error: BackendError) -> Self {
        Self {
            action,
            entity,
            message: error.to_string(),
        }
    }
}

impl std::fmt::Display for SaveFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "failed to {} {}: {}", self.action, self.entity, self.message)
    }
}

/// Outcome of a save run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveReport {
    pub deleted: Vec<RemoteDeletion>,
    pub created_floors: Vec<CreatedFloor>,
    pub updated_floors: Vec<u32>,
    pub created_areas: Vec<CreatedArea>,
    pub updated_areas: Vec<UpdatedArea>,
    pub skipped_floors: Vec<u32>,
    pub warnings: Vec<PlanWarning>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<SaveFailure>,
    /// Whether the lot was moved to `PARTNER_CONFIGURATION`.
    pub status_updated: bool,
    /// RFC 3339 timestamp of when the run ended.
    pub finished_at: String,
}

impl SaveReport {
    pub fn is_success(&self) -> bool {
        self.failure.is_none()
    }

    /// Record in `document` everything this run sent: created entities
    /// become persisted, updated ones clean, and carried-out deletions leave
    /// the queue.
    pub fn apply_to(&self, document: &mut LayoutDocument) {
        document.clear_deletions(&self.deleted);
        for created in &self.created_floors {
            if let Some(floor) = document.floor_mut(created.floor_number) {
                floor.exists_in_backend = true;
                floor.backend_id = Some(created.backend_id.clone());
            }
        }
        for number in &self.updated_floors {
            if let Some(floor) = document.floor_mut(*number) {
                floor.modified = false;
            }
        }
        for updated in &self.updated_areas {
            if let Some(area) = document
                .floor_mut(updated.floor_number)
                .and_then(|f| f.area_mut(updated.area_id))
            {
                area.modified = false;
            }
        }
        for created in &self.created_areas {
            let Some(area) = document
                .floor_mut(created.floor_number)
                .and_then(|f| f.area_mut(created.area_id))
            else {
                continue;
            };
            area.backend_id = Some(created.backend_id.clone());
            if let Some(spots) = area.spots_mut() {
                for (spot_id, backend_id) in &created.spots {
                    if let Some(spot) = spots.iter_mut().find(|s| s.id == *spot_id) {
                        spot.persisted = true;
                        spot.backend_id = backend_id.clone();
                    }
                }
            }
        }
    }
}

/// Execute `plan` and, if every call succeeded, move the lot to
/// `PARTNER_CONFIGURATION`. A failed status update is logged but does not
/// fail the save.
pub async fn execute<B: LayoutBackend>(backend: &B, plan: SavePlan) -> SaveReport {
    let mut report = SaveReport {
        deleted: Vec::new(),
        created_floors: Vec::new(),
        updated_floors: Vec::new(),
        created_areas: Vec::new(),
        updated_areas: Vec::new(),
        skipped_floors: plan.skipped_floors,
        warnings: plan.warnings,
        failure: None,
        status_updated: false,
        finished_at: String::new(),
    };

    let outcome = run(backend, &plan.lot_id, plan.deletions, plan.steps, &mut report).await;
    match outcome {
        Err(failure) => {
            warn!(%failure, "save stopped");
            report.failure = Some(failure);
        }
        Ok(()) => match backend
            .update_lot_status(&plan.lot_id, LotStatus::PartnerConfiguration)
            .await
        {
            Ok(()) => report.status_updated = true,
            Err(e) => warn!(lot_id = %plan.lot_id, error = %e, "lot status update failed"),
        },
    }

    report.finished_at = chrono::Utc::now().to_rfc3339();
    report
}

async fn run<B: LayoutBackend>(
    backend: &B,
    lot_id: &str,
    deletions: Vec<RemoteDeletion>,
    steps: Vec<FloorStep>,
    report: &mut SaveReport,
) -> Result<(), SaveFailure> {
    for deletion in deletions {
        let result = match &deletion {
            RemoteDeletion::Area { backend_id, .. } => backend.delete_area(backend_id).await,
            RemoteDeletion::Spot { backend_id, .. } => backend.delete_spot(backend_id).await,
        };
        result.map_err(|e| SaveFailure::new(SaveAction::Delete, (&deletion).into(), e))?;
        info!(?deletion, "remote entity deleted");
        report.deleted.push(deletion);
    }

    for step in steps {
        let floor_number = step.floor_number;
        let floor_id = match step.target {
            FloorTarget::Existing { backend_id } => backend_id,
            FloorTarget::Create(request) => {
                let created = backend.create_floor(lot_id, &request).await.map_err(|e| {
                    SaveFailure::new(SaveAction::Create, FailedEntity::Floor { floor_number }, e)
                })?;
                info!(floor = floor_number, id = %created.id, "floor created");
                report.created_floors.push(CreatedFloor {
                    floor_number,
                    backend_id: created.id.clone(),
                });
                created.id
            }
        };

        if let Some(request) = &step.update {
            backend.update_floor(&floor_id, request).await.map_err(|e| {
                SaveFailure::new(SaveAction::Update, FailedEntity::Floor { floor_number }, e)
            })?;
            info!(floor = floor_number, id = %floor_id, "floor updated");
            report.updated_floors.push(floor_number);
        }

        for area in step.area_updates {
            backend
                .update_area(&area.backend_id, &area.request)
                .await
                .map_err(|e| {
                    let entity = FailedEntity::Area {
                        floor_number,
                        name: area.request.name.clone(),
                    };
                    SaveFailure::new(SaveAction::Update, entity, e)
                })?;
            info!(floor = floor_number, area = %area.request.name, "area updated");
            report.updated_areas.push(UpdatedArea {
                floor_number,
                area_id: area.area_id,
            });
        }

        for area in step.areas {
            let created = backend
                .create_area(&floor_id, &area.request)
                .await
                .map_err(|e| {
                    let entity = FailedEntity::Area {
                        floor_number,
                        name: area.request.name.clone(),
                    };
                    SaveFailure::new(SaveAction::Create, entity, e)
                })?;
            info!(floor = floor_number, area = %area.request.name, id = %created.id, "area created");
            let mut remote = created.spots.into_iter().map(|s| s.id);
            let spots = area
                .spot_ids
                .iter()
                .map(|&local| (local, remote.next()))
                .collect();
            report.created_areas.push(CreatedArea {
                floor_number,
                area_id: area.area_id,
                backend_id: created.id,
                spots,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Area, AreaType, Floor, ParkingLot, Rect, Spot, VehicleType};
    use crate::persistence::{build_plan, BackendCall, MemoryBackend};
    use std::collections::BTreeSet;

    fn lot() -> ParkingLot {
        ParkingLot {
            id: "lot-1".to_string(),
            name: "Central".to_string(),
            total_floors: 3,
            status: LotStatus::Preparing,
            capacities: Vec::new(),
        }
    }

    fn new_floor(number: u32, areas: &[&str]) -> Floor {
        let mut floor = Floor::new(number, BTreeSet::from([VehicleType::CarUpTo9Seats]));
        for name in areas {
            let mut area = Area::new(
                *name,
                Rect::new(0.0, 0.0, 200.0, 200.0),
                VehicleType::CarUpTo9Seats,
                AreaType::WalkInOnly,
                0,
            );
            area.spots_mut()
                .expect("car area")
                .push(Spot::new("S1", Rect::new(5.0, 5.0, 40.0, 60.0)));
            floor.areas.push(area);
        }
        floor
    }

    #[tokio::test]
    async fn creates_floor_then_areas_and_flips_status() {
        let backend = MemoryBackend::new(lot());
        let mut doc = LayoutDocument::from_floors([new_floor(1, &["A1", "A2"])]);
        let plan = build_plan("lot-1", &doc).expect("plan");

        let report = execute(&backend, plan).await;
        assert!(report.is_success());
        assert!(report.status_updated);
        assert_eq!(report.created_floors.len(), 1);
        assert_eq!(report.created_areas.len(), 2);

        let calls = backend.calls();
        assert!(matches!(calls[0], BackendCall::CreateFloor { .. }));
        assert!(matches!(calls[1], BackendCall::CreateArea { .. }));
        assert!(matches!(calls[2], BackendCall::CreateArea { .. }));
        assert!(matches!(
            calls[3],
            BackendCall::UpdateLotStatus {
                status: LotStatus::PartnerConfiguration,
                ..
            }
        ));

        report.apply_to(&mut doc);
        let floor = doc.floor(1).expect("floor");
        assert!(floor.exists_in_backend);
        assert!(floor.areas.iter().all(Area::is_persisted));
        assert!(floor.areas[0].spots()[0].persisted);
        assert!(floor.areas[0].spots()[0].backend_id.is_some());
    }

    #[tokio::test]
    async fn stops_at_first_failing_area_and_names_it() {
        let backend = MemoryBackend::new(lot());
        backend.fail_area("A2");
        let mut doc = LayoutDocument::from_floors([
            new_floor(1, &["A1", "A2", "A3"]),
            new_floor(2, &["B1"]),
        ]);
        let plan = build_plan("lot-1", &doc).expect("plan");

        let report = execute(&backend, plan).await;
        let failure = report.failure.clone().expect("failure");
        assert_eq!(
            failure.entity,
            FailedEntity::Area {
                floor_number: 1,
                name: "A2".to_string()
            }
        );
        assert!(failure.to_string().contains("area 'A2' on floor 1"));
        assert!(!report.status_updated);
        assert_eq!(report.created_areas.len(), 1);
        assert_eq!(backend.calls().len(), 3);

        report.apply_to(&mut doc);
        let retry = build_plan("lot-1", &doc).expect("plan");
        assert_eq!(retry.floor_creates(), 1);
        assert_eq!(retry.area_creates(), 3);
    }

    #[tokio::test]
    async fn status_update_failure_keeps_save_successful() {
        let backend = MemoryBackend::new(lot());
        backend.fail_status_update();
        let doc = LayoutDocument::from_floors([new_floor(1, &["A1"])]);
        let report = execute(&backend, build_plan("lot-1", &doc).expect("plan")).await;
        assert!(report.is_success());
        assert!(!report.status_updated);
    }

    #[tokio::test]
    async fn empty_plan_only_updates_status() {
        let backend = MemoryBackend::new(lot());
        let doc = LayoutDocument::from_floors([new_floor(1, &[])]);
        let report = execute(&backend, build_plan("lot-1", &doc).expect("plan")).await;
        assert!(report.is_success());
        assert_eq!(backend.calls().len(), 1);
        assert!(!report.finished_at.is_empty());
    }

    /// Run a first save of `doc` and record the result in it.
    async fn saved(backend: &MemoryBackend, doc: &mut LayoutDocument) {
        let report = execute(backend, build_plan("lot-1", doc).expect("plan")).await;
        assert!(report.is_success());
        report.apply_to(doc);
        backend.clear_calls();
    }

    #[tokio::test]
    async fn edits_to_saved_entities_are_sent_and_cleared() {
        let backend = MemoryBackend::new(lot());
        let mut doc = LayoutDocument::from_floors([new_floor(1, &["Old", "Other"])]);
        saved(&backend, &mut doc).await;

        let floor = doc.floor_mut(1).expect("floor");
        floor.floor_name = "Ground".to_string();
        floor.mark_modified();
        floor.areas[0].name = "New".to_string();
        floor.areas[0].mark_modified();
        let gone = floor.areas.remove(1);
        doc.record_deletion(RemoteDeletion::Area {
            floor_number: 1,
            name: gone.name.clone(),
            backend_id: gone.backend_id.clone().expect("saved"),
        });

        let report = execute(&backend, build_plan("lot-1", &doc).expect("plan")).await;
        assert!(report.is_success());
        assert_eq!(report.deleted.len(), 1);
        assert_eq!(report.updated_floors, vec![1]);
        assert_eq!(report.updated_areas.len(), 1);

        let calls = backend.calls();
        assert!(matches!(calls[0], BackendCall::DeleteArea(_)));
        assert!(matches!(calls[1], BackendCall::UpdateFloor { .. }));
        assert!(matches!(calls[2], BackendCall::UpdateArea { .. }));
        assert_eq!(backend.area_count(), 1);

        report.apply_to(&mut doc);
        assert!(doc.pending_deletions().is_empty());
        assert!(!doc.floor(1).expect("floor").modified);
        assert!(!doc.floor(1).expect("floor").areas[0].modified);
        assert!(build_plan("lot-1", &doc).expect("plan").is_empty());
    }

    #[tokio::test]
    async fn failed_update_is_reported_and_stays_pending() {
        let backend = MemoryBackend::new(lot());
        let mut doc = LayoutDocument::from_floors([new_floor(1, &["A1"])]);
        saved(&backend, &mut doc).await;

        let area = &mut doc.floor_mut(1).expect("floor").areas[0];
        area.name = "Broken".to_string();
        area.mark_modified();
        backend.fail_area("Broken");

        let report = execute(&backend, build_plan("lot-1", &doc).expect("plan")).await;
        let failure = report.failure.clone().expect("failure");
        assert_eq!(failure.action, SaveAction::Update);
        assert_eq!(
            failure.to_string(),
            "failed to update area 'Broken' on floor 1: HTTP 500: could not store area Broken"
        );
        report.apply_to(&mut doc);
        assert!(doc.floor(1).expect("floor").areas[0].modified);
    }
}

