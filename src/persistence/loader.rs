//! Fetching a lot's stored layout, and clearing it for a map reset.

use std::collections::BTreeSet;

use tokio::task::JoinSet;
use tracing::{debug, info};

use super::{AreaRecord, BackendError, FloorRecord, LayoutBackend, SpotRecord};
use crate::layout::capacity::allowed_vehicle_types;
use crate::layout::LayoutDocument;
use crate::models::{Floor, ParkingLot, VehicleType};

/// Load a lot and everything drawn on it.
///
/// Areas are listed per floor concurrently, then spots per car area
/// concurrently. Every loaded entity is marked persisted.
pub async fn load_layout<B>(
    backend: &B,
    lot_id: &str,
) -> Result<(ParkingLot, LayoutDocument), BackendError>
where
    B: LayoutBackend + Clone + Send + Sync + 'static,
{
    let lot = backend.get_parking_lot(lot_id).await?;
    let floor_records = backend.list_floors(lot_id).await?;
    debug!(lot_id, floors = floor_records.len(), "floors listed");

    let mut area_tasks = JoinSet::new();
    for (index, record) in floor_records.iter().enumerate() {
        let backend = backend.clone();
        let floor_id = record.id.clone();
        area_tasks.spawn(async move { (index, backend.list_areas(&floor_id).await) });
    }
    let mut areas_by_floor: Vec<Vec<AreaRecord>> = vec![Vec::new(); floor_records.len()];
    while let Some(joined) = area_tasks.join_next().await {
        let (index, areas) = joined?;
        areas_by_floor[index] = areas?;
    }

    let mut spot_tasks = JoinSet::new();
    for (floor_index, areas) in areas_by_floor.iter().enumerate() {
        for (area_index, area) in areas.iter().enumerate() {
            if !area.vehicle_type.tracks_individual_spots() {
                continue;
            }
            let backend = backend.clone();
            let area_id = area.id.clone();
            spot_tasks.spawn(async move {
                (floor_index, area_index, backend.list_spots(&area_id).await)
            });
        }
    }
    let mut spots_by_area: Vec<Vec<Vec<SpotRecord>>> = areas_by_floor
        .iter()
        .map(|areas| vec![Vec::new(); areas.len()])
        .collect();
    while let Some(joined) = spot_tasks.join_next().await {
        let (floor_index, area_index, spots) = joined?;
        spots_by_area[floor_index][area_index] = spots?;
    }

    let lot_types = allowed_vehicle_types(&lot.capacities);
    let floors = floor_records
        .into_iter()
        .zip(areas_by_floor)
        .zip(spots_by_area)
        .map(|((record, areas), spots)| build_floor(record, areas, spots, &lot_types));
    let document = LayoutDocument::from_floors(floors);

    info!(
        lot_id,
        floors = document.len(),
        spots = document.total_drawn_spots(),
        "layout loaded"
    );
    Ok((lot, document))
}

fn build_floor(
    record: FloorRecord,
    areas: Vec<AreaRecord>,
    spots: Vec<Vec<SpotRecord>>,
    lot_types: &BTreeSet<VehicleType>,
) -> Floor {
    let mut allowed: BTreeSet<VehicleType> =
        record.capacities.iter().map(|c| c.vehicle_type).collect();
    if allowed.is_empty() {
        allowed = lot_types.clone();
    }
    let mut floor = Floor::new(record.floor_number, allowed);
    if !record.floor_name.is_empty() {
        floor.floor_name = record.floor_name.clone();
    }
    floor.bounds = record.bounds();
    floor.areas = areas
        .into_iter()
        .zip(spots)
        .map(|(area, spots)| area.into_area(spots))
        .collect();
    floor.exists_in_backend = true;
    floor.backend_id = Some(record.id);
    floor
}

/// Delete every floor of `document` that exists remotely, in floor order.
///
/// Each deleted floor is unlinked from the backend in `document` as soon as
/// its call succeeds, so a retry after a failure skips it. Returns how many
/// floors were deleted.
pub async fn delete_backend_floors<B: LayoutBackend>(
    backend: &B,
    document: &mut LayoutDocument,
) -> Result<usize, BackendError> {
    let mut deleted = 0;
    for floor in document.floors_mut() {
        let Some(id) = floor.backend_id.clone() else {
            continue;
        };
        backend.delete_floor(&id).await?;
        floor.forget_backend();
        deleted += 1;
    }
    Ok(deleted)
}
