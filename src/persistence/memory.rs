//! In-process [`LayoutBackend`] that keeps everything in memory and records
//! each call. Backs offline script replays and the test suites.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

use super::{
    AreaCreateRequest, AreaRecord, AreaUpdateRequest, BackendError, Created, FloorCreateRequest,
    FloorRecord, FloorUpdateRequest, LayoutBackend, SpotRecord,
};
use crate::models::{LotStatus, ParkingLot};

/// One call received by a [`MemoryBackend`].
#[derive(Debug, Clone, PartialEq)]
pub enum BackendCall {
    GetParkingLot(String),
    UpdateLotStatus { lot_id: String, status: LotStatus },
    ListFloors(String),
    CreateFloor { lot_id: String, request: FloorCreateRequest },
    UpdateFloor { floor_id: String, request: FloorUpdateRequest },
    DeleteFloor(String),
    ListAreas(String),
    CreateArea { floor_id: String, request: AreaCreateRequest },
    UpdateArea { area_id: String, request: AreaUpdateRequest },
    DeleteArea(String),
    ListSpots(String),
    DeleteSpot(String),
}

#[derive(Debug, Clone)]
struct StoredArea {
    floor_id: String,
    record: AreaRecord,
    spots: Vec<SpotRecord>,
}

#[derive(Debug, Default)]
struct Store {
    lot: Option<ParkingLot>,
    floors: Vec<FloorRecord>,
    areas: Vec<StoredArea>,
    calls: Vec<BackendCall>,
    failing_areas: HashSet<String>,
    fail_status_update: bool,
    next_id: u64,
}

impl Store {
    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}-{}", self.next_id)
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    store: Arc<Mutex<Store>>,
}

impl MemoryBackend {
    pub fn new(lot: ParkingLot) -> Self {
        let backend = Self::default();
        if let Ok(mut store) = backend.store.lock() {
            store.lot = Some(lot);
        }
        backend
    }

    fn store(&self) -> Result<MutexGuard<'_, Store>, BackendError> {
        self.store
            .lock()
            .map_err(|_| BackendError::Http("memory backend lock poisoned".to_string()))
    }

    /// Every call received so far, oldest first.
    pub fn calls(&self) -> Vec<BackendCall> {
        self.store().map(|s| s.calls.clone()).unwrap_or_default()
    }

    pub fn clear_calls(&self) {
        if let Ok(mut store) = self.store() {
            store.calls.clear();
        }
    }

    /// Make every create or update call for an area with this name fail
    /// with HTTP 500.
    pub fn fail_area(&self, name: &str) {
        if let Ok(mut store) = self.store() {
            store.failing_areas.insert(name.to_string());
        }
    }

    pub fn fail_status_update(&self) {
        if let Ok(mut store) = self.store() {
            store.fail_status_update = true;
        }
    }

    /// Current lot status, as last written.
    pub fn lot_status(&self) -> Option<LotStatus> {
        self.store().ok()?.lot.as_ref().map(|l| l.status)
    }

    pub fn floor_count(&self) -> usize {
        self.store().map(|s| s.floors.len()).unwrap_or(0)
    }

    pub fn area_count(&self) -> usize {
        self.store().map(|s| s.areas.len()).unwrap_or(0)
    }
}

fn area_failure(name: &str) -> BackendError {
    BackendError::Status {
        status: 500,
        message: format!("could not store area {name}"),
    }
}

fn not_found(what: &str, id: &str) -> BackendError {
    BackendError::Status {
        status: 404,
        message: format!("{what} {id} not found"),
    }
}

impl LayoutBackend for MemoryBackend {
    async fn get_parking_lot(&self, lot_id: &str) -> Result<ParkingLot, BackendError> {
        let mut store = self.store()?;
        store.calls.push(BackendCall::GetParkingLot(lot_id.to_string()));
        store
            .lot
            .clone()
            .filter(|l| l.id == lot_id)
            .ok_or_else(|| not_found("parking lot", lot_id))
    }

    async fn update_lot_status(&self, lot_id: &str, status: LotStatus) -> Result<(), BackendError> {
        let mut store = self.store()?;
        store.calls.push(BackendCall::UpdateLotStatus {
            lot_id: lot_id.to_string(),
            status,
        });
        if store.fail_status_update {
            return Err(BackendError::Status {
                status: 503,
                message: "status service unavailable".to_string(),
            });
        }
        match store.lot.as_mut().filter(|l| l.id == lot_id) {
            Some(lot) => {
                lot.status = status;
                Ok(())
            }
            None => Err(not_found("parking lot", lot_id)),
        }
    }

    async fn list_floors(&self, lot_id: &str) -> Result<Vec<FloorRecord>, BackendError> {
        let mut store = self.store()?;
        store.calls.push(BackendCall::ListFloors(lot_id.to_string()));
        Ok(store.floors.clone())
    }

    async fn create_floor(
        &self,
        lot_id: &str,
        request: &FloorCreateRequest,
    ) -> Result<Created, BackendError> {
        let mut store = self.store()?;
        store.calls.push(BackendCall::CreateFloor {
            lot_id: lot_id.to_string(),
            request: request.clone(),
        });
        let id = store.next_id("floor");
        store.floors.push(FloorRecord {
            id: id.clone(),
            floor_number: request.floor_number,
            floor_name: request.floor_name.clone(),
            top_left_x: request.top_left_x.map(|v| v as f64),
            top_left_y: request.top_left_y.map(|v| v as f64),
            width: request.width.map(|v| v as f64),
            height: request.height.map(|v| v as f64),
            capacities: request.capacity_requests.clone(),
        });
        Ok(Created {
            id,
            spots: Vec::new(),
        })
    }

    async fn update_floor(
        &self,
        floor_id: &str,
        request: &FloorUpdateRequest,
    ) -> Result<(), BackendError> {
        let mut store = self.store()?;
        store.calls.push(BackendCall::UpdateFloor {
            floor_id: floor_id.to_string(),
            request: request.clone(),
        });
        let floor = store
            .floors
            .iter_mut()
            .find(|f| f.id == floor_id)
            .ok_or_else(|| not_found("floor", floor_id))?;
        floor.floor_number = request.floor_number;
        floor.floor_name = request.floor_name.clone();
        floor.top_left_x = request.top_left_x.map(|v| v as f64);
        floor.top_left_y = request.top_left_y.map(|v| v as f64);
        floor.width = request.width.map(|v| v as f64);
        floor.height = request.height.map(|v| v as f64);
        floor.capacities = request.capacity_requests.clone();
        Ok(())
    }

    async fn delete_floor(&self, floor_id: &str) -> Result<(), BackendError> {
        let mut store = self.store()?;
        store.calls.push(BackendCall::DeleteFloor(floor_id.to_string()));
        let before = store.floors.len();
        store.floors.retain(|f| f.id != floor_id);
        if store.floors.len() == before {
            return Err(not_found("floor", floor_id));
        }
        store.areas.retain(|a| a.floor_id != floor_id);
        Ok(())
    }

    async fn list_areas(&self, floor_id: &str) -> Result<Vec<AreaRecord>, BackendError> {
        let mut store = self.store()?;
        store.calls.push(BackendCall::ListAreas(floor_id.to_string()));
        Ok(store
            .areas
            .iter()
            .filter(|a| a.floor_id == floor_id)
            .map(|a| a.record.clone())
            .collect())
    }

    async fn create_area(
        &self,
        floor_id: &str,
        request: &AreaCreateRequest,
    ) -> Result<Created, BackendError> {
        let mut store = self.store()?;
        store.calls.push(BackendCall::CreateArea {
            floor_id: floor_id.to_string(),
            request: request.clone(),
        });
        if store.failing_areas.contains(&request.name) {
            return Err(area_failure(&request.name));
        }
        if !store.floors.iter().any(|f| f.id == floor_id) {
            return Err(not_found("floor", floor_id));
        }

        let id = store.next_id("area");
        let mut spots = Vec::with_capacity(request.spot_requests.len());
        for spot in &request.spot_requests {
            spots.push(SpotRecord {
                id: store.next_id("spot"),
                name: spot.name.clone(),
                spot_top_left_x: spot.spot_top_left_x as f64,
                spot_top_left_y: spot.spot_top_left_y as f64,
                spot_width: spot.spot_width as f64,
                spot_height: spot.spot_height as f64,
            });
        }
        let created = Created {
            id: id.clone(),
            spots: spots
                .iter()
                .map(|s| Created {
                    id: s.id.clone(),
                    spots: Vec::new(),
                })
                .collect(),
        };
        store.areas.push(StoredArea {
            floor_id: floor_id.to_string(),
            record: AreaRecord {
                id,
                name: request.name.clone(),
                vehicle_type: request.vehicle_type,
                area_type: request.area_type,
                area_top_left_x: request.area_top_left_x as f64,
                area_top_left_y: request.area_top_left_y as f64,
                area_width: request.area_width as f64,
                area_height: request.area_height as f64,
                support_electric_vehicle: request.support_electric_vehicle,
                total_spots: request.total_spots,
            },
            spots,
        });
        Ok(created)
    }

    async fn update_area(
        &self,
        area_id: &str,
        request: &AreaUpdateRequest,
    ) -> Result<(), BackendError> {
        let mut store = self.store()?;
        store.calls.push(BackendCall::UpdateArea {
            area_id: area_id.to_string(),
            request: request.clone(),
        });
        if store.failing_areas.contains(&request.name) {
            return Err(area_failure(&request.name));
        }
        let area = store
            .areas
            .iter_mut()
            .find(|a| a.record.id == area_id)
            .ok_or_else(|| not_found("area", area_id))?;
        let record = &mut area.record;
        record.name = request.name.clone();
        record.vehicle_type = request.vehicle_type;
        record.area_type = request.area_type;
        record.area_top_left_x = request.area_top_left_x as f64;
        record.area_top_left_y = request.area_top_left_y as f64;
        record.area_width = request.area_width as f64;
        record.area_height = request.area_height as f64;
        record.support_electric_vehicle = request.support_electric_vehicle;
        record.total_spots = request.total_spots;
        Ok(())
    }

    async fn delete_area(&self, area_id: &str) -> Result<(), BackendError> {
        let mut store = self.store()?;
        store.calls.push(BackendCall::DeleteArea(area_id.to_string()));
        let before = store.areas.len();
        store.areas.retain(|a| a.record.id != area_id);
        if store.areas.len() == before {
            return Err(not_found("area", area_id));
        }
        Ok(())
    }

    async fn delete_spot(&self, spot_id: &str) -> Result<(), BackendError> {
        let mut store = self.store()?;
        store.calls.push(BackendCall::DeleteSpot(spot_id.to_string()));
        for area in &mut store.areas {
            if let Some(pos) = area.spots.iter().position(|s| s.id == spot_id) {
                area.spots.remove(pos);
                return Ok(());
            }
        }
        Err(not_found("spot", spot_id))
    }

    async fn list_spots(&self, area_id: &str) -> Result<Vec<SpotRecord>, BackendError> {
        let mut store = self.store()?;
        store.calls.push(BackendCall::ListSpots(area_id.to_string()));
        store
            .areas
            .iter()
            .find(|a| a.record.id == area_id)
            .map(|a| a.spots.clone())
            .ok_or_else(|| not_found("area", area_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Area, AreaType, Floor, Rect, Spot, VehicleType};
    use std::collections::BTreeSet;

    fn lot() -> ParkingLot {
        ParkingLot {
            id: "lot-1".to_string(),
            name: String::new(),
            total_floors: 1,
            status: LotStatus::Preparing,
            capacities: Vec::new(),
        }
    }

    async fn seeded() -> (MemoryBackend, String, Created) {
        let backend = MemoryBackend::new(lot());
        let floor = Floor::new(1, BTreeSet::from([VehicleType::CarUpTo9Seats]));
        let floor_id = backend
            .create_floor("lot-1", &FloorCreateRequest::new(&floor, Vec::new()))
            .await
            .expect("floor")
            .id;
        let mut area = Area::new(
            "North",
            Rect::new(0.0, 0.0, 200.0, 200.0),
            VehicleType::CarUpTo9Seats,
            AreaType::WalkInOnly,
            0,
        );
        let spots = area.spots_mut().expect("car area");
        spots.push(Spot::new("S1", Rect::new(5.0, 5.0, 40.0, 60.0)));
        spots.push(Spot::new("S2", Rect::new(55.0, 5.0, 40.0, 60.0)));
        let created = backend
            .create_area(&floor_id, &AreaCreateRequest::from(&area))
            .await
            .expect("area");
        (backend, floor_id, created)
    }

    #[tokio::test]
    async fn updates_and_deletes_show_in_listings() {
        let (backend, floor_id, created) = seeded().await;

        let mut area = Area::new(
            "Harbour",
            Rect::new(0.0, 0.0, 200.0, 200.0),
            VehicleType::CarUpTo9Seats,
            AreaType::WalkInOnly,
            0,
        );
        area.spots_mut()
            .expect("car area")
            .push(Spot::new("S1", Rect::new(5.0, 5.0, 40.0, 60.0)));
        backend
            .update_area(&created.id, &AreaUpdateRequest::from(&area))
            .await
            .expect("update");
        backend
            .delete_spot(&created.spots[1].id)
            .await
            .expect("delete spot");

        let areas = backend.list_areas(&floor_id).await.expect("areas");
        assert_eq!(areas[0].name, "Harbour");
        assert_eq!(areas[0].total_spots, 1);
        assert_eq!(backend.list_spots(&created.id).await.expect("spots").len(), 1);

        backend.delete_area(&created.id).await.expect("delete area");
        assert_eq!(backend.area_count(), 0);
        assert!(matches!(
            backend.delete_spot(&created.spots[0].id).await,
            Err(BackendError::Status { status: 404, .. })
        ));
    }
}
